//! Client method extraction for the bulk rewrite.
//!
//! Reads an existing Go client file and turns each
//! `func (c *Client) Name(...) (value T, err error) { ... }` whose body
//! assigns `err` from one invocation primitive and ends in a bare `return`
//! into a [`BatchCandidate`]. The body is cut at the invocation into pre-call
//! and post-call statements, and error short-circuit blocks are removed from
//! both since the error does not exist yet when a call is queued.

use std::ops::Range;

use super::ir::{BatchCandidate, ClientMethod, Extracted, TargetType};
use super::scan::{Masked, Syntax, comment_lines};
use crate::diagnostics::{Diagnostic, MismatchKind};

/// Settings for client extraction.
#[derive(Debug, Clone, Copy)]
pub struct BulkOptions<'a> {
    /// Method names of the synchronous invocation primitive, e.g.
    /// `wrappedCallRPC`.
    pub primitives: &'a [String],

    /// Receiver type to rewrite; `None` selects the first one seen.
    pub client_type: Option<&'a str>,
}

/// Everything the bulk rewrite needs from one client file.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSource {
    /// Import specs of the file, as `path` or `alias path`.
    pub imports: Vec<String>,

    /// Comment lines directly above the first function.
    pub leading_comments: Vec<String>,

    /// The receiver type that was rewritten.
    pub client_type: Option<String>,

    /// Every function of the file, in source order.
    pub methods: Vec<ClientMethod>,
}

/// Byte span of one top-level function.
#[derive(Debug, Clone, Copy)]
struct FuncSpan {
    start: usize,
    body_open: usize,
    end: usize,
}

/// Extract the candidates of a Go client file.
pub fn extract_client(source: &str, options: BulkOptions<'_>) -> ClientSource {
    let masked = Masked::new(source, Syntax::Go);
    let spans = func_spans(&masked);

    let leading_comments = spans.first().map_or_else(Vec::new, |first| {
        comment_lines(masked.slice(masked.decoration_start(first.start)..first.start))
    });

    let client_type = options
        .client_type
        .map(str::to_string)
        .or_else(|| first_receiver(&masked, &spans));

    let methods = spans
        .iter()
        .enumerate()
        .map(|(index, span)| {
            let next = spans.get(index + 1).map_or(source.len(), |next| next.start);
            let outcome = match parse_method(&masked, *span, options.primitives) {
                Extracted::Found(candidate)
                    if client_type
                        .as_ref()
                        .is_some_and(|client| *client != candidate.receiver_type) =>
                {
                    Extracted::Skipped(
                        Diagnostic::new(
                            MismatchKind::ClientMethod,
                            format!(
                                "receiver is {}, not {}",
                                candidate.receiver_type,
                                client_type.as_deref().unwrap_or_default()
                            ),
                            masked.slice(span.start..span.end + 1),
                        )
                        .with_subject(method_name(&candidate.signature)),
                    )
                }
                outcome => outcome,
            };

            ClientMethod {
                outcome,
                trailing_comments: comment_lines(masked.slice(span.end + 1..next)),
            }
        })
        .collect();

    ClientSource {
        imports: parse_imports(&masked),
        leading_comments,
        client_type,
        methods,
    }
}

/// Spans of all functions declared at the start of a line.
fn func_spans(masked: &Masked<'_>) -> Vec<FuncSpan> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while let Some(start) = masked.find_keyword("func", cursor) {
        cursor = start + "func".len();
        if !masked.is_blank(masked.line_start(start)..start) {
            continue;
        }

        let Some(body_open) = body_open(masked, cursor) else {
            tracing::warn!("function at byte {} has no body", start);
            break;
        };
        let Some(end) = masked.matching_close(body_open) else {
            tracing::warn!("function at byte {} has unbalanced braces", start);
            break;
        };

        spans.push(FuncSpan {
            start,
            body_open,
            end,
        });
        cursor = end + 1;
    }

    spans
}

/// The `{` opening a function body, stepping over `interface{}` and
/// `struct{}` in an unparenthesised result type.
fn body_open(masked: &Masked<'_>, from: usize) -> Option<usize> {
    let len = masked.code().len();
    let mut at = from;

    loop {
        let open = masked.find_top_level(at..len, b'{')?;
        let before = masked.code()[..open].trim_end();
        if before.ends_with("interface") || before.ends_with("struct") {
            at = masked.matching_close(open)? + 1;
        } else {
            return Some(open);
        }
    }
}

/// Receiver type of the first method with a parseable receiver.
fn first_receiver(masked: &Masked<'_>, spans: &[FuncSpan]) -> Option<String> {
    spans
        .iter()
        .find_map(|span| receiver(masked, span.start + "func".len()))
        .map(|(_, ty, _)| ty)
}

/// Receiver name, receiver type (pointer marker removed) and the index after
/// the receiver list.
fn receiver(masked: &Masked<'_>, from: usize) -> Option<(String, String, usize)> {
    let open = masked.skip_whitespace(from)?;
    if masked.byte_at(open) != Some(b'(') {
        return None;
    }
    let close = masked.matching_close(open)?;

    let text = masked.slice(open + 1..close);
    let mut parts = text.split_whitespace();
    let (Some(name), Some(ty), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };

    Some((
        name.to_string(),
        ty.trim_start_matches('*').to_string(),
        close + 1,
    ))
}

fn parse_method(
    masked: &Masked<'_>,
    span: FuncSpan,
    primitives: &[String],
) -> Extracted<BatchCandidate> {
    let fragment = masked.slice(span.start..span.end + 1);
    let skip = |reason: String, subject: Option<&str>| {
        let diagnostic = Diagnostic::new(MismatchKind::ClientMethod, reason, fragment);
        Extracted::Skipped(match subject {
            Some(subject) => diagnostic.with_subject(subject),
            None => diagnostic,
        })
    };

    let after_func = span.start + "func".len();
    let Some((receiver_name, receiver_type, after_receiver)) = receiver(masked, after_func) else {
        let name = masked
            .skip_whitespace(after_func)
            .and_then(|at| masked.ident_at(at))
            .map(|range| masked.slice(range));
        return skip("not a method with a named receiver".to_string(), name);
    };

    let Some(name) = masked
        .skip_whitespace(after_receiver)
        .and_then(|at| masked.ident_at(at))
    else {
        return skip("missing method name".to_string(), None);
    };
    let subject = Some(masked.slice(name.clone()));

    let Some(params_close) = masked
        .skip_whitespace(name.end)
        .filter(|at| masked.byte_at(*at) == Some(b'('))
        .and_then(|open| masked.matching_close(open))
    else {
        return skip("missing parameter list".to_string(), subject);
    };
    let signature = masked.slice(name.start..params_close + 1).to_string();

    let (result_name, declared_return) =
        match named_results(masked, params_close + 1..span.body_open) {
            Ok(results) => results,
            Err(reason) => return skip(reason.to_string(), subject),
        };

    let body = span.body_open + 1..span.end;
    let Some((primitive_at, primitive)) = find_invocation(masked, body.clone(), primitives) else {
        return skip(
            format!("no call to {}", primitives.join(" or ")),
            subject,
        );
    };

    let statement = statement_start(masked, body.start, primitive_at);
    if !assigns_err(&masked.code()[statement..primitive_at]) {
        return skip("invocation result is not assigned to err".to_string(), subject);
    }

    let args_open = primitive_at + 1 + primitive.len();
    let Some(args_close) = masked.matching_close(args_open) else {
        return skip("unbalanced invocation arguments".to_string(), subject);
    };
    let args: Vec<String> = masked
        .split_top_level(args_open + 1..args_close, b',')
        .into_iter()
        .map(|range| normalize_arg(masked.slice(range)))
        .collect();

    let expected_target = format!("&{result_name}");
    match args.first() {
        Some(first) if *first == expected_target => {}
        _ => {
            return skip(
                format!("first invocation argument is not {expected_target}"),
                subject,
            );
        }
    }
    if args.len() < 2 {
        return skip("invocation has no rpc method name".to_string(), subject);
    }

    let Some(return_at) = bare_return(masked, body.clone()).filter(|at| *at > args_close) else {
        return skip("body does not end with a bare return".to_string(), subject);
    };

    let pre_call = sanitize(masked.slice(body.start..statement));
    let post = masked.slice(args_close + 1..return_at);
    let post_call = sanitize(post.trim_start_matches([' ', '\t']).trim_start_matches(';'));

    let call_args = args[1..].join(", ");
    let rpc_name = args[1]
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .map(str::to_string);

    Extracted::Found(BatchCandidate {
        receiver_name,
        receiver_type,
        signature,
        result_name,
        declared_return,
        pre_call,
        rpc_name,
        call_args,
        post_call,
    })
}

/// Read `(name Type, err error)` between the parameters and the body.
fn named_results(
    masked: &Masked<'_>,
    range: Range<usize>,
) -> Result<(String, TargetType), &'static str> {
    let Some(open) = masked
        .skip_whitespace(range.start)
        .filter(|at| *at < range.end && masked.byte_at(*at) == Some(b'('))
    else {
        return Err("results are not (value, err error)");
    };
    let Some(close) = masked.matching_close(open).filter(|close| *close < range.end) else {
        return Err("unbalanced result list");
    };

    let pieces = masked.split_top_level(open + 1..close, b',');
    let [value, error] = pieces.as_slice() else {
        return Err("results are not (value, err error)");
    };

    let value = masked.slice(value.clone()).trim();
    let Some((name, ty)) = value
        .split_once(char::is_whitespace)
        .filter(|(_, ty)| !ty.trim().is_empty())
    else {
        return Err("results are not named");
    };

    let error: Vec<&str> = masked.slice(error.clone()).split_whitespace().collect();
    if error != ["err", "error"] {
        return Err("second result is not `err error`");
    }

    Ok((name.to_string(), TargetType::parse(ty)))
}

/// Earliest `.primitive(` in the body.
fn find_invocation<'p>(
    masked: &Masked<'_>,
    body: Range<usize>,
    primitives: &'p [String],
) -> Option<(usize, &'p str)> {
    let code = &masked.code()[body.clone()];

    primitives
        .iter()
        .filter_map(|primitive| {
            let pattern = format!(".{primitive}(");
            code.find(&pattern)
                .map(|offset| (body.start + offset, primitive.as_str()))
        })
        .min_by_key(|(at, _)| *at)
}

/// Start of the statement containing `at`.
fn statement_start(masked: &Masked<'_>, body_start: usize, at: usize) -> usize {
    masked.code()[body_start..at]
        .rfind(['\n', ';', '{', '}'])
        .map_or(body_start, |offset| body_start + offset + 1)
}

/// Whether the text before the invocation reads `err = <receiver chain>`.
fn assigns_err(lhs: &str) -> bool {
    let Some(rest) = lhs.trim_start().strip_prefix("err") else {
        return false;
    };
    let rest = rest.trim_start();
    (rest.starts_with('=') && !rest.starts_with("==")) || rest.starts_with(":=")
}

/// Index of a bare `return` that ends the body.
fn bare_return(masked: &Masked<'_>, body: Range<usize>) -> Option<usize> {
    let code = masked.code()[body.clone()].trim_end();
    let head = code.strip_suffix("return")?;
    match head.chars().last() {
        None | Some('\n' | ' ' | '\t' | ';' | '{') => Some(body.start + head.len()),
        _ => None,
    }
}

/// Collapse line breaks inside a multi-line argument.
fn normalize_arg(arg: &str) -> String {
    let arg = arg.trim();
    if arg.contains('\n') {
        arg.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        arg.to_string()
    }
}

/// Whether a condition tests the `err` variable against nil.
fn checks_err(condition: &str) -> bool {
    let masked = Masked::new(condition, Syntax::Go);
    let mut cursor = 0;

    while let Some(at) = masked.find_keyword("err", cursor) {
        cursor = at + "err".len();
        let compares_nil = condition[cursor..]
            .trim_start()
            .strip_prefix("!=")
            .is_some_and(|rest| rest.trim_start().starts_with("nil"));
        if compares_nil {
            return true;
        }
    }
    false
}

/// Remove error short-circuit blocks and tidy the remaining lines.
fn sanitize(text: &str) -> String {
    let masked = Masked::new(text, Syntax::Go);
    let mut kept = String::new();
    let mut copied = 0;

    for range in error_blocks(&masked) {
        kept.push_str(&text[copied..range.start]);
        copied = range.end;
    }
    kept.push_str(&text[copied..]);

    tidy(&kept)
}

/// Ranges of `if err != nil { ... }` and `if ok, code := ... { ... }` blocks,
/// with any `else` chain and the line they occupy.
fn error_blocks(masked: &Masked<'_>) -> Vec<Range<usize>> {
    let code = masked.code();
    let len = code.len();
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(keyword) = masked.find_keyword("if", cursor) {
        cursor = keyword + "if".len();
        let Some(open) = masked.find_top_level(cursor..len, b'{') else {
            break;
        };

        let condition = masked.slice(cursor..open).trim();
        if !(checks_err(condition) || condition.starts_with("ok, code :=")) {
            continue;
        }
        let Some(mut end) = masked.matching_close(open).map(|close| close + 1) else {
            break;
        };

        while let Some(next) = masked.skip_whitespace(end) {
            if masked.find_keyword("else", next) != Some(next) {
                break;
            }
            let Some(close) = masked
                .find_top_level(next..len, b'{')
                .and_then(|open| masked.matching_close(open))
            else {
                break;
            };
            end = close + 1;
        }

        let line_start = masked.line_start(keyword);
        let start = if masked.is_blank(line_start..keyword) {
            line_start
        } else {
            keyword
        };
        let line_end = code[end..].find('\n').map_or(len, |offset| end + offset + 1);
        if masked.is_blank(end..line_end) {
            end = line_end;
        }

        blocks.push(start..end);
        cursor = end;
    }

    blocks
}

/// Drop blank edges, collapse blank runs and remove the common indentation.
fn tidy(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let first = lines.iter().position(|line| !line.is_empty());
    let last = lines.iter().rposition(|line| !line.is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return String::new();
    };
    let lines = &lines[first..=last];

    let indent = lines
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out: Vec<&str> = Vec::new();
    for line in lines {
        if line.is_empty() {
            if out.last().is_some_and(|previous| !previous.is_empty()) {
                out.push("");
            }
        } else {
            out.push(&line[indent..]);
        }
    }

    out.join("\n")
}

/// Method name of a verbatim `Name(params)` signature.
fn method_name(signature: &str) -> &str {
    signature
        .split('(')
        .next()
        .map_or(signature, str::trim)
}

/// Import specs of a Go file as `path` or `alias path`.
fn parse_imports(masked: &Masked<'_>) -> Vec<String> {
    let mut imports = Vec::new();
    let mut cursor = 0;

    while let Some(keyword) = masked.find_keyword("import", cursor) {
        cursor = keyword + "import".len();
        if !masked.is_blank(masked.line_start(keyword)..keyword) {
            continue;
        }
        let Some(at) = masked.skip_whitespace(cursor) else {
            break;
        };

        let block = if masked.byte_at(at) == Some(b'(') {
            match masked.matching_close(at) {
                Some(close) => at + 1..close,
                None => break,
            }
        } else {
            let end = masked.code()[at..].find('\n').map_or(masked.code().len(), |o| at + o);
            at..end
        };

        for line in masked.slice(block.clone()).lines() {
            let line = line.split("//").next().unwrap_or("").trim();
            if let Some(spec) = import_spec(line) {
                imports.push(spec);
            }
        }
        cursor = block.end;
    }

    imports
}

/// `"path"` or `alias "path"` as `path` or `alias path`.
fn import_spec(line: &str) -> Option<String> {
    let (alias, quoted) = match line.rsplit_once(char::is_whitespace) {
        Some((alias, quoted)) => (Some(alias.trim()), quoted),
        None => (None, line),
    };
    let path = quoted.strip_prefix('"')?.strip_suffix('"')?;

    Some(match alias {
        Some(alias) => format!("{alias} {path}"),
        None => path.to_string(),
    })
}
