//! Balanced-delimiter scanning over masked source text.
//!
//! Both input languages (Rust schemas and existing Go clients) are only
//! recognised structurally: declarations are found by keyword and delimited
//! by matching braces and parentheses. To keep delimiters inside comments and
//! string literals from confusing that search, the scanner works on a masked
//! copy of the source in which comment text and literal contents are replaced
//! by spaces byte-for-byte. Every index found in the masked text is therefore
//! a valid index into the original.

use std::ops::Range;

/// Lexical flavour of the text being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// Rust schema text (`'a` may be a lifetime).
    Rust,
    /// Go client source (backtick raw strings).
    Go,
}

/// Source text paired with its masked copy.
#[derive(Debug, Clone)]
pub struct Masked<'a> {
    source: &'a str,
    code: String,
}

impl<'a> Masked<'a> {
    /// Mask comments and literal contents of `source`.
    pub fn new(source: &'a str, syntax: Syntax) -> Self {
        Self {
            source,
            code: mask(source, syntax),
        }
    }

    /// The masked text.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Original text for a byte range.
    pub fn slice(&self, range: Range<usize>) -> &'a str {
        &self.source[range]
    }

    /// Whether a range holds nothing but whitespace once comments are masked.
    pub fn is_blank(&self, range: Range<usize>) -> bool {
        self.code[range].trim().is_empty()
    }

    /// Find the next occurrence of `keyword` as a whole word at or after `from`.
    pub fn find_keyword(&self, keyword: &str, from: usize) -> Option<usize> {
        let bytes = self.code.as_bytes();
        let mut cursor = from;

        while cursor <= self.code.len() {
            let found = cursor + self.code.get(cursor..)?.find(keyword)?;
            let end = found + keyword.len();
            let starts_word = found == 0 || !is_ident_byte(bytes[found - 1]);
            let ends_word = end >= bytes.len() || !is_ident_byte(bytes[end]);
            if starts_word && ends_word {
                return Some(found);
            }
            cursor = found + 1;
        }

        None
    }

    /// Index of the first non-whitespace byte at or after `from`.
    pub fn skip_whitespace(&self, from: usize) -> Option<usize> {
        self.code
            .get(from..)?
            .find(|c: char| !c.is_whitespace())
            .map(|offset| from + offset)
    }

    /// Byte at `index` of the masked text.
    pub fn byte_at(&self, index: usize) -> Option<u8> {
        self.code.as_bytes().get(index).copied()
    }

    /// Read an identifier starting exactly at `from`.
    pub fn ident_at(&self, from: usize) -> Option<Range<usize>> {
        let bytes = self.code.as_bytes();
        let first = *bytes.get(from)?;
        if !(first.is_ascii_alphabetic() || first == b'_') {
            return None;
        }

        let len = bytes[from..]
            .iter()
            .take_while(|b| is_ident_byte(**b))
            .count();
        Some(from..from + len)
    }

    /// Index of the delimiter closing the one at `open`.
    ///
    /// Only delimiters of the same kind are counted; comments and literals
    /// are already masked so they cannot unbalance the count.
    pub fn matching_close(&self, open: usize) -> Option<usize> {
        let bytes = self.code.as_bytes();
        let opener = *bytes.get(open)?;
        let closer = match opener {
            b'{' => b'}',
            b'(' => b')',
            b'[' => b']',
            _ => return None,
        };

        let mut depth = 0usize;
        for (offset, byte) in bytes[open..].iter().enumerate() {
            if *byte == opener {
                depth += 1;
            } else if *byte == closer {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
        }

        None
    }

    /// First occurrence of `target` outside any nested delimiter in `range`.
    pub fn find_top_level(&self, range: Range<usize>, target: u8) -> Option<usize> {
        let bytes = self.code.as_bytes();
        let mut depth = 0usize;

        for index in range {
            let byte = bytes[index];
            if depth == 0 && byte == target {
                return Some(index);
            }
            match byte {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }

        None
    }

    /// Split `range` on a separator byte found outside nested delimiters.
    ///
    /// Separators are excluded from the returned pieces; an empty trailing
    /// piece (after a trailing separator) is dropped.
    pub fn split_top_level(&self, range: Range<usize>, separator: u8) -> Vec<Range<usize>> {
        let bytes = self.code.as_bytes();
        let mut pieces = Vec::new();
        let mut depth = 0usize;
        let mut start = range.start;

        for index in range.clone() {
            match bytes[index] {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                byte if byte == separator && depth == 0 => {
                    pieces.push(start..index);
                    start = index + 1;
                }
                _ => {}
            }
        }

        if !self.is_blank(start..range.end) {
            pieces.push(start..range.end);
        }

        pieces
    }

    /// Split a declaration body into statements.
    ///
    /// A statement ends at a top-level `;` or at the `}` that closes a block
    /// opened at top level (a method with a default body). Terminators are
    /// included in the statement; leading comments stay attached to the
    /// statement that follows them.
    pub fn split_statements(&self, range: Range<usize>) -> Vec<Range<usize>> {
        let bytes = self.code.as_bytes();
        let mut statements = Vec::new();
        let mut depth = 0usize;
        let mut start = range.start;

        for index in range.clone() {
            match bytes[index] {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' => depth = depth.saturating_sub(1),
                b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        statements.push(start..index + 1);
                        start = index + 1;
                    }
                }
                b';' if depth == 0 => {
                    statements.push(start..index + 1);
                    start = index + 1;
                }
                _ => {}
            }
        }

        if !self.is_blank(start..range.end) {
            statements.push(start..range.end);
        }

        statements
    }

    /// Start of the line containing `index`.
    pub fn line_start(&self, index: usize) -> usize {
        self.code[..index].rfind('\n').map_or(0, |pos| pos + 1)
    }

    /// Start of the attribute and comment lines directly above `index`.
    ///
    /// Walks back over lines that are `//` comments or `#[...]` attributes and
    /// stops at the first blank or code line.
    pub fn decoration_start(&self, index: usize) -> usize {
        let mut start = self.line_start(index);

        while start > 0 {
            let previous = self.line_start(start - 1);
            let line = self.source[previous..start].trim();
            if line.starts_with("//") || line.starts_with("#[") {
                start = previous;
            } else {
                break;
            }
        }

        start
    }
}

/// Comment lines of a text span, trimmed of indentation, in order.
pub fn comment_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with("//"))
        .map(str::to_string)
        .collect()
}

fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Replace comment text and literal contents with spaces.
///
/// Newlines are kept so line-based lookups still work; quote characters are
/// kept so literals remain visible as (empty) tokens.
fn mask(source: &str, syntax: Syntax) -> String {
    let bytes = source.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = source[i..].find('\n').map_or(bytes.len(), |pos| i + pos);
                blank(&mut out, i..end);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = source[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |pos| i + 2 + pos + 2);
                blank(&mut out, i..end);
                i = end;
            }
            b'r' if syntax == Syntax::Rust => match raw_string_open(bytes, i) {
                Some((hashes, content)) => {
                    let close = raw_string_close(bytes, content, hashes);
                    blank(&mut out, content..close.unwrap_or(bytes.len()));
                    i = close.map_or(bytes.len(), |at| at + 1 + hashes);
                }
                None => i += 1,
            },
            b'"' => {
                let end = quoted_end(bytes, i + 1, b'"', true);
                blank(&mut out, i + 1..end.saturating_sub(1).max(i + 1));
                i = end;
            }
            b'`' if syntax == Syntax::Go => {
                let end = quoted_end(bytes, i + 1, b'`', false);
                blank(&mut out, i + 1..end.saturating_sub(1).max(i + 1));
                i = end;
            }
            b'\'' => match char_literal_end(source, i) {
                Some(end) => {
                    blank(&mut out, i + 1..end - 1);
                    i = end;
                }
                // A Rust lifetime such as 'a
                None => i += 1,
            },
            _ => i += 1,
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Index just past the closing quote, or the end of input.
fn quoted_end(bytes: &[u8], mut i: usize, quote: u8, escapes: bool) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if escapes => i += 2,
            byte if byte == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Hash count and content start of a Rust raw string (`r"`, `r#"`, `br"`)
/// whose `r` is at `at`.
fn raw_string_open(bytes: &[u8], at: usize) -> Option<(usize, usize)> {
    let prefix_ok = match at.checked_sub(1).map(|prev| bytes[prev]) {
        None => true,
        Some(b'b') => at < 2 || !is_ident_byte(bytes[at - 2]),
        Some(prev) => !is_ident_byte(prev),
    };
    if !prefix_ok {
        return None;
    }

    let mut quote = at + 1;
    while bytes.get(quote) == Some(&b'#') {
        quote += 1;
    }
    (bytes.get(quote) == Some(&b'"')).then_some((quote - at - 1, quote + 1))
}

/// Index of the quote closing a raw string with `hashes` hashes.
fn raw_string_close(bytes: &[u8], content: usize, hashes: usize) -> Option<usize> {
    (content..bytes.len()).find(|&at| {
        bytes[at] == b'"'
            && bytes
                .get(at + 1..at + 1 + hashes)
                .is_some_and(|tail| tail.iter().all(|&byte| byte == b'#'))
    })
}

/// Index just past a character literal starting at `open`, if it is one.
fn char_literal_end(source: &str, open: usize) -> Option<usize> {
    let rest = &source[open + 1..];
    let first = rest.chars().next()?;

    if first == '\\' {
        let close = rest.get(2..)?.find('\'')?;
        return Some(open + 1 + 2 + close + 1);
    }

    let after = open + 1 + first.len_utf8();
    (source.as_bytes().get(after) == Some(&b'\'')).then_some(after + 1)
}

fn blank(out: &mut [u8], range: Range<usize>) {
    for byte in &mut out[range] {
        if *byte != b'\n' {
            *byte = b' ';
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn mask___blanks_line_comments_and_keeps_length() {
        let source = "fn a(); // has { brace\nfn b();";
        let masked = Masked::new(source, Syntax::Rust);

        assert_eq!(masked.code().len(), source.len());
        assert!(!masked.code().contains('{'));
        assert!(masked.code().contains("fn b();"));
    }

    #[test]
    fn mask___blanks_block_comments_but_keeps_newlines() {
        let source = "a /* { \n } */ b";
        let masked = Masked::new(source, Syntax::Rust);

        assert_eq!(
            masked.code(),
            format!("a{}\n{}b", " ".repeat(6), " ".repeat(6))
        );
    }

    #[test]
    fn mask___blanks_string_contents() {
        let source = r#"#[rpc(name = "a;b{")] fn x();"#;
        let masked = Masked::new(source, Syntax::Rust);

        assert_eq!(masked.code().matches(';').count(), 1);
        assert!(!masked.code().contains('{'));
    }

    #[test]
    fn mask___handles_escaped_quotes() {
        let source = r#"let s = "a \" {"; {}"#;
        let masked = Masked::new(source, Syntax::Rust);

        assert_eq!(masked.code().matches('{').count(), 1);
    }

    #[test]
    fn mask___raw_string_backslash___does_not_escape_quote() {
        let source = "const P: &str = r\"C:\\\";\npub struct A {}";
        let masked = Masked::new(source, Syntax::Rust);

        assert!(masked.code().contains("pub struct A {}"));
    }

    #[test]
    fn mask___hashed_raw_string___ends_at_matching_hashes() {
        let source = r###"let s = br#"a "} {"#; struct B {}"###;
        let masked = Masked::new(source, Syntax::Rust);

        assert_eq!(masked.code().matches('{').count(), 1);
        assert!(masked.code().contains("; struct B {}"));
    }

    #[test]
    fn mask___raw_identifier___is_not_a_raw_string() {
        let source = "pub r#type: U64, s: \"{\"";
        let masked = Masked::new(source, Syntax::Rust);

        assert!(masked.code().starts_with("pub r#type: U64"));
        assert!(!masked.code().contains('{'));
    }

    #[test]
    fn mask___keeps_lifetimes_and_blanks_char_literals() {
        let source = "fn f<'a>(x: &'a str) { let c = '{'; }";
        let masked = Masked::new(source, Syntax::Rust);

        assert_eq!(masked.code().matches('{').count(), 1);
        assert!(masked.code().contains("&'a str"));
    }

    #[test]
    fn mask___blanks_go_raw_strings() {
        let source = "type A struct {\n\tB int `json:\"b}\"`\n}";
        let masked = Masked::new(source, Syntax::Go);

        let open = source.find('{').unwrap();

        assert_eq!(masked.matching_close(open), Some(source.len() - 1));
    }

    #[test]
    fn mask___handles_multibyte_comment_text() {
        let source = "// héllo {\nfn a();";
        let masked = Masked::new(source, Syntax::Rust);

        assert_eq!(masked.code().len(), source.len());
        assert_eq!(masked.find_keyword("fn", 0), Some(source.find("fn").unwrap()));
    }

    #[test]
    fn find_keyword___matches_whole_words_only() {
        let masked = Masked::new("structure struct Foo", Syntax::Rust);

        assert_eq!(masked.find_keyword("struct", 0), Some(10));
    }

    #[test]
    fn find_keyword___ignores_commented_keywords() {
        let masked = Masked::new("// trait Old\ntrait New {}", Syntax::Rust);

        assert_eq!(masked.find_keyword("trait", 0), Some(13));
    }

    #[test]
    fn matching_close___skips_nested_braces() {
        let source = "{ a { b } c }";
        let masked = Masked::new(source, Syntax::Rust);

        assert_eq!(masked.matching_close(0), Some(12));
        assert_eq!(masked.matching_close(4), Some(8));
    }

    #[test]
    fn matching_close___returns_none_when_unbalanced() {
        let masked = Masked::new("{ a { b }", Syntax::Rust);

        assert_eq!(masked.matching_close(0), None);
        assert_eq!(masked.matching_close(2), None);
    }

    #[test]
    fn split_top_level___ignores_nested_commas() {
        let source = "a: Vec<u8>, b: (u8, u16), c: [u8; 2],";
        let masked = Masked::new(source, Syntax::Rust);

        let pieces: Vec<&str> = masked
            .split_top_level(0..source.len(), b',')
            .into_iter()
            .map(|r| masked.slice(r).trim())
            .collect();

        assert_eq!(pieces, vec!["a: Vec<u8>", "b: (u8, u16)", "c: [u8; 2]"]);
    }

    #[test]
    fn split_statements___splits_on_semicolons_and_default_bodies() {
        let source = "fn a(&self);\n fn b(&self) { x; y }\n fn c(&self);\n";
        let masked = Masked::new(source, Syntax::Rust);

        let statements: Vec<&str> = masked
            .split_statements(0..source.len())
            .into_iter()
            .map(|r| masked.slice(r).trim())
            .collect();

        assert_eq!(
            statements,
            vec!["fn a(&self);", "fn b(&self) { x; y }", "fn c(&self);"]
        );
    }

    #[test]
    fn split_statements___keeps_leading_comments_with_statement() {
        let source = "// first; note\nfn a(&self);";
        let masked = Masked::new(source, Syntax::Rust);

        let statements = masked.split_statements(0..source.len());

        assert_eq!(statements.len(), 1);
        assert!(masked.slice(statements[0].clone()).starts_with("// first"));
    }

    #[test]
    fn decoration_start___includes_comments_and_attributes() {
        let source = "use x;\n\n/// Doc\n#[derive(Debug)]\npub struct A {}";
        let masked = Masked::new(source, Syntax::Rust);
        let keyword = masked.find_keyword("struct", 0).unwrap();

        assert_eq!(masked.decoration_start(keyword), source.find("///").unwrap());
    }

    #[test]
    fn comment_lines___keeps_only_comments() {
        let text = "}\n\n\t// GetA returns a\n// more\nvar x = 1\n";

        assert_eq!(comment_lines(text), vec!["// GetA returns a", "// more"]);
    }
}
