//! Go source rendering from the intermediate representation.
//!
//! Every function here is template rendering over already-extracted values:
//! nothing inspects schema or client text, and every declaration maps to
//! exactly one rendered block (or one skip marker).

use super::go_types::TypeMapper;
use super::ir::{BatchCandidate, MethodDecl, StructDecl, TargetType};
use super::naming::{go_param_name, to_lower_camel, to_upper_camel};
use super::scan::{Masked, Syntax};
use crate::config::GeneratorConfig;
use crate::diagnostics::Diagnostic;

/// First line of every generated file.
pub const GENERATED_BANNER: &str = "// Code generated by rpcgen. DO NOT EDIT.";

/// Renders Go declarations for one configuration.
#[derive(Debug, Clone)]
pub struct GoEmitter<'a> {
    config: &'a GeneratorConfig,
    mapper: TypeMapper,
}

impl<'a> GoEmitter<'a> {
    pub fn new(config: &'a GeneratorConfig, mapper: TypeMapper) -> Self {
        Self { config, mapper }
    }

    /// Render a data record as a Go struct with json tags.
    pub fn render_struct(&self, decl: &StructDecl) -> String {
        let mut code = String::new();

        for doc in &decl.docs {
            code.push_str(&format!("// {doc}\n"));
        }
        code.push_str(&format!("type {} struct {{\n", decl.name));

        let rows: Vec<(String, String, String)> = decl
            .fields
            .iter()
            .map(|field| {
                let key = field
                    .serde_rename
                    .clone()
                    .unwrap_or_else(|| to_lower_camel(&field.source_name));
                (
                    to_upper_camel(&field.source_name),
                    self.mapper.resolve(&field.ty).to_string(),
                    format!("`json:\"{key}\"`"),
                )
            })
            .collect();

        // gofmt column alignment
        let name_width = rows.iter().map(|(name, _, _)| name.len()).max().unwrap_or(0);
        let type_width = rows.iter().map(|(_, ty, _)| ty.len()).max().unwrap_or(0);

        for (field, (name, ty, tag)) in decl.fields.iter().zip(&rows) {
            for doc in &field.docs {
                code.push_str(&format!("\t// {doc}\n"));
            }
            code.push_str(&format!("\t{name:name_width$} {ty:type_width$} {tag}\n"));
        }

        code.push('}');
        code
    }

    /// Render the client type and its constructor.
    pub fn render_client_type(&self, namespace: &str) -> String {
        let client = &self.config.client;
        let type_name = client.type_name(namespace);

        format!(
            "type {type_name} struct {{\n\
             \t{field} *{core}\n\
             }}\n\
             \n\
             func New{type_name}({field} *{core}) {type_name} {{\n\
             \treturn {type_name}{{{field}}}\n\
             }}",
            field = client.core_field,
            core = client.core_type,
        )
    }

    /// Render one client stub: a single synchronous invocation.
    pub fn render_stub(&self, method: &MethodDecl, namespace: &str) -> String {
        let client = &self.config.client;
        let mut code = String::new();

        if let Some(doc) = &method.doc_comment {
            code.push_str(doc);
            code.push('\n');
        }

        let params: Vec<(String, TargetType)> = method
            .params
            .iter()
            .map(|param| {
                (
                    stub_param_name(&param.name, &client.receiver),
                    self.mapper.resolve(&param.ty),
                )
            })
            .collect();
        let result = if params.iter().any(|(name, _)| name == "val") {
            "result"
        } else {
            "val"
        };

        let declared = params
            .iter()
            .map(|(name, ty)| format!("{name} {ty}"))
            .collect::<Vec<_>>()
            .join(", ");
        let forwarded: String = params
            .iter()
            .map(|(name, _)| format!(", {name}"))
            .collect();

        code.push_str(&format!(
            "func ({recv} *{client_type}) {name}({declared}) ({result} {ret}, err error) {{\n",
            recv = client.receiver,
            client_type = client.type_name(namespace),
            name = method.function_name,
            ret = self.mapper.resolve(&method.return_type),
        ));
        code.push_str(&format!(
            "\terr = {recv}.{core}.{invoke}(&{result}, \"{rpc}\"{forwarded})\n",
            recv = client.receiver,
            core = client.core_field,
            invoke = client.invoke,
            rpc = method.rpc_name,
        ));
        code.push_str("\treturn\n}");
        code
    }

    /// Render the batch caller type, its constructor and `Execute`.
    pub fn render_bulk_header(&self, client_type: &str) -> String {
        let bulk = &self.config.bulk;
        let caller = bulk.caller_name(client_type);
        let queue = &bulk.queue_field;

        format!(
            "// {caller} queues {client_type} calls and sends them in one batch request.\n\
             type {caller} struct {{\n\
             \tcaller {core}\n\
             \t{queue} *[]{elem}\n\
             }}\n\
             \n\
             // New{caller} creates a {caller} appending to {queue}.\n\
             func New{caller}(caller {core}, {queue} *[]{elem}) *{caller} {{\n\
             \treturn &{caller}{{caller, {queue}}}\n\
             }}\n\
             \n\
             // Execute sends all queued calls in one batch request.\n\
             func (b *{caller}) Execute() ([]error, error) {{\n\
             \treturn {execute}(b.caller, b.{queue})\n\
             }}",
            core = bulk.caller_core_type,
            elem = bulk.queue_elem_type,
            execute = bulk.execute_fn,
        )
    }

    /// Render the batched variant of a client method.
    ///
    /// The method allocates the result holder and a deferred error, keeps the
    /// statements around the original call, and queues a descriptor instead
    /// of calling.
    pub fn render_batch(&self, candidate: &BatchCandidate) -> String {
        let bulk = &self.config.bulk;
        let caller = bulk.caller_name(&candidate.receiver_type);
        let recv = &candidate.receiver_name;
        let batched = candidate.batched_return();
        let mut code = String::new();

        code.push_str(&format!(
            "func ({recv} *{caller}) {} ({batched}, *error) {{\n",
            candidate.signature
        ));
        code.push_str(&format!("\tresult := {}\n", allocation(&batched)));
        code.push_str("\terr := new(error)\n\n");

        push_indented(&mut code, &candidate.pre_call);
        code.push_str(&format!(
            "\t*{recv}.{queue} = append(*{recv}.{queue}, {descriptor}(result, {args}))\n",
            queue = bulk.queue_field,
            descriptor = bulk.descriptor_fn,
            args = candidate.call_args,
        ));
        push_indented(&mut code, &candidate.post_call);

        code.push_str("\n\treturn result, err\n}");
        code
    }
}

/// Parameter name that cannot shadow the receiver or the named `err` result.
fn stub_param_name(source: &str, receiver: &str) -> String {
    let name = go_param_name(source);
    if name == "err" || name == receiver {
        format!("{name}_")
    } else {
        name
    }
}

/// Skip marker emitted in place of a declaration.
pub fn render_skip(diagnostic: &Diagnostic) -> String {
    diagnostic.marker()
}

/// Render banner, package clause and the imports `body` references.
pub fn render_header(package: &str, imports: &[String], body: &str) -> String {
    let mut code = String::new();

    code.push_str(GENERATED_BANNER);
    code.push_str(&format!("\n\npackage {package}\n\n"));

    let masked = Masked::new(body, Syntax::Go);
    let mut used: Vec<String> = Vec::new();
    for spec in imports {
        let spec = spec.trim();
        let line = import_line(spec);
        if !used.contains(&line) && references_import(&masked, spec) {
            used.push(line);
        }
    }

    match used.as_slice() {
        [] => {}
        [single] => code.push_str(&format!("import {single}\n\n")),
        many => {
            code.push_str("import (\n");
            for line in many {
                code.push_str(&format!("\t{line}\n"));
            }
            code.push_str(")\n\n");
        }
    }

    code
}

/// `path` or `alias path` as a Go import line.
fn import_line(spec: &str) -> String {
    match spec.split_once(char::is_whitespace) {
        Some((alias, path)) => format!("{alias} \"{}\"", path.trim()),
        None => format!("\"{spec}\""),
    }
}

/// Whether the masked body uses the package an import spec brings in.
fn references_import(masked: &Masked<'_>, spec: &str) -> bool {
    let name = match spec.split_once(char::is_whitespace) {
        Some((alias, _)) => alias.to_string(),
        None => package_name(spec),
    };
    if name == "_" || name == "." {
        return true;
    }

    let mut cursor = 0;
    while let Some(at) = masked.find_keyword(&name, cursor) {
        let preceded_by_dot = at > 0 && masked.byte_at(at - 1) == Some(b'.');
        if !preceded_by_dot && masked.byte_at(at + name.len()) == Some(b'.') {
            return true;
        }
        cursor = at + name.len();
    }
    false
}

/// Default package name of an import path: its last element, skipping a
/// major-version suffix such as `/v2`.
fn package_name(path: &str) -> String {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let is_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|c| c.is_ascii_digit());

    match segments.next() {
        Some(previous) if is_version => previous.to_string(),
        _ => last.to_string(),
    }
}

/// Result holder allocation for a batched return type.
fn allocation(batched: &TargetType) -> String {
    match batched {
        TargetType::Pointer(inner) => format!("new({inner})"),
        TargetType::Slice(_) => format!("make({batched}, 0)"),
        TargetType::Named(name) => format!("new({name})"),
    }
}

fn push_indented(code: &mut String, block: &str) {
    if block.is_empty() {
        return;
    }
    for line in block.lines() {
        if line.is_empty() {
            code.push('\n');
        } else {
            code.push_str(&format!("\t{line}\n"));
        }
    }
}

#[cfg(test)]
#[path = "go/go_tests.rs"]
mod go_tests;
