//! Generation runs: extract, resolve, render, assemble.
//!
//! A [`Generator`] owns a validated configuration and its type mapper. Each
//! mode turns one input text into one [`GeneratedUnit`]; a run never aborts
//! on a mismatched declaration, it records a diagnostic and moves on.

use std::path::Path;

use serde::Serialize;

use crate::codegen::bulk::{BulkOptions, extract_client};
use crate::codegen::go::{GoEmitter, render_header, render_skip};
use crate::codegen::go_types::TypeMapper;
use crate::codegen::ir::Extracted;
use crate::codegen::structs::extract_structs;
use crate::codegen::traits::{TraitOptions, extract_traits};
use crate::config::GeneratorConfig;
use crate::diagnostics::Diagnostic;
use crate::error::{GenError, GenResult};

/// The output of one run: header, rendered declarations and the skips.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedUnit {
    /// Banner, package clause and imports.
    pub header: String,

    /// Rendered declarations and skip markers, in source order.
    pub declarations: Vec<String>,

    /// Declarations that were skipped.
    pub diagnostics: Vec<Diagnostic>,

    /// Number of declarations rendered from the input.
    pub generated: usize,
}

impl GeneratedUnit {
    fn assemble(
        package: &str,
        imports: &[String],
        declarations: Vec<String>,
        diagnostics: Vec<Diagnostic>,
        generated: usize,
    ) -> Self {
        let body = declarations.join("\n\n");
        Self {
            header: render_header(package, imports, &body),
            declarations,
            diagnostics,
            generated,
        }
    }

    /// The complete Go file.
    pub fn source(&self) -> String {
        let mut source = self.header.clone();
        source.push_str(&self.declarations.join("\n\n"));
        source.push('\n');
        source
    }

    pub fn skipped(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Runs the three generation modes for one configuration.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
    mapper: TypeMapper,
}

impl Generator {
    /// Validate `config` and build its type mapper.
    pub fn new(config: GeneratorConfig) -> GenResult<Self> {
        config.validate()?;
        let mapper = TypeMapper::new(config.type_table());
        Ok(Self { config, mapper })
    }

    fn emitter(&self) -> GoEmitter<'_> {
        GoEmitter::new(&self.config, self.mapper.clone())
    }

    /// Client stubs for every trait block of `schema`.
    ///
    /// `namespace` overrides the namespace derived from each trait name.
    pub fn client(&self, schema: &str, namespace: Option<&str>) -> GeneratedUnit {
        let client = &self.config.client;
        let emitter = self.emitter();
        let traits = extract_traits(
            schema,
            TraitOptions {
                namespace,
                result_wrappers: &client.result_wrappers,
            },
        );
        if traits.is_empty() {
            tracing::warn!("no trait blocks found in schema");
        }

        let mut declarations = Vec::new();
        let mut diagnostics = Vec::new();
        let mut generated = 0;

        for block in traits {
            tracing::debug!(
                "trait {} -> {}",
                block.name,
                client.type_name(&block.namespace)
            );
            declarations.push(emitter.render_client_type(&block.namespace));

            for method in block.methods {
                match method {
                    Extracted::Found(method) => {
                        declarations.push(emitter.render_stub(&method, &block.namespace));
                        generated += 1;
                    }
                    Extracted::Skipped(diagnostic) => {
                        report_skip(&diagnostic);
                        declarations.push(render_skip(&diagnostic));
                        diagnostics.push(diagnostic);
                    }
                }
            }
        }

        tracing::info!(
            "generated {} client stubs ({} skipped)",
            generated,
            diagnostics.len()
        );
        GeneratedUnit::assemble(
            &client.package,
            &client.imports,
            declarations,
            diagnostics,
            generated,
        )
    }

    /// Go structs for every data record of `schema`.
    ///
    /// Helper declarations are skipped without a marker.
    pub fn structs(&self, schema: &str) -> GeneratedUnit {
        let emitter = self.emitter();
        let mut declarations = Vec::new();
        let mut diagnostics = Vec::new();

        for outcome in extract_structs(schema) {
            match outcome {
                Extracted::Found(decl) => declarations.push(emitter.render_struct(&decl)),
                Extracted::Skipped(diagnostic) => {
                    tracing::debug!("{}", diagnostic);
                    diagnostics.push(diagnostic);
                }
            }
        }

        let generated = declarations.len();
        tracing::info!(
            "generated {} structs ({} skipped)",
            generated,
            diagnostics.len()
        );
        GeneratedUnit::assemble(
            &self.config.structs.package,
            &self.config.structs.imports,
            declarations,
            diagnostics,
            generated,
        )
    }

    /// Batched caller for the client methods of `source`.
    ///
    /// `client_type` selects the receiver to rewrite; by default it is the
    /// first receiver in the file. Fails when the file has no method at all.
    pub fn bulk(&self, source: &str, client_type: Option<&str>) -> GenResult<GeneratedUnit> {
        let bulk = &self.config.bulk;
        let emitter = self.emitter();
        let client = extract_client(
            source,
            BulkOptions {
                primitives: &bulk.primitives,
                client_type,
            },
        );
        let Some(client_type) = client.client_type.as_deref() else {
            return Err(GenError::Input(
                "no method with a receiver found in client source".to_string(),
            ));
        };
        tracing::debug!("{} -> {}", client_type, bulk.caller_name(client_type));

        let mut declarations = vec![emitter.render_bulk_header(client_type)];
        let mut diagnostics = Vec::new();
        let mut generated = 0;
        let mut pending = client.leading_comments;

        for method in client.methods {
            let rendered = match method.outcome {
                Extracted::Found(candidate) => {
                    generated += 1;
                    emitter.render_batch(&candidate)
                }
                Extracted::Skipped(diagnostic) => {
                    report_skip(&diagnostic);
                    let marker = render_skip(&diagnostic);
                    diagnostics.push(diagnostic);
                    marker
                }
            };

            declarations.push(with_comments(&pending, rendered));
            pending = method.trailing_comments;
        }
        if !pending.is_empty() {
            declarations.push(pending.join("\n"));
        }

        declarations.extend(
            bulk.extra_functions
                .iter()
                .map(|extra| extra.trim().to_string())
                .filter(|extra| !extra.is_empty()),
        );

        tracing::info!(
            "generated {} batched methods for {} ({} skipped)",
            generated,
            client_type,
            diagnostics.len()
        );

        let mut imports = bulk.imports.clone();
        imports.extend(client.imports);
        Ok(GeneratedUnit::assemble(
            &bulk.package,
            &imports,
            declarations,
            diagnostics,
            generated,
        ))
    }
}

/// Read a top-level input file.
pub fn read_input(path: &Path) -> GenResult<String> {
    std::fs::read_to_string(path).map_err(|source| GenError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn report_skip(diagnostic: &Diagnostic) {
    tracing::warn!("{}", diagnostic);
    tracing::debug!("skipped fragment:\n{}", diagnostic.fragment);
}

fn with_comments(comments: &[String], declaration: String) -> String {
    if comments.is_empty() {
        declaration
    } else {
        format!("{}\n{declaration}", comments.join("\n"))
    }
}
