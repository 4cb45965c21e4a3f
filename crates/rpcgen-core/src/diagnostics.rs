//! Skip diagnostics for fragments that do not match the expected grammar.
//!
//! A structural mismatch never aborts a run. The extractor returns an
//! [`Extracted::Skipped`](crate::codegen::ir::Extracted) carrying one of
//! these, the emitter turns it into a skip marker, and the CLI can write the
//! collected list out as a JSON report.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of the fragment excerpt used as a fallback subject.
const SUBJECT_EXCERPT_LEN: usize = 60;

/// Which grammar the skipped fragment failed to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// A `struct` fragment whose head is not `pub struct Name {`.
    StructHead,
    /// A trait member that is not an `#[rpc]` method signature.
    TraitStatement,
    /// A Go function that is not a receiver-call-return client method.
    ClientMethod,
}

impl MismatchKind {
    /// Stable code for reports.
    pub fn code_str(self) -> &'static str {
        match self {
            MismatchKind::StructHead => "RG0101",
            MismatchKind::TraitStatement => "RG0102",
            MismatchKind::ClientMethod => "RG0103",
        }
    }

    /// Noun used in skip markers.
    pub fn label(self) -> &'static str {
        match self {
            MismatchKind::StructHead => "struct",
            MismatchKind::TraitStatement => "method",
            MismatchKind::ClientMethod => "client method",
        }
    }
}

/// A structural mismatch: one input fragment that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: MismatchKind,

    /// Name of the skipped declaration, when it could be read.
    pub subject: Option<String>,

    /// Why the fragment was skipped.
    pub reason: String,

    /// The raw fragment, for manual inspection.
    pub fragment: String,
}

impl Diagnostic {
    pub fn new(kind: MismatchKind, reason: impl Into<String>, fragment: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            subject: None,
            reason: reason.into(),
            fragment: fragment.into(),
        }
    }

    /// Attach the name of the skipped declaration.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// The subject, or the first code line of the fragment.
    pub fn subject_or_excerpt(&self) -> String {
        if let Some(subject) = &self.subject {
            return subject.clone();
        }

        let line = self
            .fragment
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with("//"))
            .unwrap_or("");

        if line.chars().count() > SUBJECT_EXCERPT_LEN {
            let excerpt: String = line.chars().take(SUBJECT_EXCERPT_LEN).collect();
            format!("{excerpt}...")
        } else {
            line.to_string()
        }
    }

    /// One-line comment emitted in place of the skipped declaration.
    pub fn marker(&self) -> String {
        format!(
            "// ignored {} `{}`: {}",
            self.kind.label(),
            self.subject_or_excerpt(),
            self.reason
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} skipped {} `{}`: {}",
            self.kind.code_str(),
            self.kind.label(),
            self.subject_or_excerpt(),
            self.reason
        )
    }
}
