use std::process::ExitCode;

use crate::span::{SourceExcerpt, Span};

/// Severity of a [`Diagnostic`]. Every `Error` diagnostic is fatal by the
/// time it reaches [`report`] — there is no local recovery path once the
/// checker has decided to raise one, only the park/not-yet-decided state
/// which never produces a `Diagnostic` at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Error,
    Info,
}

/// The fixed error taxonomy. Every fatal condition the checker can raise
/// belongs to exactly one of these; `message` carries the specific text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TypeMismatch,
    UnresolvedName,
    CircularDependency,
    UseBeforeDefinition,
    BadLvalue,
    ShapeError,
    RangeError,
    Unimplemented,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "type-mismatch",
            ErrorKind::UnresolvedName => "unresolved-name",
            ErrorKind::CircularDependency => "circular-dependency",
            ErrorKind::UseBeforeDefinition => "use-before-definition",
            ErrorKind::BadLvalue => "bad-lvalue",
            ErrorKind::ShapeError => "shape-error",
            ErrorKind::RangeError => "range-error",
            ErrorKind::Unimplemented => "unimplemented",
        }
    }
}

/// A secondary location attached to a diagnostic, e.g. the declaration site
/// referenced by a circular-dependency or use-before-definition error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInformation {
    pub span: Span,
    pub message: String,
}

/// A structured, catchable diagnostic value. This is deliberately a plain
/// struct rather than an error enum with `thiserror`: every `Error`-category
/// instance is fatal at the point the checker produces it, so there is no
/// `Result`-shaped recovery to model beyond "fatal" vs. "park" (which is not
/// a diagnostic at all — see `tc_checker`'s `inferred_type: Option<TypeId>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub kind: Option<ErrorKind>,
    pub span: Span,
    pub message: String,
    pub related: Vec<RelatedInformation>,
}

impl Diagnostic {
    pub fn error(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            category: DiagnosticCategory::Error,
            kind: Some(kind),
            span,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub fn info(span: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            category: DiagnosticCategory::Info,
            kind: None,
            span,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related.push(RelatedInformation { span, message: message.into() });
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

const RESET: &str = "\x1b[0m";
const CYAN: &str = "\x1b[36m";
const RED: &str = "\x1b[31m";

/// Renders a diagnostic the way the checker presents it on stderr: a
/// `path:line:col: Error|Info: message` header, a blank line, and a
/// two-line excerpt — the previous line in cyan for context, the offending
/// line in red with the span underlined.
pub fn format_report(diagnostic: &Diagnostic, excerpt: &SourceExcerpt) -> String {
    let label = match diagnostic.category {
        DiagnosticCategory::Error => "Error",
        DiagnosticCategory::Info => "Info",
    };
    let mut out = String::new();
    out.push_str(&format!(
        "{}:{}:{}: {}: {}\n\n",
        excerpt.file_path, excerpt.line, excerpt.column, label, diagnostic.message
    ));
    if let Some(prev) = &excerpt.previous_line_text {
        out.push_str(&format!("{CYAN}{prev}{RESET}\n"));
    }
    out.push_str(&format!("{RED}{}{RESET}\n", excerpt.line_text));
    for related in &diagnostic.related {
        out.push_str(&format!("  related: {}\n", related.message));
    }
    out
}

/// Non-fatal report: prints to stderr and returns.
pub fn report_info(diagnostic: &Diagnostic, excerpt: &SourceExcerpt) {
    debug_assert_eq!(diagnostic.category, DiagnosticCategory::Info);
    eprint!("{}", format_report(diagnostic, excerpt));
}

/// Fatal report: prints to stderr and terminates the process, matching the
/// source checker's `report_error` which never returns to its caller.
pub fn report_error(diagnostic: &Diagnostic, excerpt: &SourceExcerpt) -> ! {
    debug_assert_eq!(diagnostic.category, DiagnosticCategory::Error);
    tracing::warn!(message = %diagnostic.message, kind = ?diagnostic.kind, "fatal type error");
    eprint!("{}", format_report(diagnostic, excerpt));
    std::process::exit(1)
}

/// Used by binaries embedding this crate that prefer returning an
/// [`ExitCode`] from `main` over calling [`report_error`] directly.
pub fn exit_code_for(diagnostic: &Diagnostic) -> ExitCode {
    match diagnostic.category {
        DiagnosticCategory::Error => ExitCode::FAILURE,
        DiagnosticCategory::Info => ExitCode::SUCCESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_diagnostic_is_fatal() {
        let d = Diagnostic::error(ErrorKind::TypeMismatch, Span::new(0, 1), "mismatch");
        assert!(d.is_fatal());
        assert_eq!(d.kind, Some(ErrorKind::TypeMismatch));
    }

    #[test]
    fn info_diagnostic_is_not_fatal() {
        let d = Diagnostic::info(Span::new(0, 1), "note");
        assert!(!d.is_fatal());
        assert_eq!(d.kind, None);
    }

    #[test]
    fn with_related_appends_entries() {
        let d = Diagnostic::error(ErrorKind::CircularDependency, Span::new(0, 1), "cycle")
            .with_related(Span::new(5, 6), "declared here");
        assert_eq!(d.related.len(), 1);
        assert_eq!(d.related[0].message, "declared here");
    }

    #[test]
    fn format_report_includes_header_and_excerpt() {
        let d = Diagnostic::error(ErrorKind::RangeError, Span::new(3, 6), "too big");
        let excerpt = SourceExcerpt {
            file_path: "main.lang".to_string(),
            line: 2,
            column: 5,
            previous_line_text: Some("x :: 1;".to_string()),
            line_text: "y : u8 = 300;".to_string(),
            highlight_start_column: 10,
            highlight_end_column: 13,
        };
        let rendered = format_report(&d, &excerpt);
        assert!(rendered.contains("main.lang:2:5: Error: too big"));
        assert!(rendered.contains("x :: 1;"));
        assert!(rendered.contains("y : u8 = 300;"));
    }
}
