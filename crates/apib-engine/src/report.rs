//! The parse report: accumulated warnings plus at most one error.
//!
//! Parsing is best effort. Warnings never stop it; the first fatal condition
//! is recorded as the error and later fatal conditions are dropped. Numeric
//! annotation codes are part of the public surface (the CLI exits with the
//! error code) and must stay stable.

use crate::sourcemap::SourceMap;

/// Stable numeric codes attached to every annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationCode {
    #[default]
    Ok = 0,
    BusinessError = 1,
    FormattingWarning = 2,
    IgnoringWarning = 3,
    RedefinitionWarning = 4,
    IndentationWarning = 5,
    EmptyDefinitionWarning = 6,
    LogicalErrorWarning = 7,
    NotSupportedWarning = 8,
    AmbiguityWarning = 9,
    UriWarning = 10,
}

impl AnnotationCode {
    pub fn value(self) -> u32 {
        self as u32
    }
}

/// A single diagnostic message with its source location.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub message: String,
    pub code: AnnotationCode,
    pub location: SourceMap,
}

impl Annotation {
    pub fn new(code: AnnotationCode, message: impl Into<String>, location: SourceMap) -> Self {
        Self {
            message: message.into(),
            code,
            location,
        }
    }
}

/// Accumulates annotations over one parse invocation.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub error: Option<Annotation>,
    pub warnings: Vec<Annotation>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning. Warnings never abort parsing.
    pub fn warn(&mut self, code: AnnotationCode, message: impl Into<String>, location: SourceMap) {
        self.warnings.push(Annotation::new(code, message, location));
    }

    /// Records a fatal condition. The first error wins; later ones are
    /// dropped.
    pub fn fail(&mut self, code: AnnotationCode, message: impl Into<String>, location: SourceMap) {
        if self.error.is_none() {
            self.error = Some(Annotation::new(code, message, location));
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// The numeric error code, `0` when the parse succeeded.
    pub fn error_code(&self) -> u32 {
        self.error.as_ref().map(|e| e.code.value()).unwrap_or(0)
    }

    /// Re-orders warnings by the document position of their triggering
    /// blocks. The symbol pre-pass runs ahead of the main parse, so its
    /// annotations can be recorded out of order; the parser calls this once
    /// at the end.
    pub fn sort_warnings(&mut self) {
        self.warnings
            .sort_by_key(|w| w.location.first_location().unwrap_or(usize::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_wins() {
        let mut report = Report::new();
        report.fail(AnnotationCode::BusinessError, "first", SourceMap::new());
        report.fail(AnnotationCode::UriWarning, "second", SourceMap::new());
        let error = report.error.unwrap();
        assert_eq!(error.message, "first");
        assert_eq!(error.code.value(), 1);
    }

    #[test]
    fn error_code_is_zero_without_error() {
        let mut report = Report::new();
        report.warn(AnnotationCode::IgnoringWarning, "w", SourceMap::new());
        assert_eq!(report.error_code(), 0);
        assert!(!report.has_error());
    }

    #[test]
    fn sort_warnings_orders_by_location() {
        let mut report = Report::new();
        report.warn(
            AnnotationCode::RedefinitionWarning,
            "late",
            SourceMap::from_range(40, 5),
        );
        report.warn(
            AnnotationCode::IgnoringWarning,
            "early",
            SourceMap::from_range(10, 5),
        );
        report.sort_warnings();
        assert_eq!(report.warnings[0].message, "early");
        assert_eq!(report.warnings[1].message, "late");
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(AnnotationCode::Ok.value(), 0);
        assert_eq!(AnnotationCode::BusinessError.value(), 1);
        assert_eq!(AnnotationCode::FormattingWarning.value(), 2);
        assert_eq!(AnnotationCode::IgnoringWarning.value(), 3);
        assert_eq!(AnnotationCode::RedefinitionWarning.value(), 4);
        assert_eq!(AnnotationCode::IndentationWarning.value(), 5);
        assert_eq!(AnnotationCode::EmptyDefinitionWarning.value(), 6);
        assert_eq!(AnnotationCode::LogicalErrorWarning.value(), 7);
        assert_eq!(AnnotationCode::NotSupportedWarning.value(), 8);
        assert_eq!(AnnotationCode::AmbiguityWarning.value(), 9);
        assert_eq!(AnnotationCode::UriWarning.value(), 10);
    }
}
