//! The `+ Headers` section: `Name: Value` lines from a preformatted asset.

use crate::ast::KeyValuePair;
use crate::report::AnnotationCode;
use crate::sourcemap::SourceMap;

use super::classifier::SectionKind;
use super::{Parsed, Parser};

impl Parser<'_> {
    /// Parses a headers list item into `out`.
    ///
    /// Names compare case-insensitively but are preserved verbatim.
    /// Duplicates within the container, and redefinitions of a header
    /// already set by the enclosing `scope` (resource headers seen from an
    /// action), each emit one `RedefinitionWarning`; the inner value wins.
    pub(crate) fn parse_headers(
        &mut self,
        pos: usize,
        scope: &[KeyValuePair],
        out: &mut Vec<KeyValuePair>,
        spans: &mut Vec<SourceMap>,
    ) -> Parsed<usize> {
        let (asset, sm, next) = self.preformatted_asset(pos, SectionKind::Headers)?;
        for line in asset.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match line.split_once(':') {
                Some((name, value)) if !name.trim().is_empty() => {
                    let name = name.trim();
                    let value = value.trim();
                    if let Some(existing) =
                        out.iter_mut().find(|h| h.name.eq_ignore_ascii_case(name))
                    {
                        existing.value = value.to_string();
                        self.report.warn(
                            AnnotationCode::RedefinitionWarning,
                            format!("duplicate definition of '{name}' header"),
                            sm.clone(),
                        );
                        continue;
                    }
                    if scope.iter().any(|h| h.name.eq_ignore_ascii_case(name)) {
                        self.report.warn(
                            AnnotationCode::RedefinitionWarning,
                            format!("overshadowing previous definition of '{name}' header"),
                            sm.clone(),
                        );
                    }
                    out.push(KeyValuePair::new(name, value));
                    spans.push(sm.clone());
                }
                _ => {
                    self.report.warn(
                        AnnotationCode::FormattingWarning,
                        "unable to parse HTTP header, expected 'X-Header-Name: value'",
                        sm.clone(),
                    );
                }
            }
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use crate::report::AnnotationCode;
    use crate::{ParseOptions, parse};
    use pretty_assertions::assert_eq;

    #[test]
    fn resource_headers_are_parsed_verbatim() {
        let source = "# /resource\n\n+ Headers\n\n        X-Resource-Header: Swordfighter XXII\n";
        let result = parse(source, ParseOptions::default());
        assert_eq!(result.report.error_code(), 0);
        let resource = &result.node.resource_groups[0].resources[0];
        assert_eq!(resource.headers.len(), 1);
        assert_eq!(resource.headers[0].name, "X-Resource-Header");
        assert_eq!(resource.headers[0].value, "Swordfighter XXII");
    }

    #[test]
    fn duplicate_header_in_one_container_warns_and_last_wins() {
        let source = "# /r\n\n+ Headers\n\n        X-One: a\n        X-One: b\n";
        let result = parse(source, ParseOptions::default());
        let resource = &result.node.resource_groups[0].resources[0];
        assert_eq!(resource.headers.len(), 1);
        assert_eq!(resource.headers[0].value, "b");
        assert_eq!(result.report.warnings.len(), 1);
        assert_eq!(
            result.report.warnings[0].code,
            AnnotationCode::RedefinitionWarning
        );
    }

    #[test]
    fn malformed_header_line_warns() {
        let source = "# /r\n\n+ Headers\n\n        not-a-header\n";
        let result = parse(source, ParseOptions::default());
        assert!(
            result
                .report
                .warnings
                .iter()
                .any(|w| w.code == AnnotationCode::FormattingWarning)
        );
    }
}
