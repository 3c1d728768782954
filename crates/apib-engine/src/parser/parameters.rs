//! The `+ Parameters` section and its nested parameter / `+ Values` items.

use crate::ast::{Parameter, ParameterUse};
use crate::blocks::BlockKind;
use crate::report::AnnotationCode;
use crate::sourcemap::SourceMap;

use super::classifier::{SectionKind, classify_list_item, parameter_signature};
use super::helpers::{
    DescriptionAccum, close_list_item, extract_first_line, first_content_block, name_block,
};
use super::{Parsed, Parser};

impl Parser<'_> {
    /// Parses a parameters list item; each child item is one parameter.
    pub(crate) fn parse_parameters(
        &mut self,
        pos: usize,
        out: &mut Vec<Parameter>,
        spans: &mut Vec<SourceMap>,
    ) -> Parsed<usize> {
        let (item_begin, item_close) = self.item_bounds(pos)?;
        let first = first_content_block(&self.stream, item_begin);
        let name_pos = name_block(&self.stream, item_begin);
        let before = out.len();

        let mut cur = if name_pos == first { name_pos + 1 } else { first };
        while cur < item_close {
            match self.stream.kind(cur) {
                Some(BlockKind::ListBegin) => {
                    let list_end = self.stream.skip_to_section_end(
                        cur,
                        BlockKind::ListBegin,
                        BlockKind::ListEnd,
                    );
                    cur += 1;
                    while cur < list_end {
                        if self.stream.kind(cur) == Some(BlockKind::ListItemBegin) {
                            cur = self.parse_parameter(cur, out, spans)?;
                        } else {
                            cur += 1;
                        }
                    }
                    cur = (list_end + 1).min(self.stream.len());
                }
                _ => cur = self.foreign_block(cur),
            }
        }

        if out.len() == before {
            self.report.warn(
                AnnotationCode::EmptyDefinitionWarning,
                "no parameters specified",
                self.stream.span(name_pos),
            );
        }
        Ok(close_list_item(&self.stream, item_close))
    }

    /// One parameter item:
    /// `name (type, required|optional, default=…, example=…) - description`.
    fn parse_parameter(
        &mut self,
        pos: usize,
        out: &mut Vec<Parameter>,
        spans: &mut Vec<SourceMap>,
    ) -> Parsed<usize> {
        let (item_begin, item_close) = self.item_bounds(pos)?;
        let first = first_content_block(&self.stream, item_begin);
        let name_pos = name_block(&self.stream, item_begin);

        let (signature, rest) = match self.stream.get(name_pos) {
            Some(block) => {
                let (line, rest) = extract_first_line(&block.content);
                (
                    parameter_signature(line),
                    rest.map(str::trim).unwrap_or_default().to_string(),
                )
            }
            None => (None, String::new()),
        };
        let Some(signature) = signature else {
            self.report.warn(
                AnnotationCode::FormattingWarning,
                "unable to parse parameter signature",
                self.stream.span(name_pos),
            );
            return Ok(close_list_item(&self.stream, item_close));
        };

        let mut parameter = Parameter {
            name: signature.name,
            description: signature.description,
            ..Default::default()
        };
        if !rest.is_empty() {
            if !parameter.description.is_empty() {
                parameter.description.push('\n');
            }
            parameter.description.push_str(&rest);
        }
        for attribute in &signature.attributes {
            if attribute.eq_ignore_ascii_case("required") {
                parameter.required = true;
                parameter.use_flag = ParameterUse::Required;
            } else if attribute.eq_ignore_ascii_case("optional") {
                parameter.required = false;
                parameter.use_flag = ParameterUse::Optional;
            } else if let Some(value) = attribute.strip_prefix("default=") {
                parameter.default_value = value.trim().trim_matches('`').to_string();
            } else if let Some(value) = attribute.strip_prefix("example=") {
                parameter.example_value = value.trim().trim_matches('`').to_string();
            } else if parameter.parameter_type.is_empty() {
                parameter.parameter_type = attribute.clone();
            } else {
                self.report.warn(
                    AnnotationCode::IgnoringWarning,
                    format!("ignoring unrecognized parameter attribute '{attribute}'"),
                    self.stream.span(name_pos),
                );
            }
        }
        if parameter.parameter_type.is_empty() {
            self.report.warn(
                AnnotationCode::EmptyDefinitionWarning,
                format!("no type specified for parameter '{}'", parameter.name),
                self.stream.span(name_pos),
            );
        }

        // nested sections: only Values is recognized here
        let mut extra = DescriptionAccum::default();
        let mut cur = if name_pos == first { name_pos + 1 } else { first };
        while cur < item_close {
            match self.stream.kind(cur) {
                Some(BlockKind::ListBegin) | Some(BlockKind::ListItemBegin) => {
                    if classify_list_item(&self.stream, cur, SectionKind::Parameters)
                        == SectionKind::Values
                    {
                        cur = self.parse_values(cur, &mut parameter.values)?;
                    } else if self.stream.kind(cur) == Some(BlockKind::ListBegin) {
                        cur = self.parse_parameter_children(cur, &mut parameter)?;
                    } else {
                        cur = self.foreign_block(cur);
                    }
                }
                _ => cur = self.absorb_description(cur, SectionKind::Parameters, &mut extra),
            }
        }
        if !extra.is_empty() {
            let (text, _) = extra.finish();
            if !text.is_empty() {
                if !parameter.description.is_empty() {
                    parameter.description.push('\n');
                }
                parameter.description.push_str(&text);
            }
        }

        if !parameter.default_value.is_empty()
            && !parameter.values.is_empty()
            && !parameter.values.contains(&parameter.default_value)
        {
            self.report.warn(
                AnnotationCode::LogicalErrorWarning,
                format!(
                    "the default value '{}' of parameter '{}' is not among its expected values",
                    parameter.default_value, parameter.name
                ),
                self.stream.span(name_pos),
            );
        }

        if let Some(existing) = out.iter_mut().find(|p| p.name == parameter.name) {
            self.report.warn(
                AnnotationCode::RedefinitionWarning,
                format!("redefinition of parameter '{}'", parameter.name),
                self.stream.span(name_pos),
            );
            *existing = parameter;
        } else {
            out.push(parameter);
            spans.push(self.stream.span(item_close));
        }
        Ok(close_list_item(&self.stream, item_close))
    }

    /// Walks a parameter's nested list, dispatching `Values` items and
    /// skipping foreign ones.
    fn parse_parameter_children(
        &mut self,
        pos: usize,
        parameter: &mut Parameter,
    ) -> Parsed<usize> {
        let begin = pos;
        if self.stream.kind(begin) == Some(BlockKind::ListBegin) {
            let list_end =
                self.stream
                    .skip_to_section_end(begin, BlockKind::ListBegin, BlockKind::ListEnd);
            let mut cur = begin + 1;
            while cur < list_end {
                if self.stream.kind(cur) == Some(BlockKind::ListItemBegin) {
                    match classify_list_item(&self.stream, cur, SectionKind::Parameters) {
                        SectionKind::Values => cur = self.parse_values(cur, &mut parameter.values)?,
                        _ => cur = self.foreign_block(cur),
                    }
                } else {
                    cur += 1;
                }
            }
            return Ok((list_end + 1).min(self.stream.len()));
        }
        Ok(self.foreign_block(begin))
    }

    /// A `+ Values` item: each child item's first line is one literal value.
    fn parse_values(&mut self, pos: usize, values: &mut Vec<String>) -> Parsed<usize> {
        let (item_begin, item_close) = self.item_bounds(pos)?;
        let first = first_content_block(&self.stream, item_begin);
        let name_pos = name_block(&self.stream, item_begin);
        let before = values.len();

        let mut cur = if name_pos == first { name_pos + 1 } else { first };
        while cur < item_close {
            match self.stream.kind(cur) {
                Some(BlockKind::ListBegin) => {
                    let list_end = self.stream.skip_to_section_end(
                        cur,
                        BlockKind::ListBegin,
                        BlockKind::ListEnd,
                    );
                    cur += 1;
                    while cur < list_end {
                        if self.stream.kind(cur) == Some(BlockKind::ListItemBegin) {
                            let value_pos = name_block(&self.stream, cur);
                            if let Some(block) = self.stream.get(value_pos) {
                                let (line, _) = extract_first_line(&block.content);
                                values.push(line.trim().trim_matches('`').to_string());
                            }
                            let item_end = self.stream.skip_to_section_end(
                                cur,
                                BlockKind::ListItemBegin,
                                BlockKind::ListItemEnd,
                            );
                            cur = item_end + 1;
                        } else {
                            cur += 1;
                        }
                    }
                    cur = (list_end + 1).min(self.stream.len());
                }
                _ => cur = self.foreign_block(cur),
            }
        }

        if values.len() == before {
            self.report.warn(
                AnnotationCode::EmptyDefinitionWarning,
                "no values specified",
                self.stream.span(name_pos),
            );
        }
        Ok(close_list_item(&self.stream, item_close))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::ParameterUse;
    use crate::report::AnnotationCode;
    use crate::{ParseOptions, parse};
    use pretty_assertions::assert_eq;

    fn parameters_fixture(signature: &str) -> String {
        format!("# /things/{{id}}\n\n+ Parameters\n    + {signature}\n")
    }

    #[test]
    fn parses_a_full_signature() {
        let result = parse(
            &parameters_fixture("id (number, required, default=1) - The thing ID"),
            ParseOptions::default(),
        );
        let parameter = &result.node.resource_groups[0].resources[0].parameters[0];
        assert_eq!(parameter.name, "id");
        assert_eq!(parameter.parameter_type, "number");
        assert!(parameter.required);
        assert_eq!(parameter.use_flag, ParameterUse::Required);
        assert_eq!(parameter.default_value, "1");
        assert_eq!(parameter.description, "The thing ID");
    }

    #[test]
    fn missing_type_warns() {
        let result = parse(
            &parameters_fixture("id (required) - The thing ID"),
            ParseOptions::default(),
        );
        assert!(
            result
                .report
                .warnings
                .iter()
                .any(|w| w.code == AnnotationCode::EmptyDefinitionWarning)
        );
    }

    #[test]
    fn duplicate_parameter_names_warn_and_last_wins() {
        let source =
            "# /things/{id}\n\n+ Parameters\n    + id (number) - first\n    + id (string) - second\n";
        let result = parse(source, ParseOptions::default());
        let parameters = &result.node.resource_groups[0].resources[0].parameters;
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters[0].parameter_type, "string");
        assert!(
            result
                .report
                .warnings
                .iter()
                .any(|w| w.code == AnnotationCode::RedefinitionWarning)
        );
    }

    #[test]
    fn values_list_is_collected() {
        let source = "# /things/{id}\n\n+ Parameters\n    + id (number) - The ID\n        + Values\n            + `1`\n            + `2`\n";
        let result = parse(source, ParseOptions::default());
        let parameter = &result.node.resource_groups[0].resources[0].parameters[0];
        assert_eq!(parameter.values, vec!["1", "2"]);
        assert_eq!(result.report.warnings.len(), 0);
    }

    #[test]
    fn default_value_outside_values_warns() {
        let source = "# /things/{id}\n\n+ Parameters\n    + id (number, default=9) - The ID\n        + Values\n            + `1`\n            + `2`\n";
        let result = parse(source, ParseOptions::default());
        assert!(
            result
                .report
                .warnings
                .iter()
                .any(|w| w.code == AnnotationCode::LogicalErrorWarning)
        );
    }
}
