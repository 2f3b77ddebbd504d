//! Rule-file reader.
//!
//! One rule per line, comma separated and split into at most five fields so
//! the final field may itself contain commas. Lines that are blank or start
//! with `#` are ignored:
//!
//! ```text
//! # type,srcKey,srcValue,targetKey,targetValue
//! point,shop,bakery,shop,bakery
//! line,NAME,,name,-
//! # kind,action,key,value
//! way,exclude,highway,track
//! ```
//!
//! Malformed lines never abort parsing; they are reported as
//! [`ParseWarning`]s next to the rules that did parse.

use std::io::BufRead;

use log::debug;
use thiserror::Error;

use super::{ExcludeRule, MappingRule, RuleSet};
use crate::class::GeometryClass;
use crate::primitive::PrimitiveKind;

const EXCLUDE_ACTION: &str = "exclude";
const ANY_VALUE: &str = "";
const COPY_SOURCE_VALUE: &str = "-";

/// A skipped rule-file line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWarning {
    /// A five-field line named an unknown geometry class.
    #[error("line {line}: unknown type {token}")]
    UnknownGeometryClass {
        /// One-based line number.
        line: usize,
        /// Offending type token.
        token: String,
    },
    /// A four-field line named an unknown primitive kind.
    #[error(
        "skipped line {line}: \"{content}\". Unknown primitive type specified. Unless you're \
         writing an exclude rule, the line probably lacks a comma."
    )]
    UnknownPrimitiveKind {
        /// One-based line number.
        line: usize,
        /// Raw line text.
        content: String,
    },
    /// The line split into neither four nor five fields.
    #[error("skipped line {line}: \"{content}\". Had {fields} pieces and expected 4 or 5.")]
    FieldCount {
        /// One-based line number.
        line: usize,
        /// Raw line text.
        content: String,
        /// Number of fields found.
        fields: usize,
    },
}

/// Rules parsed from one rule file, with the lines that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRules {
    /// Rules that parsed successfully.
    pub rules: RuleSet,
    /// One entry per skipped line, in file order.
    pub warnings: Vec<ParseWarning>,
}

/// Errors raised while reading a rule file.
#[derive(Debug, Error)]
pub enum RuleFileError {
    /// Reading a line from the underlying reader failed.
    #[error("failed to read rule file at line {line}")]
    Read {
        /// One-based number of the line being read.
        line: usize,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
}

impl RuleSet {
    /// Parse rule-file text.
    ///
    /// # Examples
    /// ```
    /// use shp_to_osm_core::{GeometryClass, RuleSet};
    ///
    /// let parsed = RuleSet::parse("point,shop,bakery,shop,bakery\nbogus line\n");
    /// assert_eq!(parsed.rules.rules_for(GeometryClass::Point).len(), 1);
    /// assert_eq!(parsed.warnings.len(), 1);
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> ParsedRules {
        let mut parser = LineParser::default();
        for (index, line) in text.lines().enumerate() {
            parser.line(index + 1, line);
        }
        parser.finish()
    }

    /// Parse a rule file from a buffered reader.
    ///
    /// # Errors
    /// Returns [`RuleFileError::Read`] when the reader fails. Malformed lines
    /// are reported through [`ParsedRules::warnings`] instead.
    pub fn read_from<R: BufRead>(reader: R) -> Result<ParsedRules, RuleFileError> {
        let mut parser = LineParser::default();
        for (index, line) in reader.lines().enumerate() {
            let number = index + 1;
            let text = line.map_err(|source| RuleFileError::Read {
                line: number,
                source,
            })?;
            parser.line(number, &text);
        }
        Ok(parser.finish())
    }
}

#[derive(Debug, Default)]
struct LineParser {
    parsed: ParsedRules,
}

impl LineParser {
    fn line(&mut self, number: usize, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }

        // Fields are taken from the untrimmed line.
        let fields: Vec<&str> = line.splitn(5, ',').collect();
        match fields.as_slice() {
            [class, source_key, source_value, target_key, target_value] => {
                self.mapping(number, class, source_key, source_value, target_key, target_value);
            }
            [kind, action, key, value] => self.filter(number, line, kind, action, key, value),
            _ => self.parsed.warnings.push(ParseWarning::FieldCount {
                line: number,
                content: line.to_owned(),
                fields: fields.len(),
            }),
        }
    }

    fn mapping(
        &mut self,
        number: usize,
        class: &str,
        source_key: &str,
        source_value: &str,
        target_key: &str,
        target_value: &str,
    ) {
        let Ok(class) = class.parse::<GeometryClass>() else {
            self.parsed.warnings.push(ParseWarning::UnknownGeometryClass {
                line: number,
                token: class.to_owned(),
            });
            return;
        };
        let source_value = (source_value != ANY_VALUE).then(|| source_value.to_owned());
        let target_value = (target_value != COPY_SOURCE_VALUE).then_some(target_value);
        let rule = MappingRule::new(class, source_key, source_value, target_key, target_value);
        debug!("Adding {rule}");
        self.parsed.rules.add_rule(rule);
    }

    fn filter(&mut self, number: usize, line: &str, kind: &str, action: &str, key: &str, value: &str) {
        let Ok(kind) = kind.parse::<PrimitiveKind>() else {
            self.parsed.warnings.push(ParseWarning::UnknownPrimitiveKind {
                line: number,
                content: line.to_owned(),
            });
            return;
        };
        if action != EXCLUDE_ACTION {
            debug!("Line {number}: ignoring unsupported action '{action}'");
            return;
        }
        let rule = ExcludeRule::new(kind, key, value);
        debug!("Adding {rule}");
        self.parsed.rules.add_exclusion(rule);
    }

    fn finish(self) -> ParsedRules {
        self.parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::{self, Read};

    #[rstest]
    fn skips_comments_and_blank_lines() {
        let parsed = RuleSet::parse("# comment\n\n   \n  # indented comment\n");
        assert_eq!(parsed, ParsedRules::default());
    }

    #[rstest]
    fn fifth_field_keeps_embedded_commas() {
        let parsed = RuleSet::parse("line,note,,note,a,b,c");
        let rules = parsed.rules.rules_for(GeometryClass::Line);
        assert_eq!(rules.len(), 1);
        let rule = rules.first().expect("one rule");
        assert_eq!(rule.target_value(), Some("a,b,c"));
        assert_eq!(rule.source_value(), None);
    }

    #[rstest]
    fn dash_target_value_copies_source() {
        let parsed = RuleSet::parse("point,name,,name,-");
        let rule = parsed
            .rules
            .rules_for(GeometryClass::Point)
            .first()
            .cloned()
            .expect("one rule");
        assert_eq!(rule.target_value(), None);
    }

    #[rstest]
    #[case("inner,a,,b,-", GeometryClass::InnerRing)]
    #[case("outer,a,,b,-", GeometryClass::OuterRing)]
    #[case("line,a,,b,-", GeometryClass::Line)]
    #[case("point,a,,b,-", GeometryClass::Point)]
    fn routes_rules_by_class(#[case] line: &str, #[case] class: GeometryClass) {
        let parsed = RuleSet::parse(line);
        assert_eq!(parsed.rules.rules_for(class).len(), 1);
        assert!(parsed.warnings.is_empty());
    }

    #[rstest]
    fn unknown_class_is_a_warning() {
        let parsed = RuleSet::parse("area,a,,b,-\npoint,a,,b,-");
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::UnknownGeometryClass {
                line: 1,
                token: "area".into()
            }]
        );
        assert_eq!(parsed.rules.rules_for(GeometryClass::Point).len(), 1);
    }

    #[rstest]
    fn exclusion_rules_are_recognised() {
        let parsed = RuleSet::parse("way,exclude,highway,track");
        assert_eq!(parsed.rules.exclusions().len(), 1);
    }

    #[rstest]
    fn other_four_field_actions_are_ignored() {
        let parsed = RuleSet::parse("way,include,highway,track");
        assert!(parsed.rules.exclusions().is_empty());
        assert!(parsed.warnings.is_empty());
    }

    #[rstest]
    fn unknown_kind_in_four_fields_is_a_warning() {
        let parsed = RuleSet::parse("point,NAME,name,-");
        assert!(matches!(
            parsed.warnings.as_slice(),
            [ParseWarning::UnknownPrimitiveKind { line: 1, .. }]
        ));
    }

    #[rstest]
    #[case("point")]
    #[case("point,NAME")]
    #[case("point,NAME,name")]
    fn short_lines_are_warnings(#[case] line: &str) {
        let parsed = RuleSet::parse(line);
        assert!(matches!(
            parsed.warnings.as_slice(),
            [ParseWarning::FieldCount { line: 1, .. }]
        ));
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[rstest]
    fn reader_failures_are_errors() {
        let err = RuleSet::read_from(io::BufReader::new(FailingReader))
            .expect_err("reader failure should propagate");
        assert!(matches!(err, RuleFileError::Read { line: 1, .. }));
    }

    #[rstest]
    fn reader_and_text_agree() {
        let text = "point,shop,bakery,shop,bakery\nway,exclude,highway,track\n";
        let from_reader = RuleSet::read_from(text.as_bytes()).expect("in-memory read");
        assert_eq!(from_reader, RuleSet::parse(text));
    }
}
