//! Source-located diagnostics for application files

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::schema::FieldError;

/// Syntax error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(hmv::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl YamlSyntaxError {
    /// Create a syntax error from a serde_yml error
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));
        Self::at_location(err.to_string(), source, filename, line, column)
    }

    /// Create a syntax error from a serde_json error
    pub fn from_json_error(err: &serde_json::Error, source: &str, filename: &str) -> Self {
        Self::at_location(
            err.to_string(),
            source,
            filename,
            err.line().max(1),
            err.column().max(1),
        )
    }

    /// Create a syntax error at a specific location
    pub fn at_location(
        message: impl Into<String>,
        source: &str,
        filename: &str,
        line: usize,
        column: usize,
    ) -> Self {
        let message = message.into();
        let offset = line_col_to_offset(source, line, column);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help: generate_help(&message),
            message,
        }
    }
}

/// Rule failures of one application file
#[derive(Debug, Error, Diagnostic)]
#[error("Application is invalid: {summary}")]
#[diagnostic(code(hmv::yaml::invalid_application))]
pub struct RecordDiagnostic {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<FieldViolation>,
}

/// A single field failure pointing at its key
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct FieldViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    message: String,
    hint: String,
}

impl RecordDiagnostic {
    pub fn new(filename: &str, source: &str, errors: &[FieldError]) -> Self {
        let violations: Vec<FieldViolation> = errors
            .iter()
            .map(|e| {
                let (span, hint) = if e.path.is_empty() {
                    (first_line_span(source), "here".to_string())
                } else {
                    (
                        find_key_span(source, &e.path).unwrap_or_else(|| first_line_span(source)),
                        e.path.clone(),
                    )
                };
                FieldViolation {
                    span,
                    message: e.message.clone(),
                    hint,
                }
            })
            .collect();

        let summary = match violations.len() {
            1 => "1 error".to_string(),
            n => format!("{} errors", n),
        };
        Self {
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }
}

/// Convert line/column to byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    let mut current_line = 1;

    for (i, ch) in source.char_indices() {
        if current_line == line {
            let line_start = i;
            let mut col = 1;
            for (j, c) in source[line_start..].char_indices() {
                if col == column {
                    return line_start + j;
                }
                if c == '\n' {
                    break;
                }
                col += 1;
            }
            return line_start + column.saturating_sub(1);
        }
        if ch == '\n' {
            current_line += 1;
        }
        offset = i;
    }

    offset
}

fn first_line_span(content: &str) -> SourceSpan {
    let len = content.find('\n').unwrap_or(content.len()).max(1);
    (0, len).into()
}

/// Find the span of a top-level key, written either as YAML `key:` or JSON `"key":`
pub fn find_key_span(content: &str, key: &str) -> Option<SourceSpan> {
    let yaml_pattern = format!("{}:", key);
    let json_pattern = format!("\"{}\"", key);

    let mut offset = 0;
    for line in content.lines() {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        if trimmed.starts_with(&yaml_pattern) {
            return Some((offset + indent, trimmed.len()).into());
        }
        if let Some(pos) = line.find(&json_pattern) {
            let rest = line[pos + json_pattern.len()..].trim_start();
            if rest.starts_with(':') {
                return Some((offset + pos, line.len() - pos).into());
            }
        }
        offset += line.len() + 1;
    }
    None
}

/// Generate helpful suggestions based on error message
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("tab") {
        return Some(
            "YAML requires spaces for indentation, not tabs. Replace tabs with spaces.".to_string(),
        );
    }

    if msg_lower.contains("duplicate key") || msg_lower.contains("duplicate field") {
        return Some("Each field can only appear once. Remove the duplicate.".to_string());
    }

    if msg_lower.contains("trailing comma") {
        return Some("JSON does not allow a comma after the last entry.".to_string());
    }

    if msg_lower.contains("eof while parsing") {
        return Some("The file ends early. Check for a missing closing brace.".to_string());
    }

    if msg_lower.contains("mapping values are not allowed") {
        return Some("You may be missing a space after ':' or have incorrect indentation.".to_string());
    }

    if msg_lower.contains("found unexpected ':'") {
        return Some("Colons in values need to be quoted: \"value:with:colons\"".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 1), 6);
        assert_eq!(line_col_to_offset(source, 3, 1), 12);
    }

    #[test]
    fn test_find_key_span_yaml_and_json() {
        let yaml = "firstName: John\nemail: nope\n";
        let span = find_key_span(yaml, "email").unwrap();
        assert_eq!(span.offset(), 16);

        let json = "{\n  \"firstName\": \"John\",\n  \"email\": \"nope\"\n}";
        let span = find_key_span(json, "email").unwrap();
        assert_eq!(&json[span.offset()..span.offset() + 7], "\"email\"");

        assert!(find_key_span(yaml, "phoneNumber").is_none());
    }

    #[test]
    fn test_record_diagnostic_counts() {
        let source = "firstName: John\nemail: nope\n";
        let errors = vec![
            FieldError::new(Field::Email, "Please enter a valid email address"),
            FieldError::new(Field::LastName, "Last name is required"),
        ];
        let diag = RecordDiagnostic::new("app.yaml", source, &errors);
        assert_eq!(diag.violation_count(), 2);
        assert_eq!(diag.to_string(), "Application is invalid: 2 errors");
    }

    #[test]
    fn test_help_generation() {
        assert!(generate_help("found tab character").is_some());
        assert!(generate_help("duplicate key").is_some());
        assert!(generate_help("EOF while parsing an object").is_some());
        assert!(generate_help("some random error").is_none());
    }
}
