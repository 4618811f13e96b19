//! Reading application files
//!
//! Applications are stored as JSON (`.json`) or YAML (anything else). Both
//! parse into the same [`serde_json::Value`] the schema validates.

pub mod diagnostics;

use serde_json::Value;
use std::path::Path;

pub use diagnostics::{find_key_span, RecordDiagnostic, YamlSyntaxError};

/// Whether `path` should be read as JSON rather than YAML
pub fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Whether `path` looks like an application file
pub fn is_record_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "json" | "yaml" | "yml"))
}

/// Parse an application file's contents
pub fn parse_record(source: &str, path: &Path) -> Result<Value, YamlSyntaxError> {
    let filename = path.display().to_string();
    if is_json_path(path) {
        serde_json::from_str(source)
            .map_err(|e| YamlSyntaxError::from_json_error(&e, source, &filename))
    } else {
        serde_yml::from_str(source)
            .map_err(|e| YamlSyntaxError::from_serde_error(&e, source, &filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_yaml_and_json() {
        let yaml = parse_record("firstName: John\nhealthDeclaration: true\n", Path::new("a.yaml"))
            .unwrap();
        assert_eq!(yaml["firstName"], "John");
        assert_eq!(yaml["healthDeclaration"], true);

        let json = parse_record(r#"{"firstName": "John"}"#, Path::new("a.json")).unwrap();
        assert_eq!(json["firstName"], "John");
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = parse_record("{\"firstName\": ", Path::new("broken.json")).unwrap_err();
        assert!(err.to_string().contains("EOF"));
    }

    #[test]
    fn test_record_paths() {
        assert!(is_record_path(&PathBuf::from("x.json")));
        assert!(is_record_path(&PathBuf::from("x.YML")));
        assert!(!is_record_path(&PathBuf::from("x.txt")));
        assert!(is_json_path(&PathBuf::from("x.JSON")));
    }
}
