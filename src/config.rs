//! Export settings: an optional JSON file, overridden by CLI flags.
//!
//! ```json
//! { "exportName": "orders", "contextPath": "/api", "baseUrl": "{{host}}",
//!   "opaquePrefixes": ["java.", "javax.", "org.springframework."] }
//! ```
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mock::DEFAULT_OPAQUE_PREFIXES;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Settings {
    /// Collection name when no controller carries a `@menu` tag.
    pub export_name: String,
    /// Prefixed to every request path.
    pub context_path: String,
    /// Host part of every request URL.
    pub base_url: String,
    pub opaque_prefixes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_name: "postman-mock".to_string(),
            context_path: String::new(),
            base_url: "{{baseUrl}}".to_string(),
            opaque_prefixes: DEFAULT_OPAQUE_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid settings in {path} at `{at}`: {message}")]
    Invalid { path: PathBuf, at: String, message: String },
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        from_str_with_path(&src).map_err(|(at, message)| ConfigError::Invalid { path: path.to_path_buf(), at, message })
    }

    /// The file at `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

/// Deserialize, reporting the JSON path of the first offending value.
fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, (String, String)> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let at = err.path().to_string();
        (at, err.into_inner().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(src: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(src.as_bytes()).unwrap();
        file
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = write(r#"{ "contextPath": "/api", "opaquePrefixes": ["java.", "org.springframework."] }"#);
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.context_path, "/api");
        assert_eq!(settings.opaque_prefixes, ["java.", "org.springframework."]);
        assert_eq!(settings.export_name, Settings::default().export_name);
    }

    #[test]
    fn errors_carry_json_path() {
        let file = write(r#"{ "opaquePrefixes": ["java.", 3] }"#);
        match Settings::load(file.path()).unwrap_err() {
            ConfigError::Invalid { at, .. } => assert_eq!(at, "opaquePrefixes[1]"),
            other => panic!("unexpected error: {other}"),
        }
        let file = write(r#"{ "exportNam": "x" }"#);
        assert!(matches!(Settings::load(file.path()), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert_eq!(Settings::load_or_default(None).unwrap(), Settings::default());
    }
}
