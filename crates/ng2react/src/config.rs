//! Configuration loading.
//!
//! `ng2react.json` adds or replaces pipe and injection handlers:
//!
//! ```json
//! {
//!   // `$inner` is the piped value, `$args` the pipe arguments
//!   "pipes": {
//!     "date": { "transform": "formatDate($inner, $args)", "imports": [{ "names": ["formatDate"], "file": "dates.ts" }] }
//!   },
//!   // `$name` is the parameter, `$type` its declared type
//!   "injections": {
//!     "HttpClient": { "transform": "const $name = useHttp();" }
//!   }
//! }
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use ng2react_transformer::{Import, InjectionHandler, PipeHandler, PolicyRegistry};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use thiserror::Error;

/// The config file name looked up next to the source root.
pub const CONFIG_FILE: &str = "ng2react.json";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not valid configuration.
    #[error("invalid configuration in {path}: {source}")]
    Invalid {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Contents of `ng2react.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PolicyConfig {
    /// Pipe handlers keyed by pipe name.
    #[serde(default)]
    pub pipes: BTreeMap<String, HandlerConfig>,

    /// Injection handlers keyed by the injected type.
    #[serde(default)]
    pub injections: BTreeMap<String, HandlerConfig>,
}

/// One pipe or injection handler.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HandlerConfig {
    /// Replacement template. Without one the default rendering is kept.
    pub transform: Option<String>,

    /// Imports added to every file that uses the handler.
    #[serde(default)]
    pub imports: Vec<ImportConfig>,
}

/// An import, with `file` relative to the source root.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    pub names: Vec<String>,
    pub file: String,
}

impl From<&ImportConfig> for Import {
    fn from(config: &ImportConfig) -> Self {
        Import {
            names: config.names.clone(),
            file: config.file.clone(),
        }
    }
}

impl PolicyConfig {
    /// Loads configuration from an `ng2react.json` file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        // Comments are allowed, as in tsconfig.json
        let content = remove_json_comments(&content);

        serde_json::from_str(&content).map_err(|source| ConfigError::Invalid {
            path: path.to_owned(),
            source,
        })
    }

    /// Finds `ng2react.json` in the source root or its parent directory.
    pub fn find(src_root: &Utf8Path) -> Option<Utf8PathBuf> {
        std::iter::once(src_root)
            .chain(src_root.parent())
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|path| path.is_file())
    }

    /// Builds the policy: the built-in handlers, then every configured entry
    /// on top.
    pub fn into_registry(self) -> PolicyRegistry {
        let mut registry = PolicyRegistry::with_builtins();
        for (name, handler) in &self.pipes {
            registry.insert_pipe(
                name.as_str(),
                PipeHandler {
                    transform: handler.transform.clone(),
                    imports: handler.imports.iter().map(Import::from).collect(),
                },
            );
        }
        for (ty, handler) in &self.injections {
            registry.insert_injection(
                ty.as_str(),
                InjectionHandler {
                    transform: handler.transform.clone(),
                    imports: handler.imports.iter().map(Import::from).collect(),
                },
            );
        }
        registry
    }
}

/// Removes single-line and multi-line comments from JSON.
fn remove_json_comments(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            if c == '"' {
                in_string = false;
            } else if c == '\\' {
                if let Some(next) = chars.next() {
                    result.push(next);
                }
            }
        } else if c == '"' {
            result.push(c);
            in_string = true;
        } else if c == '/' {
            match chars.peek() {
                Some('/') => {
                    chars.next();
                    while let Some(&next) = chars.peek() {
                        if next == '\n' {
                            break;
                        }
                        chars.next();
                    }
                }
                Some('*') => {
                    chars.next();
                    while let Some(next) = chars.next() {
                        if next == '*' && chars.peek() == Some(&'/') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => result.push(c),
            }
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_config(content: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let path = root.join(CONFIG_FILE);
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_remove_comments() {
        let json = r#"{
            // pipes
            "pipes": {} /* none yet */,
            "url": "http://example.com"
        }"#;

        let cleaned = remove_json_comments(json);
        assert!(!cleaned.contains("// pipes"));
        assert!(!cleaned.contains("/*"));
        assert!(cleaned.contains("\"http://example.com\""));
    }

    #[test]
    fn test_load_overrides_builtins() {
        let (_dir, path) = write_config(
            r#"{
                // replace the built-in handler
                "pipes": {
                    "uppercase": { "transform": "($inner).toUpperCase()" },
                    "date": {
                        "transform": "formatDate($inner, $args)",
                        "imports": [{ "names": ["formatDate"], "file": "dates.ts" }]
                    }
                },
                "injections": {
                    "HttpClient": { "transform": "const $name = useHttp();" }
                }
            }"#,
        );

        let registry = PolicyConfig::load(&path).unwrap().into_registry();

        let uppercase = registry.pipe("uppercase").unwrap();
        assert_eq!(uppercase.apply("uppercase", "name", &[]), "(name).toUpperCase()");
        assert!(uppercase.imports.is_empty());

        let date = registry.pipe("date").unwrap();
        assert_eq!(
            date.apply("date", "when", &["'short'".to_string()]),
            "formatDate(when, 'short')"
        );
        assert_eq!(date.imports, vec![Import::new(&["formatDate"], "dates.ts")]);

        assert_eq!(
            registry.injection("HttpClient").unwrap().apply("http", "HttpClient"),
            "const http = useHttp();"
        );
        // untouched built-ins survive
        assert!(registry.pipe("keyvalue").is_some());
        assert!(registry.injection("ElementRef").is_some());
    }

    #[test]
    fn test_handler_without_transform_keeps_default_rendering() {
        let (_dir, path) = write_config(
            r#"{ "pipes": { "currency": { "imports": [{ "names": ["currency"], "file": "pipes.ts" }] } } }"#,
        );
        let registry = PolicyConfig::load(&path).unwrap().into_registry();
        let currency = registry.pipe("currency").unwrap();
        assert_eq!(currency.apply("currency", "price", &[]), "currency(price)");
        assert_eq!(currency.imports.len(), 1);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let (_dir, path) = write_config(r#"{ "pipe": {} }"#);
        let err = PolicyConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_missing_file() {
        let err = PolicyConfig::load(Utf8Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_find_in_parent() {
        let (dir, path) = write_config("{}");
        let src = Utf8PathBuf::from_path_buf(dir.path().join("src")).unwrap();
        fs::create_dir(&src).unwrap();
        assert_eq!(PolicyConfig::find(&src), Some(path));

        fs::write(src.join(CONFIG_FILE), "{}").unwrap();
        assert_eq!(PolicyConfig::find(&src), Some(src.join(CONFIG_FILE)));
    }
}
