use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::store::LocalFileStore;

/// Runtime settings
///
/// Resolved from an optional TOML file, then `AUTOMUTATE_*` environment
/// variables; command-line flags are layered on top by the binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory file names are resolved against (None = working directory)
    pub root: Option<PathBuf>,
    /// Files of one wave processed at once (None = all of them)
    pub max_concurrent_files: Option<usize>,
    /// Write through a temp file and rename
    pub atomic_writes: bool,
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: None,
            max_concurrent_files: None,
            atomic_writes: true,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    /// Load settings from `path` (if any) and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Override fields from environment variables, looked up through `var`
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(root) = var("AUTOMUTATE_ROOT") {
            self.root = Some(PathBuf::from(root));
        }
        if let Some(limit) = var("AUTOMUTATE_MAX_CONCURRENT_FILES") {
            let limit = limit.parse().map_err(|_| {
                Error::Config(format!("AUTOMUTATE_MAX_CONCURRENT_FILES is not a number: {limit}"))
            })?;
            self.max_concurrent_files = Some(limit);
        }
        if let Some(atomic) = var("AUTOMUTATE_ATOMIC_WRITES") {
            self.atomic_writes = match atomic.as_str() {
                "1" | "true" => true,
                "0" | "false" => false,
                other => {
                    return Err(Error::Config(format!(
                        "AUTOMUTATE_ATOMIC_WRITES must be true or false, got {other}"
                    )));
                }
            };
        }
        if let Some(filter) = var("AUTOMUTATE_LOG") {
            self.log_filter = filter;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_files == Some(0) {
            return Err(Error::Config(
                "max_concurrent_files must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Local file store configured from these settings
    pub fn store(&self) -> LocalFileStore {
        let store = LocalFileStore::new().with_atomic_writes(self.atomic_writes);
        match &self.root {
            Some(root) => store.with_root(root),
            None => store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert!(settings.atomic_writes);
        assert_eq!(settings.max_concurrent_files, None);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn test_from_toml() {
        let settings = Settings::from_toml(
            r#"
            root = "/srv/project"
            max_concurrent_files = 4
            atomic_writes = false
            "#,
        )
        .unwrap();

        assert_eq!(settings.root, Some(PathBuf::from("/srv/project")));
        assert_eq!(settings.max_concurrent_files, Some(4));
        assert!(!settings.atomic_writes);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn test_from_toml_unknown_key() {
        assert!(matches!(
            Settings::from_toml("mutator_directories = []"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::from_toml("max_concurrent_files = 4").unwrap();
        settings
            .apply_env(env(&[
                ("AUTOMUTATE_MAX_CONCURRENT_FILES", "2"),
                ("AUTOMUTATE_ATOMIC_WRITES", "false"),
                ("AUTOMUTATE_LOG", "debug"),
            ]))
            .unwrap();

        assert_eq!(settings.max_concurrent_files, Some(2));
        assert!(!settings.atomic_writes);
        assert_eq!(settings.log_filter, "debug");
    }

    #[test]
    fn test_env_invalid_number() {
        let mut settings = Settings::default();
        let result = settings.apply_env(env(&[("AUTOMUTATE_MAX_CONCURRENT_FILES", "lots")]));

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let settings = Settings {
            max_concurrent_files: Some(0),
            ..Settings::default()
        };

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("automutate.toml");
        std::fs::write(&path, "log_filter = \"warn\"").unwrap();

        let settings = Settings::from_file(&path).unwrap();

        assert_eq!(settings.log_filter, "warn");
    }
}
