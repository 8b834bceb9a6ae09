//! # Storage Driver Configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{StorageError, StorageResult};

/// Immutable configuration captured when a store is constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Root directory all keys resolve under (required)
    #[serde(alias = "Directory")]
    pub root_directory: String,

    /// Prefix used to build externally reachable links
    #[serde(default, alias = "PublicUrl")]
    pub public_url_prefix: String,

    /// Prefix written keys with `YYYY/MM/DD/`
    #[serde(default, alias = "DateFolderStructure")]
    pub date_folder_sharding: bool,

    /// Create missing parent directories while resolving keys
    #[serde(default, alias = "Create")]
    pub create_missing_directories: bool,
}

impl StorageConfig {
    /// Config with the given root and every option at its default
    pub fn new(root_directory: impl Into<String>) -> Self {
        Self {
            root_directory: root_directory.into(),
            public_url_prefix: String::new(),
            date_folder_sharding: false,
            create_missing_directories: false,
        }
    }

    pub fn with_public_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_url_prefix = prefix.into();
        self
    }

    pub fn with_date_folder_sharding(mut self, enabled: bool) -> Self {
        self.date_folder_sharding = enabled;
        self
    }

    pub fn with_create_missing_directories(mut self, enabled: bool) -> Self {
        self.create_missing_directories = enabled;
        self
    }

    /// Build a config from a JSON value. Anything but an object is rejected.
    pub fn from_value(value: Value) -> StorageResult<Self> {
        if !value.is_object() {
            return Err(StorageError::InvalidConfig(
                "storage config must be a JSON object".into(),
            ));
        }

        let config: StorageConfig = serde_json::from_value(value)
            .map_err(|e| StorageError::InvalidConfig(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> StorageResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StorageError::InvalidConfig(format!("failed to read {}: {}", path.display(), e))
        })?;

        let value: Value = serde_json::from_str(&content)
            .map_err(|e| StorageError::InvalidConfig(format!("invalid config JSON: {}", e)))?;

        Self::from_value(value)
    }

    /// Validate field values
    pub fn validate(&self) -> StorageResult<()> {
        if self.root_directory.trim().is_empty() {
            return Err(StorageError::InvalidConfig(
                "root_directory cannot be empty".into(),
            ));
        }

        if self.root_directory.contains('\0') {
            return Err(StorageError::InvalidConfig(
                "root_directory contains a NUL byte".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = StorageConfig::from_value(json!({ "root_directory": "/srv/files" })).unwrap();
        assert_eq!(config, StorageConfig::new("/srv/files"));
        assert!(!config.date_folder_sharding);
        assert!(!config.create_missing_directories);
        assert_eq!(config.public_url_prefix, "");
    }

    #[test]
    fn test_legacy_option_names() {
        let config = StorageConfig::from_value(json!({
            "Directory": "/srv/files",
            "PublicUrl": "https://cdn.example.com",
            "DateFolderStructure": true,
            "Create": true
        }))
        .unwrap();

        assert_eq!(config.root_directory, "/srv/files");
        assert_eq!(config.public_url_prefix, "https://cdn.example.com");
        assert!(config.date_folder_sharding);
        assert!(config.create_missing_directories);
    }

    #[test]
    fn test_rejects_non_object() {
        for value in [json!("/srv/files"), json!(["/srv/files"]), json!(null), json!(7)] {
            let err = StorageConfig::from_value(value).unwrap_err();
            assert!(matches!(err, StorageError::InvalidConfig(_)));
        }
    }

    #[test]
    fn test_rejects_missing_or_empty_root() {
        assert!(matches!(
            StorageConfig::from_value(json!({})),
            Err(StorageError::InvalidConfig(_))
        ));
        assert!(matches!(
            StorageConfig::from_value(json!({ "root_directory": "  " })),
            Err(StorageError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_and_mistyped_fields() {
        assert!(StorageConfig::from_value(json!({ "root_directory": "/a", "bogus": 1 })).is_err());
        assert!(StorageConfig::from_value(json!({
            "root_directory": "/a",
            "date_folder_sharding": "yes"
        }))
        .is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("depot.json");
        fs::write(&path, r#"{"root_directory": "/data", "public_url_prefix": "http://x"}"#).unwrap();

        let config = StorageConfig::load(&path).unwrap();
        assert_eq!(config.public_url_prefix, "http://x");

        assert!(StorageConfig::load(&temp.path().join("missing.json")).is_err());
    }
}
