use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::KdfParams;
use crate::errors::{Result, VaultError};

/// Project-level configuration, loaded from `.repovault.toml`.
///
/// Every field has a sensible default so repovault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) holding the secret and
    /// activity databases.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_data_dir() -> String {
    ".repovault".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".repovault.toml";

    /// Name of the secret database inside `data_dir`.
    const DATABASE_FILE: &'static str = "secrets.db";

    /// Load settings from `<project_dir>/.repovault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::Configuration(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.kdf_params().validate()?;

        Ok(settings)
    }

    /// Resolve the data directory against the project root.
    pub fn data_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.data_dir)
    }

    /// Build the full path to the secret database.
    ///
    /// Example: `project_dir/.repovault/secrets.db`
    pub fn database_path(&self, project_dir: &Path) -> PathBuf {
        self.data_path(project_dir).join(Self::DATABASE_FILE)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.data_dir, ".repovault");
        assert_eq!(s.argon2_memory_kib, 65_536);
        assert_eq!(s.argon2_iterations, 3);
        assert_eq!(s.argon2_parallelism, 4);
        assert_eq!(s.kdf_params(), KdfParams::default());
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.data_dir, ".repovault");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
data_dir = "secrets"
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
"#;
        fs::write(tmp.path().join(".repovault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.data_dir, "secrets");
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.argon2_iterations, 5);
        assert_eq!(settings.argon2_parallelism, 8);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".repovault.toml"), "argon2_iterations = 2\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.argon2_iterations, 2);
        // Rest should be defaults
        assert_eq!(settings.data_dir, ".repovault");
        assert_eq!(settings.argon2_memory_kib, 65_536);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".repovault.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(VaultError::Configuration(_))));
    }

    #[test]
    fn load_rejects_weak_kdf_settings() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".repovault.toml"), "argon2_memory_kib = 64\n").unwrap();

        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn database_path_builds_correct_path() {
        let s = Settings::default();
        let project = Path::new("/home/user/myproject");
        assert_eq!(
            s.database_path(project),
            PathBuf::from("/home/user/myproject/.repovault/secrets.db")
        );
    }

    #[test]
    fn database_path_respects_custom_data_dir() {
        let s = Settings {
            data_dir: "vault-data".to_string(),
            ..Settings::default()
        };
        let project = Path::new("/srv/app");
        assert_eq!(
            s.database_path(project),
            PathBuf::from("/srv/app/vault-data/secrets.db")
        );
    }
}
