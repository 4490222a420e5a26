//! The on-disk credential store (`config.toml`).
//!
//! The store is produced from the `initial_config` seed by placeholder
//! substitution. Values go in as TOML string literals, so whatever the
//! operator typed reads back unchanged.

use log::{debug, error, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::configuration::types::Credentials;
use crate::error_handling::types::ConfigError;
use crate::session_generation::template_renderer::{self, SEED_CONTROLLER, SEED_PASSWORD, USER};

pub struct CredentialStore {
    path: PathBuf,
}

/// Quotes `value` as a TOML basic string.
fn toml_literal(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

impl CredentialStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Writes `credentials` into the store, rendering it from `seed`.
    pub fn persist(&self, seed: &Path, credentials: &Credentials) -> Result<(), ConfigError> {
        credentials.validate()?;
        let substitutions = [
            (USER, toml_literal(&credentials.username)),
            (SEED_PASSWORD, toml_literal(&credentials.password)),
            (SEED_CONTROLLER, toml_literal(&credentials.controller)),
        ];
        template_renderer::render(seed, &self.path, &substitutions).map_err(|e| {
            error!("Unable to create {}: {}", self.path.display(), e);
            ConfigError::Template(e)
        })?;
        info!("Created credential store {}", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<Credentials, ConfigError> {
        if !self.exists() {
            return Err(ConfigError::NotFound(self.path.clone()));
        }
        let content = fs::read_to_string(&self.path)?;
        let credentials: Credentials =
            toml::from_str(&content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        credentials.validate()?;
        debug!(
            "Loaded credentials for {} on {}",
            credentials.username, credentials.controller
        );
        Ok(credentials)
    }

    /// Removes the store. Missing stores are not an error.
    pub fn delete(&self) -> Result<(), ConfigError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Deleted credential store {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
