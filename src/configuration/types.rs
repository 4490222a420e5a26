use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error_handling::types::ConfigError;

/// Controller account, as stored in the credential store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub controller: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str, controller: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            controller: controller.to_string(),
        }
    }

    /// All three fields must be non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::EmptyField("username"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::EmptyField("password"));
        }
        if self.controller.trim().is_empty() {
            return Err(ConfigError::EmptyField("controller"));
        }
        Ok(())
    }

    /// Name of the per-controller directory under the SecureCRT Sessions folder.
    pub fn controller_dir_name(&self) -> String {
        format!("{} Labs", self.controller)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("controller", &self.controller)
            .finish()
    }
}
