use log::{debug, info};
use std::path::PathBuf;
use std::time::Duration;

use crate::configuration::config::Args;
use crate::configuration::{CredentialStore, Credentials};
use crate::error_handling::types::ProvisionError;
use crate::platform::{self, PlatformAdapter};

/// Seed of the credential store.
pub const INITIAL_CONFIG_SEED: &str = "initial_config";
/// Seed of the bootstrap console-server session.
pub const CONSOLE_SERVER_SEED: &str = "cml_console_server";
/// SecureCRT session name of the bootstrap session.
pub const BOOTSTRAP_SESSION_NAME: &str = "cml_console_server";
/// Node template kept in the controller directory.
pub const NODE_TEMPLATE_NAME: &str = "node_session_template";
/// Console-server command the bootstrap session runs after login.
pub const DISCONNECT_COMMAND: &str = "quit";

/// Everything a run needs to know about its environment, resolved once at
/// startup and passed by reference through every step.
#[derive(Debug, Clone)]
pub struct ProvisioningContext {
    pub client_executable: PathBuf,
    pub bootstrap_launch_args: Vec<String>,
    pub sessions_dir: PathBuf,
    pub seed_dir: PathBuf,
    pub config_path: PathBuf,
    pub client_timeout: Option<Duration>,
    pub request_timeout: Duration,
}

impl ProvisioningContext {
    /// Locates SecureCRT and its Sessions directory, then checks that both
    /// seed files are present. Any failure here is fatal.
    pub fn resolve(args: &Args, adapter: &dyn PlatformAdapter) -> Result<Self, ProvisionError> {
        info!("Resolving environment for platform {}", adapter.name());
        let client_executable = platform::resolve_client(adapter, args.client.as_deref())?;
        let sessions_dir = platform::resolve_sessions_dir(adapter, args.sessions_dir.as_deref())?;
        info!("SecureCRT: {}", client_executable.display());
        info!("Sessions directory: {}", sessions_dir.display());

        let ctx = Self {
            client_executable,
            bootstrap_launch_args: adapter.launch_args(BOOTSTRAP_SESSION_NAME),
            sessions_dir,
            seed_dir: args.seed_dir.clone(),
            config_path: args.config_path(),
            client_timeout: args.client_timeout(),
            request_timeout: args.request_timeout(),
        };
        ctx.check_seed_files()?;
        Ok(ctx)
    }

    pub fn check_seed_files(&self) -> Result<(), ProvisionError> {
        for seed in [self.initial_config_seed(), self.console_server_seed()] {
            if !seed.is_file() {
                return Err(ProvisionError::MissingSeedFile(seed));
            }
            debug!("Found seed file {}", seed.display());
        }
        Ok(())
    }

    pub fn initial_config_seed(&self) -> PathBuf {
        self.seed_dir.join(INITIAL_CONFIG_SEED)
    }

    pub fn console_server_seed(&self) -> PathBuf {
        self.seed_dir.join(CONSOLE_SERVER_SEED)
    }

    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(&self.config_path)
    }

    /// Transient bootstrap session, removed once the node template exists.
    pub fn bootstrap_session_path(&self) -> PathBuf {
        self.sessions_dir.join(format!("{}.ini", BOOTSTRAP_SESSION_NAME))
    }

    /// `<Sessions>/<controller> Labs`
    pub fn controller_dir(&self, credentials: &Credentials) -> PathBuf {
        self.sessions_dir.join(credentials.controller_dir_name())
    }

    pub fn node_template_path(&self, credentials: &Credentials) -> PathBuf {
        self.controller_dir(credentials).join(NODE_TEMPLATE_NAME)
    }
}
