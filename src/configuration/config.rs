use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line options.
///
/// Every option is optional: with no flags the tool runs fully
/// interactively, reading its seed files from the current directory and
/// discovering SecureCRT through the platform defaults.
///
/// # Examples
///
/// ```
/// use cml_crt_sessions::configuration::config::Args;
///
/// let args = Args::from_iter_for(["cml-crt-sessions", "--seed-dir", "/opt/seeds"]).unwrap();
/// assert_eq!(args.config_path(), std::path::PathBuf::from("/opt/seeds/config.toml"));
/// ```
#[derive(Parser, Debug, Clone)]
#[command(name = "cml-crt-sessions")]
#[command(version)]
#[command(about = "Generate SecureCRT console sessions for CML lab nodes")]
pub struct Args {
    /// Directory holding the `initial_config` and `cml_console_server` seed files
    #[arg(long, default_value = ".")]
    pub seed_dir: PathBuf,

    /// Credential store location
    ///
    /// Defaults to `config.toml` inside the seed directory
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// SecureCRT Sessions directory, overriding platform discovery
    #[arg(long)]
    pub sessions_dir: Option<PathBuf>,

    /// SecureCRT executable, overriding platform discovery
    #[arg(long)]
    pub client: Option<PathBuf>,

    /// Seconds to wait for SecureCRT during setup; 0 waits until it exits
    #[arg(long, default_value_t = 10)]
    pub client_timeout_secs: u64,

    /// Overall timeout for lab listing requests
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Enable debug logging
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub verbose: bool,
}

/// Name of the credential store created inside the seed directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

impl Args {
    /// Parses the process arguments, exiting with usage on error.
    pub fn from_args() -> Self {
        Args::parse()
    }

    pub fn from_iter_for<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Args::try_parse_from(iter)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.seed_dir.join(CONFIG_FILE_NAME))
    }

    /// `None` means wait for the client indefinitely.
    pub fn client_timeout(&self) -> Option<Duration> {
        match self.client_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
