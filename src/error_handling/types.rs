use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    NotFound(PathBuf),
    EmptyField(&'static str),
    Template(TemplateError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::NotFound(p) => write!(f, "Configuration file not found: {}", p.display()),
            ConfigError::EmptyField(k) => write!(f, "Configuration field '{}' is empty", k),
            ConfigError::Template(e) => write!(f, "Unable to render configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failure categories reported by the HTTP layer.
///
/// Produced from structured error information (resolver results, connect
/// errors, timeouts), never from the text of an error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    ConnectTimeout,
    UnresolvedHost(String),
    Unreachable(String),
    Other(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::ConnectTimeout => write!(f, "Connection timed out"),
            TransportError::UnresolvedHost(h) => write!(f, "Could not resolve host: {}", h),
            TransportError::Unreachable(e) => write!(f, "Host unreachable: {}", e),
            TransportError::Other(e) => write!(f, "Transport error: {}", e),
        }
    }
}

impl std::error::Error for TransportError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    ConnectTimeout,
    UnresolvedHost(String),
    Unreachable(String),
    Unauthorized { status: u16 },
    HttpStatus(u16),
    Transport(String),
    MalformedResponse(String),
}

impl AuthError {
    /// Whether re-entering credentials could plausibly fix this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AuthError::MalformedResponse(_))
    }

    /// Maps a non-success HTTP status to an authentication error.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => AuthError::Unauthorized { status },
            other => AuthError::HttpStatus(other),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::ConnectTimeout => write!(f, "Could not contact controller: timeout"),
            AuthError::UnresolvedHost(h) => write!(f, "Bad hostname or address: {}", h),
            AuthError::Unreachable(e) => write!(f, "Controller unreachable: {}", e),
            AuthError::Unauthorized { status } => {
                write!(f, "Authentication failed (HTTP {})", status)
            }
            AuthError::HttpStatus(s) => write!(f, "Controller returned HTTP {}", s),
            AuthError::Transport(e) => write!(f, "Transport error: {}", e),
            AuthError::MalformedResponse(e) => write!(f, "Malformed controller response: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<TransportError> for AuthError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::ConnectTimeout => AuthError::ConnectTimeout,
            TransportError::UnresolvedHost(h) => AuthError::UnresolvedHost(h),
            TransportError::Unreachable(e) => AuthError::Unreachable(e),
            TransportError::Other(e) => AuthError::Transport(e),
        }
    }
}

#[derive(Debug)]
pub enum CatalogError {
    Auth(AuthError),
    LabNotFound(String),
    MalformedResponse(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Auth(e) => write!(f, "Lab catalog request failed: {}", e),
            CatalogError::LabNotFound(id) => write!(f, "Lab {} not found on controller", id),
            CatalogError::MalformedResponse(e) => write!(f, "Malformed lab catalog: {}", e),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<AuthError> for CatalogError {
    fn from(err: AuthError) -> Self {
        CatalogError::Auth(err)
    }
}

impl From<TransportError> for CatalogError {
    fn from(err: TransportError) -> Self {
        CatalogError::Auth(err.into())
    }
}

#[derive(Debug)]
pub enum TemplateError {
    ReadFailed(PathBuf, std::io::Error),
    WriteFailed(PathBuf, std::io::Error),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::ReadFailed(p, e) => {
                write!(f, "Unable to read template {}: {}", p.display(), e)
            }
            TemplateError::WriteFailed(p, e) => write!(f, "Unable to write {}: {}", p.display(), e),
        }
    }
}

impl std::error::Error for TemplateError {}

#[derive(Debug)]
pub enum GeneratorError {
    DirectoryCreation(PathBuf, std::io::Error),
    Template(TemplateError),
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::DirectoryCreation(p, e) => {
                write!(f, "Directory {} can not be created: {}", p.display(), e)
            }
            GeneratorError::Template(e) => write!(f, "Session file generation failed: {}", e),
        }
    }
}

impl std::error::Error for GeneratorError {}

impl From<TemplateError> for GeneratorError {
    fn from(err: TemplateError) -> Self {
        GeneratorError::Template(err)
    }
}

#[derive(Debug)]
pub enum ProcessError {
    NotFound(PathBuf),
    NonZeroExit(Option<i32>),
    TimedOut(Duration),
    IoError(std::io::Error),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::NotFound(p) => {
                write!(f, "Process failed because the executable could not be found: {}", p.display())
            }
            ProcessError::NonZeroExit(Some(code)) => {
                write!(f, "Process did not return a successful return code. Returned {}", code)
            }
            ProcessError::NonZeroExit(None) => write!(f, "Process was terminated by a signal"),
            ProcessError::TimedOut(limit) => write!(f, "Process timed out after {:?}", limit),
            ProcessError::IoError(e) => write!(f, "Process IO error: {}", e),
        }
    }
}

impl std::error::Error for ProcessError {}

impl From<std::io::Error> for ProcessError {
    fn from(err: std::io::Error) -> Self {
        ProcessError::IoError(err)
    }
}

#[derive(Debug)]
pub enum PlatformError {
    ClientNotFound(Vec<PathBuf>),
    ConfigDirUnknown,
    SessionsDirNotFound(PathBuf),
    Unsupported(&'static str),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::ClientNotFound(candidates) => {
                let list: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
                write!(f, "SecureCRT was not found (looked in: {})", list.join(", "))
            }
            PlatformError::ConfigDirUnknown => {
                write!(f, "SecureCRT configuration path was not found")
            }
            PlatformError::SessionsDirNotFound(p) => {
                write!(f, "SecureCRT sessions directory does not exist: {}", p.display())
            }
            PlatformError::Unsupported(os) => write!(f, "Unsupported platform: {}", os),
        }
    }
}

impl std::error::Error for PlatformError {}

#[derive(Debug)]
pub enum PromptError {
    IoError(std::io::Error),
    Interrupted,
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::IoError(e) => write!(f, "Prompt IO error: {}", e),
            PromptError::Interrupted => write!(f, "Prompt interrupted"),
        }
    }
}

impl std::error::Error for PromptError {}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<dialoguer::Error> for PromptError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                PromptError::Interrupted
            }
            dialoguer::Error::IO(e) => PromptError::IoError(e),
        }
    }
}

#[derive(Debug)]
pub enum EnrollmentError {
    Auth(AuthError),
    Config(ConfigError),
    Template(TemplateError),
    Generator(GeneratorError),
    Process(ProcessError),
    Prompt(PromptError),
    BootstrapSessionMissing(PathBuf),
}

impl fmt::Display for EnrollmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrollmentError::Auth(e) => write!(f, "Account validation failed: {}", e),
            EnrollmentError::Config(e) => write!(f, "Configuration error: {}", e),
            EnrollmentError::Template(e) => write!(f, "Template error: {}", e),
            EnrollmentError::Generator(e) => write!(f, "{}", e),
            EnrollmentError::Process(e) => write!(f, "SecureCRT launch failed: {}", e),
            EnrollmentError::Prompt(e) => write!(f, "{}", e),
            EnrollmentError::BootstrapSessionMissing(p) => write!(f, "{} does not exist", p.display()),
        }
    }
}

impl std::error::Error for EnrollmentError {}

impl From<AuthError> for EnrollmentError {
    fn from(err: AuthError) -> Self {
        EnrollmentError::Auth(err)
    }
}

impl From<ConfigError> for EnrollmentError {
    fn from(err: ConfigError) -> Self {
        EnrollmentError::Config(err)
    }
}

impl From<TemplateError> for EnrollmentError {
    fn from(err: TemplateError) -> Self {
        EnrollmentError::Template(err)
    }
}

impl From<GeneratorError> for EnrollmentError {
    fn from(err: GeneratorError) -> Self {
        EnrollmentError::Generator(err)
    }
}

impl From<ProcessError> for EnrollmentError {
    fn from(err: ProcessError) -> Self {
        EnrollmentError::Process(err)
    }
}

impl From<PromptError> for EnrollmentError {
    fn from(err: PromptError) -> Self {
        EnrollmentError::Prompt(err)
    }
}

#[derive(Debug)]
pub enum ProvisionError {
    Platform(PlatformError),
    MissingSeedFile(PathBuf),
    Config(ConfigError),
    Enrollment(EnrollmentError),
    Catalog(CatalogError),
    Generator(GeneratorError),
    Prompt(PromptError),
}

impl ProvisionError {
    /// Every provisioning error reaching the top level ends the process.
    /// Prompt interruptions are the operator leaving, not a fault.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ProvisionError::Prompt(PromptError::Interrupted))
    }
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionError::Platform(e) => write!(f, "{}", e),
            ProvisionError::MissingSeedFile(p) => write!(f, "{} was not found", p.display()),
            ProvisionError::Config(e) => write!(f, "Configuration error: {}", e),
            ProvisionError::Enrollment(e) => write!(f, "Setup failed: {}", e),
            ProvisionError::Catalog(e) => write!(f, "{}", e),
            ProvisionError::Generator(e) => write!(f, "{}", e),
            ProvisionError::Prompt(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ProvisionError {}

impl From<PlatformError> for ProvisionError {
    fn from(err: PlatformError) -> Self {
        ProvisionError::Platform(err)
    }
}

impl From<ConfigError> for ProvisionError {
    fn from(err: ConfigError) -> Self {
        ProvisionError::Config(err)
    }
}

impl From<EnrollmentError> for ProvisionError {
    fn from(err: EnrollmentError) -> Self {
        ProvisionError::Enrollment(err)
    }
}

impl From<CatalogError> for ProvisionError {
    fn from(err: CatalogError) -> Self {
        ProvisionError::Catalog(err)
    }
}

impl From<GeneratorError> for ProvisionError {
    fn from(err: GeneratorError) -> Self {
        ProvisionError::Generator(err)
    }
}

impl From<PromptError> for ProvisionError {
    fn from(err: PromptError) -> Self {
        ProvisionError::Prompt(err)
    }
}
