pub mod config;
pub mod credential_store;
pub mod types;

pub use config::Args;
pub use credential_store::CredentialStore;
pub use types::Credentials;
