pub mod configuration;
pub mod controller_api;
pub mod enrollment;
pub mod error_handling;
pub mod external_client;
pub mod operator;
pub mod platform;
pub mod provisioning;
pub mod session_generation;
