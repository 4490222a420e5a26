//! CML controller REST client
//!
//! - `transport`: the HTTP abstraction and its `reqwest` implementation.
//! - `auth_client`: the login handshake.
//! - `lab_catalog`: lab listing and topology lookup.
//! - `types`: sessions, labs, and nodes.

pub mod auth_client;
pub mod lab_catalog;
pub mod transport;
pub mod types;

pub use auth_client::{api_base, authenticate};
pub use lab_catalog::LabCatalog;
pub use transport::{ApiRequest, ApiResponse, ControllerTransport, HttpsTransport};
pub use types::{AuthSession, LabNode, LabSummary, LabTopology};
