//! Data exchanged with the CML controller.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Map;
use std::fmt;

/// Bearer-token session against one controller.
///
/// Lives for a single run; it is never written to disk.
#[derive(Clone)]
pub struct AuthSession {
    /// `https://<controller>/api/v0`
    pub api_base: String,
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

// Keeps the token out of logs.
impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// One lab as listed to the operator. `index` is 1-based and only stable
/// within a single listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabSummary {
    pub index: usize,
    pub title: String,
    pub state: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabNode {
    pub label: String,
    pub node_definition: String,
}

impl LabNode {
    pub fn new(label: &str, node_definition: &str) -> Self {
        Self {
            label: label.to_string(),
            node_definition: node_definition.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabTopology {
    pub title: String,
    pub nodes: Vec<LabNode>,
}

/// Body of `GET /populate_lab_tiles`. Tile order is the controller's.
#[derive(Debug, Deserialize)]
pub(crate) struct LabTilesResponse {
    pub lab_tiles: Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LabTile {
    pub lab_title: String,
    #[serde(default)]
    pub state: String,
    pub id: String,
    #[serde(default)]
    pub topology: TileTopology,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TileTopology {
    #[serde(default)]
    pub nodes: Vec<LabNode>,
}

impl LabTile {
    pub fn into_topology(self) -> LabTopology {
        LabTopology {
            title: self.lab_title,
            nodes: self.topology.nodes,
        }
    }
}
