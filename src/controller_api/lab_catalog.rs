use log::{debug, info, warn};

use crate::controller_api::transport::{ApiRequest, ControllerTransport};
use crate::controller_api::types::{AuthSession, LabSummary, LabTile, LabTilesResponse, LabTopology};
use crate::error_handling::types::{AuthError, CatalogError};

/// Read access to the labs visible to an authenticated account.
pub struct LabCatalog<'a, T: ControllerTransport + ?Sized> {
    transport: &'a T,
    session: &'a AuthSession,
}

impl<'a, T: ControllerTransport + ?Sized> LabCatalog<'a, T> {
    pub fn new(transport: &'a T, session: &'a AuthSession) -> Self {
        Self { transport, session }
    }

    async fn fetch_tiles(&self) -> Result<Vec<LabTile>, CatalogError> {
        let url = format!("{}/populate_lab_tiles", self.session.api_base);
        let response = self
            .transport
            .send(ApiRequest::get(url).with_bearer(&self.session.token))
            .await?;

        if !response.is_success() {
            warn!("Lab listing returned HTTP {}", response.status);
            return Err(CatalogError::Auth(AuthError::from_status(response.status)));
        }

        let tiles: LabTilesResponse = serde_json::from_str(&response.body)
            .map_err(|e| CatalogError::MalformedResponse(e.to_string()))?;

        tiles
            .lab_tiles
            .into_iter()
            .map(|(key, value)| {
                serde_json::from_value::<LabTile>(value)
                    .map_err(|e| CatalogError::MalformedResponse(format!("lab tile {}: {}", key, e)))
            })
            .collect()
    }

    /// Labs in controller order, numbered from 1.
    pub async fn list_labs(&self) -> Result<Vec<LabSummary>, CatalogError> {
        let labs: Vec<LabSummary> = self
            .fetch_tiles()
            .await?
            .into_iter()
            .enumerate()
            .map(|(i, tile)| LabSummary {
                index: i + 1,
                title: tile.lab_title,
                state: tile.state,
                id: tile.id,
            })
            .collect();
        info!("Controller reports {} labs", labs.len());
        Ok(labs)
    }

    pub async fn topology(&self, lab_id: &str) -> Result<LabTopology, CatalogError> {
        let tile = self
            .fetch_tiles()
            .await?
            .into_iter()
            .find(|tile| tile.id == lab_id)
            .ok_or_else(|| CatalogError::LabNotFound(lab_id.to_string()))?;
        let topology = tile.into_topology();
        debug!("Lab '{}' has {} nodes", topology.title, topology.nodes.len());
        Ok(topology)
    }
}
