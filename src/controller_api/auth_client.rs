use chrono::Utc;
use log::{debug, info, warn};
use serde_json::json;

use crate::controller_api::transport::{ApiRequest, ControllerTransport};
use crate::controller_api::types::AuthSession;
use crate::error_handling::types::AuthError;

/// Base of every REST call against `controller`.
pub fn api_base(controller: &str) -> String {
    format!("https://{}/api/v0", controller)
}

/// Logs in against the controller and returns a bearer-token session.
///
/// No retries happen here; the caller decides whether to re-prompt.
pub async fn authenticate<T: ControllerTransport + ?Sized>(
    transport: &T,
    username: &str,
    password: &str,
    controller: &str,
) -> Result<AuthSession, AuthError> {
    let base = api_base(controller);
    let request = ApiRequest::post_json(
        format!("{}/authenticate", base),
        json!({ "username": username, "password": password }),
    );

    info!("Validating account {} against {}", username, controller);
    let response = transport.send(request).await.map_err(|e| {
        warn!("Authentication request to {} failed: {}", controller, e);
        AuthError::from(e)
    })?;

    if !response.is_success() {
        warn!("Authentication against {} returned HTTP {}", controller, response.status);
        return Err(AuthError::from_status(response.status));
    }

    let token = response.body.trim().trim_matches('"').to_string();
    if token.is_empty() {
        return Err(AuthError::MalformedResponse("empty token".to_string()));
    }
    debug!("Received bearer token ({} chars)", token.len());

    Ok(AuthSession {
        api_base: base,
        token,
        issued_at: Utc::now(),
    })
}
