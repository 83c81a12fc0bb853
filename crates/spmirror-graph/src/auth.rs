//! OAuth2 client-credentials token provider
//!
//! Acquires an application (daemon) bearer token from the Microsoft
//! identity platform using the client-credentials grant. The token is
//! fetched once per process by the CLI and handed to
//! [`crate::client::GraphClient`]; expiry is not tracked (a run is
//! expected to finish within the token lifetime).

use anyhow::{Context, Result};
use oauth2::{
    basic::BasicClient, AuthType, ClientId, ClientSecret, Scope, TokenResponse, TokenUrl,
};
use tracing::{debug, info};

use crate::GraphError;

/// Scope requesting the application permissions granted to the client.
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Per-tenant token endpoint.
fn token_url(tenant_id: &str) -> String {
    format!("https://login.microsoftonline.com/{tenant_id}/oauth2/v2.0/token")
}

// ============================================================================
// ClientCredentials
// ============================================================================

/// Client-credentials token provider for a confidential app registration.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    /// Entra ID tenant (directory) ID
    pub tenant_id: String,
    /// Application (client) ID
    pub client_id: String,
    /// Application client secret
    pub client_secret: String,
}

impl ClientCredentials {
    /// Creates a new provider from the app registration identity.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Acquires a bearer token for the Graph API.
    ///
    /// # Errors
    /// Returns [`GraphError::Auth`] context if the identity platform
    /// rejects the credentials. There is no retry at this layer.
    pub async fn acquire(&self) -> Result<String> {
        debug!(tenant = %self.tenant_id, "requesting client-credentials token");

        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_auth_type(AuthType::RequestBody)
            .set_token_uri(
                TokenUrl::new(token_url(&self.tenant_id)).context("Invalid token URL")?,
            );

        let http_client = reqwest::Client::new();
        let token_result = client
            .exchange_client_credentials()
            .add_scope(Scope::new(GRAPH_SCOPE.to_string()))
            .request_async(&http_client)
            .await
            .map_err(|e| GraphError::Auth(e.to_string()))
            .context("Failed to acquire access token")?;

        info!("acquired access token");
        Ok(token_result.access_token().secret().to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
