//! Site and drive identity resolution
//!
//! Resolves a site URL plus library display name into the
//! `{site_id, drive_id}` pair every subsequent call needs, once, up front.
//! The result is an immutable [`DriveHandle`] passed explicitly through
//! the resolver and transfer engine - there is no lazily-populated global
//! state.

use anyhow::{Context, Result};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::client::{status_error, GraphClient};
use crate::GraphError;

// ============================================================================
// Graph API response types
// ============================================================================

/// Response from the site-by-path endpoint (`$select=id`)
#[derive(Debug, Deserialize)]
struct SiteResponse {
    id: String,
}

/// Response from listing the drives under a site
#[derive(Debug, Deserialize)]
struct DriveListResponse {
    #[serde(default)]
    value: Vec<DriveEntry>,
}

/// One drive (document library) under a site
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveEntry {
    id: String,
    name: Option<String>,
    display_name: Option<String>,
}

impl DriveEntry {
    fn matches(&self, library: &str) -> bool {
        self.name.as_deref() == Some(library) || self.display_name.as_deref() == Some(library)
    }

    fn label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.display_name.clone())
            .unwrap_or_default()
    }
}

// ============================================================================
// Site URL parsing
// ============================================================================

/// Splits a site URL into the `(host, site_path)` pair the site-by-path
/// endpoint expects.
///
/// `https://contoso.sharepoint.com/sites/Engineering/Sub` yields
/// `("contoso.sharepoint.com", "Engineering/Sub")`; `teams/` URLs are
/// handled the same way. For any other shape the last path segment is
/// used.
pub fn parse_site_url(site_url: &str) -> Result<(String, String)> {
    let parsed = Url::parse(site_url).with_context(|| format!("invalid site URL: {site_url}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| GraphError::InvalidResponse(format!("site URL has no host: {site_url}")))?
        .to_string();

    let path = parsed.path().trim_matches('/');
    let site_path = if let Some(rest) = path.strip_prefix("sites/") {
        rest.to_string()
    } else if let Some(rest) = path.strip_prefix("teams/") {
        rest.to_string()
    } else {
        path.rsplit('/').next().unwrap_or("").to_string()
    };

    Ok((host, site_path))
}

// ============================================================================
// DriveHandle
// ============================================================================

/// Immutable session context: an authenticated client bound to one drive.
///
/// Constructed once via [`DriveHandle::connect`] and passed (or injected)
/// into every subsequent resolver and transfer call.
#[derive(Debug)]
pub struct DriveHandle {
    client: GraphClient,
    site_id: String,
    drive_id: String,
}

impl DriveHandle {
    /// Resolves site and drive identity and returns the bound handle.
    ///
    /// # Errors
    /// Fails on an unparsable site URL, a fatal remote status, or when no
    /// drive under the site matches `library` by name or display name.
    pub async fn connect(client: GraphClient, site_url: &str, library: &str) -> Result<Self> {
        let (host, site_path) = parse_site_url(site_url)?;

        let site_id = resolve_site_id(&client, &host, &site_path).await?;
        debug!(%site_id, "resolved site");

        let drive_id = resolve_drive_id(&client, &site_id, library).await?;
        info!(%drive_id, library, "connected to document library");

        Ok(Self {
            client,
            site_id,
            drive_id,
        })
    }

    /// Builds a handle from already-known identifiers (useful for testing).
    pub fn from_parts(
        client: GraphClient,
        site_id: impl Into<String>,
        drive_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            site_id: site_id.into(),
            drive_id: drive_id.into(),
        }
    }

    /// The transport this handle is bound to.
    pub fn client(&self) -> &GraphClient {
        &self.client
    }

    /// The resolved site identifier.
    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// The resolved drive identifier.
    pub fn drive_id(&self) -> &str {
        &self.drive_id
    }
}

/// `GET /sites/{host}:/sites/{path}?$select=id`
async fn resolve_site_id(client: &GraphClient, host: &str, site_path: &str) -> Result<String> {
    let path = format!("/sites/{host}:/sites/{site_path}?$select=id");
    let response = client.execute(client.request(Method::GET, &path)).await?;

    if !response.status().is_success() {
        return Err(status_error(format!("Failed to resolve site id for '{host}/sites/{site_path}'"), response).await);
    }

    let site: SiteResponse = response
        .json()
        .await
        .context("Failed to parse site response")?;
    Ok(site.id)
}

/// `GET /sites/{site_id}/drives`, matched by name or display name.
async fn resolve_drive_id(client: &GraphClient, site_id: &str, library: &str) -> Result<String> {
    let path = format!("/sites/{site_id}/drives");
    let response = client.execute(client.request(Method::GET, &path)).await?;

    if !response.status().is_success() {
        return Err(status_error("Failed to list drives", response).await);
    }

    let drives: DriveListResponse = response
        .json()
        .await
        .context("Failed to parse drive list response")?;

    for drive in &drives.value {
        if drive.matches(library) {
            return Ok(drive.id.clone());
        }
    }

    Err(GraphError::DriveNotFound {
        library: library.to_string(),
        available: drives.value.iter().map(DriveEntry::label).collect(),
    }
    .into())
}

// ============================================================================
// Tests
// ============================================================================
