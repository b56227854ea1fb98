// src/api/client.rs

//! `reqwest`-backed client for the RightScale 1.5 API.
//!
//! The refresh token is exchanged for an access token once in
//! [`RightScaleClient::connect`]; the access token is then sent as a bearer
//! token on every request. Every request carries the per-request timeout
//! from [`ApiSettings`].

use reqwest::header::LOCATION;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::ApiSettings;
use crate::errors::ApiError;

use super::resource::summaries_from_json;
use super::{ApiFuture, RemoteApi, ResourceSummary, RunParam};

const API_VERSION_HEADER: &str = "X-Api-Version";

/// HTTP client for one RightScale account.
#[derive(Debug, Clone)]
pub struct RightScaleClient {
    client: reqwest::Client,
    endpoint: String,
    api_version: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl RightScaleClient {
    /// Build the HTTP client and exchange `refresh_token` for an access
    /// token at `<url>/api/oauth2`.
    pub async fn connect(settings: &ApiSettings, refresh_token: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| ApiError::from_reqwest(&settings.url, e))?;

        let endpoint = settings.url.trim_end_matches('/').to_string();
        let oauth_url = format!("{endpoint}/api/oauth2");
        debug!(url = %oauth_url, api_version = %settings.version, "requesting access token");

        let response = client
            .post(&oauth_url)
            .header(API_VERSION_HEADER, &settings.version)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&oauth_url, e))?;

        let response = ensure_success(&oauth_url, response).await?;
        let token: TokenResponse = response.json().await.map_err(|e| ApiError::Decode {
            url: oauth_url.clone(),
            message: e.to_string(),
        })?;

        info!(endpoint = %endpoint, "authenticated against RightScale API");

        Ok(Self::with_access_token(
            client,
            endpoint,
            settings.version.clone(),
            token.access_token,
        ))
    }

    /// Create a client from an already-acquired access token, reusing an
    /// existing [`reqwest::Client`].
    pub fn with_access_token(
        client: reqwest::Client,
        endpoint: String,
        api_version: String,
        access_token: String,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version,
            access_token,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    // ---- private helpers ----

    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, ApiError> {
        debug!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .header(API_VERSION_HEADER, &self.api_version)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(url, e))?;

        let response = ensure_success(url, response).await?;
        response.json().await.map_err(|e| ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn search(&self, collection: &str, name: &str) -> Result<Vec<ResourceSummary>, ApiError> {
        let url = absolute_url(&self.endpoint, &format!("/api/{collection}"));
        let filter = [("filter[]", format!("name=={name}"))];
        let body = self.get_json(&url, &filter).await?;
        summaries_from_json(body).map_err(|message| ApiError::Decode { url, message })
    }
}

impl RemoteApi for RightScaleClient {
    fn search_arrays<'a>(&'a self, name: &'a str) -> ApiFuture<'a, Vec<ResourceSummary>> {
        Box::pin(self.search("server_arrays", name))
    }

    fn search_scripts<'a>(&'a self, name: &'a str) -> ApiFuture<'a, Vec<ResourceSummary>> {
        Box::pin(self.search("right_scripts", name))
    }

    fn list_instances<'a>(
        &'a self,
        array_href: &'a str,
    ) -> ApiFuture<'a, Vec<ResourceSummary>> {
        Box::pin(async move {
            let url = absolute_url(
                &self.endpoint,
                &format!("{}/current_instances", array_href.trim_end_matches('/')),
            );
            let body = self.get_json(&url, &[]).await?;
            summaries_from_json(body).map_err(|message| ApiError::Decode { url, message })
        })
    }

    fn run_executable<'a>(&'a self, url: &'a str, param: &'a RunParam) -> ApiFuture<'a, String> {
        Box::pin(async move {
            let url = absolute_url(&self.endpoint, url);
            debug!(url = %url, param = param.key, "POST");

            let response = self
                .client
                .post(&url)
                .header(API_VERSION_HEADER, &self.api_version)
                .bearer_auth(&self.access_token)
                .form(&param.as_form())
                .send()
                .await
                .map_err(|e| ApiError::from_reqwest(&url, e))?;

            let response = ensure_success(&url, response).await?;
            response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
                .ok_or(ApiError::MissingLocation { url })
        })
    }

    fn task_summary<'a>(&'a self, location: &'a str) -> ApiFuture<'a, Option<String>> {
        Box::pin(async move {
            let url = absolute_url(&self.endpoint, location);
            let body = self.get_json(&url, &[]).await?;
            Ok(body
                .get("summary")
                .and_then(|summary| summary.as_str())
                .map(str::to_string))
        })
    }
}

/// Resolve an href handed out by the API against the endpoint.
///
/// Absolute URLs are passed through untouched.
pub fn absolute_url(endpoint: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    let endpoint = endpoint.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{endpoint}{href}")
    } else {
        format!("{endpoint}/{href}")
    }
}

/// Turn a non-2xx response into [`ApiError::Status`], keeping the body for
/// debugging.
async fn ensure_success(
    url: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        });
    }
    Ok(response)
}
