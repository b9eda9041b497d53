//! HTTP implementation of the controller capability.
//!
//! Thin REST client over `reqwest`: bearer-token auth, request and connect
//! timeouts from [`ControllerConfig`], and error mapping into the
//! [`ControllerError`] taxonomy. Calls are attempted exactly once per cycle;
//! reconciliation retries by cadence, not by backoff loop.

use std::time::Duration;

use async_trait::async_trait;
use meshwork_core::{NetworkId, NodeId, RequestContext};
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::api::ControllerApi;
use crate::config::ControllerConfig;
use crate::error::{ControllerError, ControllerResult};
use crate::types::{ControllerStatus, MemberRecord, NetworkDetail, PeerSnapshot};

/// Batched peer lookup body.
#[derive(Serialize)]
struct PeerQuery<'a> {
    ids: Vec<&'a str>,
}

/// Member authorization update body.
#[derive(Serialize)]
struct AuthorizationUpdate {
    authorized: bool,
}

/// HTTP client for the network controller REST API.
pub struct ControllerClient {
    client: Client,
    config: ControllerConfig,
    base: Url,
}

impl std::fmt::Debug for ControllerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerClient")
            .field("config", &self.config.redacted())
            .finish_non_exhaustive()
    }
}

impl ControllerClient {
    /// Create a client from a configuration.
    ///
    /// Validates the configuration and builds the underlying HTTP client
    /// with the configured timeouts.
    pub fn new(config: ControllerConfig) -> ControllerResult<Self> {
        config.validate()?;

        let base = Url::parse(&config.base_url)
            .map_err(|e| ControllerError::invalid_config(format!("invalid base_url: {e}")))?;
        let client = Self::build_client(&config)?;

        Ok(Self {
            client,
            config,
            base,
        })
    }

    fn build_client(config: &ControllerConfig) -> ControllerResult<Client> {
        Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| {
                ControllerError::invalid_config(format!("failed to build HTTP client: {e}"))
            })
    }

    /// Join path segments onto the configured base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Validation guarantees the base URL has a host, so it can always
        // serve as a base for path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        url: &Url,
    ) -> ControllerResult<reqwest::Response> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e, url))?;

        debug!(url = %url, status = %response.status(), "Received controller response");
        Ok(response)
    }

    fn map_transport_error(&self, error: reqwest::Error, url: &Url) -> ControllerError {
        if error.is_timeout() {
            return ControllerError::Timeout {
                timeout_secs: self.config.timeout_secs,
            };
        }
        ControllerError::connection_failed_with_source(format!("request to {url} failed"), error)
    }

    /// Map a non-success response to an error, consuming the body for context.
    async fn response_error(response: reqwest::Response) -> ControllerError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Self::classify_status(status, &body)
    }

    fn classify_status(status: StatusCode, body: &str) -> ControllerError {
        let message = if body.is_empty() {
            status.canonical_reason().unwrap_or("unknown").to_string()
        } else {
            body.chars().take(256).collect()
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ControllerError::AuthenticationFailed
            }
            StatusCode::TOO_MANY_REQUESTS => {
                ControllerError::unavailable(format!("rate limited: {message}"))
            }
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => ControllerError::unavailable(message),
            _ => ControllerError::Http {
                status: status.as_u16(),
                message,
            },
        }
    }

    async fn decode<T>(response: reqwest::Response) -> ControllerResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        response.json::<T>().await.map_err(|e| {
            ControllerError::invalid_response_with_source("failed to decode controller payload", e)
        })
    }
}

#[async_trait]
impl ControllerApi for ControllerClient {
    async fn status(&self) -> ControllerResult<ControllerStatus> {
        let url = self.endpoint(&["api", "status"]);
        let response = self.send(self.client.get(url.clone()), &url).await?;
        if !response.status().is_success() {
            return Err(Self::response_error(response).await);
        }
        Self::decode(response).await
    }

    async fn network_detail(
        &self,
        ctx: &RequestContext,
        nwid: &NetworkId,
    ) -> ControllerResult<Option<NetworkDetail>> {
        debug!(user_id = %ctx.user_id(), nwid = %nwid, "Fetching network detail");

        let url = self.endpoint(&["api", "network", nwid.as_str()]);
        let response = self.send(self.client.get(url.clone()), &url).await?;

        // An unknown network is "no usable member collection", not an error.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::response_error(response).await);
        }

        // A literal JSON null body also means the controller has nothing
        // usable for this network.
        Self::decode::<Option<NetworkDetail>>(response).await
    }

    async fn peers(
        &self,
        ctx: &RequestContext,
        nwid: &NetworkId,
        members: &[MemberRecord],
    ) -> ControllerResult<Vec<PeerSnapshot>> {
        debug!(
            user_id = %ctx.user_id(),
            nwid = %nwid,
            member_count = members.len(),
            "Fetching peer snapshots"
        );

        let query = PeerQuery {
            ids: members.iter().map(|m| m.id.as_str()).collect(),
        };
        let url = self.endpoint(&["api", "network", nwid.as_str(), "peers"]);
        let response = self
            .send(self.client.post(url.clone()).json(&query), &url)
            .await?;
        if !response.status().is_success() {
            return Err(Self::response_error(response).await);
        }
        Self::decode(response).await
    }

    async fn set_authorized(
        &self,
        ctx: &RequestContext,
        nwid: &NetworkId,
        node_id: &NodeId,
        authorized: bool,
    ) -> ControllerResult<()> {
        debug!(
            user_id = %ctx.user_id(),
            nwid = %nwid,
            node_id = %node_id,
            authorized = authorized,
            "Updating member authorization"
        );

        let update = AuthorizationUpdate { authorized };
        let url = self.endpoint(&["api", "network", nwid.as_str(), "member", node_id.as_str()]);
        let response = self
            .send(self.client.post(url.clone()).json(&update), &url)
            .await?;
        if !response.status().is_success() {
            return Err(Self::response_error(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ControllerClient {
        ControllerClient::new(ControllerConfig::new(base_url)).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(ControllerClient::new(ControllerConfig::new("")).is_err());
        assert!(ControllerClient::new(ControllerConfig::new("ftp://x")).is_err());
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = client("http://127.0.0.1:9993");
        let url = client.endpoint(&["api", "network", "8056c2e21c000001"]);
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9993/api/network/8056c2e21c000001"
        );
    }

    #[test]
    fn test_endpoint_preserves_base_path() {
        let client = client("http://controller.example.com/zt/");
        let url = client.endpoint(&["api", "status"]);
        assert_eq!(url.as_str(), "http://controller.example.com/zt/api/status");
    }

    #[test]
    fn test_classify_status_maps_auth_failures() {
        let err = ControllerClient::classify_status(StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, ControllerError::AuthenticationFailed));

        let err = ControllerClient::classify_status(StatusCode::FORBIDDEN, "denied");
        assert!(matches!(err, ControllerError::AuthenticationFailed));
    }

    #[test]
    fn test_classify_status_maps_unavailability_as_transient() {
        for status in [
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::GATEWAY_TIMEOUT,
        ] {
            let err = ControllerClient::classify_status(status, "busy");
            assert!(err.is_transient(), "{status} should map to a transient error");
        }
    }

    #[test]
    fn test_classify_status_keeps_other_statuses() {
        let err = ControllerClient::classify_status(StatusCode::NOT_FOUND, "no such member");
        match err {
            ControllerError::Http { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such member");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_status_truncates_long_bodies() {
        let body = "x".repeat(1000);
        let err = ControllerClient::classify_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        match err {
            ControllerError::Http { message, .. } => assert_eq!(message.len(), 256),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = ControllerClient::new(
            ControllerConfig::new("http://127.0.0.1:9993").with_api_token("s3cr3t"),
        )
        .unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("***"));
        assert!(!debug.contains("s3cr3t"));
    }
}
