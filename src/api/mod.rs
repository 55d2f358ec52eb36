//! HTTP client for the stream-watcher backend
//!
//! All endpoints are plain GETs returning JSON. There is no retry policy:
//! a failed request is surfaced to the caller, which logs and keeps its
//! prior state.

mod types;

pub use types::{
    AckResponse, ChannelInfo, EventSource, LookupResponse, SyncNewResponse, SyncPullResponse,
    TwChannelBrief, UpcomingEvent, YtChannelBrief,
};

use tracing::debug;

use crate::config::Config;
use crate::error::WatchError;
use crate::store::Provider;

/// Client over the backend REST endpoints
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        let endpoint = config
            .api
            .endpoint
            .as_ref()
            .map(|e| e.trim_end_matches('/').to_string());

        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Check if the backend endpoint is configured
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    fn endpoint(&self) -> Result<&str, WatchError> {
        self.endpoint.as_deref().ok_or(WatchError::NotConfigured)
    }

    /// Resolve a user-entered query (URL or handle) to a canonical channel
    /// identity. The backend is the source of truth for what counts as a
    /// real channel.
    pub async fn lookup_channel(
        &self,
        provider: Provider,
        query: &str,
    ) -> Result<ChannelInfo, WatchError> {
        let path = match provider {
            Provider::YouTube => "yt-ch",
            Provider::Twitch => "tw-ch",
        };
        let url = format!("{}/{}", self.endpoint()?, path);

        debug!("Looking up {} channel: {}", provider.label(), query);

        let response: LookupResponse = self
            .client
            .get(url)
            .query(&[("q", query)])
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            debug!("Lookup failed for {:?}: {}", query, error);
            return Err(WatchError::NotFound(query.to_string()));
        }

        response
            .data
            .ok_or_else(|| WatchError::NotFound(query.to_string()))
    }

    /// Fetch upcoming/ongoing events for the given channel lists in one
    /// combined request. Fails with `EmptyTrackingList` before any network
    /// call when both lists are empty.
    pub async fn video_data(
        &self,
        yt_list: &[String],
        tw_list: &[String],
    ) -> Result<Vec<UpcomingEvent>, WatchError> {
        if yt_list.is_empty() && tw_list.is_empty() {
            return Err(WatchError::EmptyTrackingList);
        }

        let url = format!("{}/data", self.endpoint()?);
        let mut query: Vec<(&str, String)> = Vec::new();
        if !yt_list.is_empty() {
            query.push(("yt-ch", yt_list.join(",")));
        }
        if !tw_list.is_empty() {
            query.push(("tw-ch", tw_list.join(",")));
        }

        let events: Vec<UpcomingEvent> = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await?
            .json()
            .await?;

        debug!("Fetched {} events", events.len());
        Ok(events)
    }

    /// Request a fresh sync key from the backend
    pub async fn sync_new(&self) -> Result<String, WatchError> {
        let url = format!("{}/sync/new", self.endpoint()?);
        let response: SyncNewResponse = self.client.get(url).send().await?.json().await?;
        Ok(response.key)
    }

    /// Push both channel lists to the backend under `key`, overwriting
    /// whatever the key held. Callers must validate the key format first.
    pub async fn sync_push(
        &self,
        key: &str,
        yt_list: &[String],
        tw_list: &[String],
    ) -> Result<AckResponse, WatchError> {
        let url = format!("{}/sync/push", self.endpoint()?);
        let mut query: Vec<(&str, String)> = vec![("key", key.to_string())];
        if !yt_list.is_empty() {
            query.push(("yt-ch", yt_list.join(",")));
        }
        if !tw_list.is_empty() {
            query.push(("tw-ch", tw_list.join(",")));
        }

        let ack: AckResponse = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await?
            .json()
            .await?;
        Ok(ack)
    }

    /// Pull the channel lists stored under `key`. Callers must validate the
    /// key format first.
    pub async fn sync_pull(&self, key: &str) -> Result<SyncPullResponse, WatchError> {
        let url = format!("{}/sync/pull", self.endpoint()?);
        let pulled: SyncPullResponse = self
            .client
            .get(url)
            .query(&[("key", key)])
            .send()
            .await?
            .json()
            .await?;
        Ok(pulled)
    }

    /// Report manually noticed YouTube video ids to the backend
    pub async fn notice_videos(&self, ids: &[String]) -> Result<AckResponse, WatchError> {
        let url = format!("{}/notice-yt-video", self.endpoint()?);
        let ack: AckResponse = self
            .client
            .get(url)
            .query(&[("id", ids.join(","))])
            .send()
            .await?
            .json()
            .await?;
        Ok(ack)
    }

    /// Build the ICS calendar URL for the given channel lists. The URL is
    /// handed to a calendar application, never fetched by this client.
    /// `alram` is the backend's (historical) spelling of the parameter.
    pub fn calendar_url(
        &self,
        yt_list: &[String],
        tw_list: &[String],
        alarm: bool,
    ) -> Result<String, WatchError> {
        if yt_list.is_empty() && tw_list.is_empty() {
            return Err(WatchError::EmptyTrackingList);
        }

        let mut url = format!("{}/cal?", self.endpoint()?);
        let mut params: Vec<String> = Vec::new();
        if !yt_list.is_empty() {
            params.push(format!("yt-ch={}", yt_list.join(",")));
        }
        if !tw_list.is_empty() {
            params.push(format!("tw-ch={}", tw_list.join(",")));
        }
        if alarm {
            params.push("alram=true".to_string());
        }
        url.push_str(&params.join("&"));
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured_client() -> ApiClient {
        let mut config = Config::default();
        config.api.endpoint = Some("https://example.com/api/".to_string());
        ApiClient::new(&config)
    }

    #[test]
    fn endpoint_is_trimmed() {
        let client = configured_client();
        assert_eq!(client.endpoint().unwrap(), "https://example.com/api");
    }

    #[test]
    fn unconfigured_client_reports_it() {
        let client = ApiClient::new(&Config::default());
        assert!(!client.is_configured());
        assert!(matches!(
            client.endpoint(),
            Err(WatchError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn video_data_rejects_empty_lists_before_any_request() {
        // Endpoint is unreachable on purpose: with both lists empty the
        // method must fail locally, never touching the network.
        let client = configured_client();
        let result = client.video_data(&[], &[]).await;
        assert!(matches!(result, Err(WatchError::EmptyTrackingList)));
    }

    #[test]
    fn calendar_url_contains_both_lists_and_alarm() {
        let client = configured_client();
        let url = client
            .calendar_url(
                &["one".to_string(), "two".to_string()],
                &["three".to_string()],
                true,
            )
            .unwrap();
        assert_eq!(
            url,
            "https://example.com/api/cal?yt-ch=one,two&tw-ch=three&alram=true"
        );
    }

    #[test]
    fn calendar_url_rejects_empty_lists() {
        let client = configured_client();
        assert!(matches!(
            client.calendar_url(&[], &[], false),
            Err(WatchError::EmptyTrackingList)
        ));
    }
}
