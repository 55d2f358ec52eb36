//! Wire types for the stream-watcher backend
//!
//! Shapes match the backend's JSON exactly; nothing here is persisted
//! client-side.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Canonical channel identity returned by the lookup endpoints.
///
/// `custom_url` carries the handle for both providers (the YouTube custom
/// URL slug, or the Twitch login).
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    pub title: String,
    pub custom_url: String,
    pub thumbnail: String,
}

/// Lookup response envelope: exactly one of `data` / `error` is present
#[derive(Debug, Deserialize)]
pub struct LookupResponse {
    pub data: Option<ChannelInfo>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct YtChannelBrief {
    pub id: String,
    pub thumbnail_url: String,
    pub title: String,
    pub custom_url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TwChannelBrief {
    pub id: String,
    pub thumbnail_url: String,
    pub title: String,
    pub login: String,
}

/// Which channel an event belongs to, tagged by provider
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub enum EventSource {
    YoutubeChannel(YtChannelBrief),
    TwitchChannel(TwChannelBrief),
}

/// A scheduled or ongoing stream as reported by the backend.
///
/// Fetched fresh on every poll and replaced wholesale; never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct UpcomingEvent {
    pub start_date_time: DateTime<Utc>,
    pub start_timestamp_millis: i64,
    pub thumbnail_url: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub target_url: String,
    pub ongoing: bool,
    pub source: EventSource,
    pub uid: String,
}

#[derive(Debug, Deserialize)]
pub struct SyncNewResponse {
    pub key: String,
}

/// `/sync/pull` response; the backend omits a provider's field when it has
/// nothing stored for it
#[derive(Debug, Default, Deserialize)]
pub struct SyncPullResponse {
    #[serde(default)]
    pub yt_ch: Vec<String>,
    #[serde(default)]
    pub tw_ch: Vec<String>,
}

/// Generic `{"result": ...}` acknowledgement
#[derive(Debug, Deserialize)]
pub struct AckResponse {
    pub result: String,
}

impl AckResponse {
    pub fn is_ok(&self) -> bool {
        self.result == "Ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_upcoming_event() {
        let json = r#"{
            "start_date_time": "2024-05-01T12:00:00Z",
            "start_timestamp_millis": 1714564800000,
            "thumbnail_url": null,
            "title": "stream",
            "description": "",
            "target_url": "https://www.youtube.com/watch?v=abc",
            "ongoing": false,
            "source": {
                "YoutubeChannel": {
                    "id": "UC123",
                    "thumbnail_url": "https://img.example/t.jpg",
                    "title": "Some Channel",
                    "custom_url": "@somechannel"
                }
            },
            "uid": "abc@youtube"
        }"#;

        let event: UpcomingEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.start_timestamp_millis, 1714564800000);
        assert!(!event.ongoing);
        match event.source {
            EventSource::YoutubeChannel(ch) => assert_eq!(ch.custom_url, "@somechannel"),
            EventSource::TwitchChannel(_) => panic!("wrong source variant"),
        }
    }

    #[test]
    fn lookup_response_carries_data_or_error() {
        let ok: LookupResponse = serde_json::from_str(
            r#"{"data": {"id": "1", "title": "t", "custom_url": "@c", "thumbnail": "u"}}"#,
        )
        .unwrap();
        assert!(ok.data.is_some());
        assert!(ok.error.is_none());

        let err: LookupResponse =
            serde_json::from_str(r#"{"error": "Search channel failed: Not found"}"#).unwrap();
        assert!(err.data.is_none());
        assert!(err.error.is_some());
    }

    #[test]
    fn pull_response_defaults_missing_fields_to_empty() {
        let partial: SyncPullResponse = serde_json::from_str(r#"{"yt_ch": ["a"]}"#).unwrap();
        assert_eq!(partial.yt_ch, vec!["a"]);
        assert!(partial.tw_ch.is_empty());
    }
}
