//! Channel resolution and bulk import
//!
//! A single query goes through `ApiClient::lookup_channel`; this module adds
//! the bulk path: parse a comma-separated query list (or extract the
//! `yt-ch`/`tw-ch` parameters out of a shared import URL), resolve every
//! query concurrently, and add each successful resolution to the store.
//! Partial failures are skipped with a log line; there is no rollback and
//! no aggregate error.

use anyhow::Result;
use futures::future::join_all;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{info, warn};

use crate::api::{ApiClient, ChannelInfo};
use crate::error::WatchError;
use crate::store::{ChannelStore, Persistence, Provider};

static YT_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"yt-ch=([^&\s]+)").expect("static regex"));
static TW_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tw-ch=([^&\s]+)").expect("static regex"));
static VIDEO_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https://www\.youtube\.com/watch\?.*v=|https://youtu\.be/)([\w-]+)")
        .expect("static regex")
});

/// Split a user-entered import value into per-provider queries.
///
/// When the value looks like a shared URL carrying `yt-ch=`/`tw-ch=`
/// parameters, those lists are extracted and `default_provider` is ignored.
/// Otherwise the value is treated as a comma-separated query list for
/// `default_provider`.
pub fn extract_import_queries(
    value: &str,
    default_provider: Provider,
) -> Vec<(Provider, String)> {
    let mut queries = Vec::new();

    let yt_params = YT_PARAM_RE.captures(value);
    let tw_params = TW_PARAM_RE.captures(value);

    if yt_params.is_some() || tw_params.is_some() {
        if let Some(captures) = yt_params {
            for query in captures[1].split(',').filter(|s| !s.is_empty()) {
                queries.push((Provider::YouTube, query.to_string()));
            }
        }
        if let Some(captures) = tw_params {
            for query in captures[1].split(',').filter(|s| !s.is_empty()) {
                queries.push((Provider::Twitch, query.to_string()));
            }
        }
        return queries;
    }

    for query in value.split(',') {
        let query = query.trim();
        if !query.is_empty() {
            queries.push((default_provider, query.to_string()));
        }
    }
    queries
}

/// Extract YouTube video ids from a comma-separated list of watch URLs,
/// short URLs, or raw ids (passed through unchanged).
pub fn extract_video_ids(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| match VIDEO_URL_RE.captures(entry) {
            Some(captures) => captures[1].to_string(),
            None => entry.to_string(),
        })
        .collect()
}

/// Resolve all queries concurrently and add the successful ones to the
/// store. Returns how many channels were newly added.
pub async fn bulk_import<P: Persistence>(
    api: &ApiClient,
    store: &mut ChannelStore<P>,
    queries: &[(Provider, String)],
) -> Result<usize> {
    let lookups = queries
        .iter()
        .map(|(provider, query)| api.lookup_channel(*provider, query));
    let results: Vec<Result<ChannelInfo, WatchError>> = join_all(lookups).await;

    let resolutions: Vec<(Provider, Result<ChannelInfo, WatchError>)> = queries
        .iter()
        .map(|(provider, _)| *provider)
        .zip(results)
        .collect();

    apply_resolutions(store, resolutions)
}

/// Merge resolution results into the store; failed resolutions are logged
/// and skipped.
fn apply_resolutions<P: Persistence>(
    store: &mut ChannelStore<P>,
    resolutions: Vec<(Provider, Result<ChannelInfo, WatchError>)>,
) -> Result<usize> {
    let mut added = 0;
    for (provider, result) in resolutions {
        match result {
            Ok(info) => {
                if store.add(provider, &info.custom_url)? {
                    info!(
                        "Now following {} channel {} ({})",
                        provider.label(),
                        info.title,
                        info.custom_url
                    );
                    added += 1;
                }
            }
            Err(e) => {
                warn!("Skipping channel that failed to resolve: {}", e);
            }
        }
    }
    Ok(added)
}
