//! Bucketing and rendering of the fetched video list
//!
//! The data-to-viewmodel transformation is pure so it can be tested without
//! touching the terminal: events are partitioned against the current wall
//! clock into ongoing / starting-now / upcoming buckets, and start times are
//! turned into coarse relative labels. Bucketing is best-effort: the client
//! clock and the server-reported `ongoing` flag can briefly disagree around
//! a stream's start.

use chrono::{DateTime, Utc};

use crate::api::{EventSource, UpcomingEvent};

const MIN_MS: i64 = 1000 * 60;
const HOUR_MS: i64 = MIN_MS * 60;
const DAY_MS: i64 = HOUR_MS * 24;

/// Display bucket for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Ongoing,
    StartingNow,
    Upcoming,
}

/// Partition rule, evaluated against wall-clock `now_millis`:
/// the backend's `ongoing` flag wins; otherwise an elapsed start time means
/// the stream should be starting about now.
pub fn bucket_for(event: &UpcomingEvent, now_millis: i64) -> Bucket {
    if event.ongoing {
        Bucket::Ongoing
    } else if event.start_timestamp_millis < now_millis {
        Bucket::StartingNow
    } else {
        Bucket::Upcoming
    }
}

/// One renderable line of the video list
#[derive(Debug, Clone)]
pub struct EventLine {
    pub title: String,
    pub channel: String,
    pub target_url: String,
    pub when: String,
}

/// The bucketed view of the current event list
#[derive(Debug, Default)]
pub struct VideoListView {
    pub ongoing: Vec<EventLine>,
    pub starting_now: Vec<EventLine>,
    pub upcoming: Vec<EventLine>,
}

/// Build the viewmodel for `events` as of `now`
pub fn build_view(events: &[UpcomingEvent], now: DateTime<Utc>) -> VideoListView {
    let now_millis = now.timestamp_millis();
    let mut view = VideoListView::default();

    for event in events {
        let line = EventLine {
            title: event.title.clone(),
            channel: channel_label(&event.source),
            target_url: event.target_url.clone(),
            when: time_delta_label(event.start_timestamp_millis, now_millis),
        };

        match bucket_for(event, now_millis) {
            Bucket::Ongoing => view.ongoing.push(line),
            Bucket::StartingNow => view.starting_now.push(line),
            Bucket::Upcoming => view.upcoming.push(line),
        }
    }

    view
}

fn channel_label(source: &EventSource) -> String {
    match source {
        EventSource::YoutubeChannel(ch) => format!("{} ({})", ch.title, ch.custom_url),
        EventSource::TwitchChannel(ch) => format!("{} ({})", ch.title, ch.login),
    }
}

/// Coarse relative label for a start time: days, then hours, then minutes
pub fn time_delta_label(start_millis: i64, now_millis: i64) -> String {
    let before_after = if start_millis > now_millis {
        "later"
    } else {
        "ago"
    };

    let delta_ms = (start_millis - now_millis).abs();
    if delta_ms > DAY_MS {
        format!("{} days {}", delta_ms / DAY_MS, before_after)
    } else if delta_ms > HOUR_MS {
        format!("{} hours {}", delta_ms / HOUR_MS, before_after)
    } else {
        format!("{} mins {}", delta_ms / MIN_MS, before_after)
    }
}

/// Print the bucketed list to stdout. An empty starting-now bucket hides
/// its whole section; the other two always render with their counts.
pub fn render(view: &VideoListView) {
    println!();
    println!("== Ongoing ({})", view.ongoing.len());
    render_section(&view.ongoing);

    if !view.starting_now.is_empty() {
        println!("== Starting now ({})", view.starting_now.len());
        render_section(&view.starting_now);
    }

    println!("== Upcoming ({})", view.upcoming.len());
    render_section(&view.upcoming);
}

fn render_section(lines: &[EventLine]) {
    for line in lines {
        println!("  [{}] {} — {}", line.when, line.title, line.channel);
        println!("      {}", line.target_url);
    }
    if lines.is_empty() {
        println!("  (none)");
    }
}

/// Event constructors shared by unit tests in this crate
#[cfg(test)]
pub mod tests_support {
    use super::*;
    use crate::api::YtChannelBrief;
    use chrono::TimeZone;

    pub fn event(ongoing: bool, start_millis: i64) -> UpcomingEvent {
        UpcomingEvent {
            start_date_time: Utc.timestamp_millis_opt(start_millis).unwrap(),
            start_timestamp_millis: start_millis,
            thumbnail_url: None,
            title: "stream".to_string(),
            description: String::new(),
            target_url: "https://example.com/watch".to_string(),
            ongoing,
            source: EventSource::YoutubeChannel(YtChannelBrief {
                id: "UC1".to_string(),
                thumbnail_url: String::new(),
                title: "Channel".to_string(),
                custom_url: "@channel".to_string(),
            }),
            uid: "uid".to_string(),
        }
    }

    pub fn sample_event() -> UpcomingEvent {
        event(false, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::tests_support::event;
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn partitions_one_event_per_bucket() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let now_millis = now.timestamp_millis();
        let events = vec![
            event(true, now_millis + 5_000),
            event(false, now_millis - 1_000),
            event(false, now_millis + 1_000),
        ];

        let view = build_view(&events, now);
        assert_eq!(view.ongoing.len(), 1);
        assert_eq!(view.starting_now.len(), 1);
        assert_eq!(view.upcoming.len(), 1);
    }

    #[test]
    fn ongoing_flag_wins_over_elapsed_start() {
        let now_millis = 1_700_000_000_000;
        assert_eq!(
            bucket_for(&event(true, now_millis - 60_000), now_millis),
            Bucket::Ongoing
        );
    }

    #[test]
    fn labels_use_coarsest_fitting_unit() {
        let now = 1_700_000_000_000;
        assert_eq!(time_delta_label(now - 3 * MIN_MS, now), "3 mins ago");
        assert_eq!(time_delta_label(now + 2 * HOUR_MS + MIN_MS, now), "2 hours later");
        assert_eq!(time_delta_label(now - 3 * DAY_MS - HOUR_MS, now), "3 days ago");
        assert_eq!(time_delta_label(now, now), "0 mins ago");
    }

    #[test]
    fn channel_label_names_the_source() {
        let view = build_view(
            &[event(true, 0)],
            Utc.timestamp_millis_opt(1_000).unwrap(),
        );
        assert_eq!(view.ongoing[0].channel, "Channel (@channel)");
    }
}
