//! Timestamp formatting and deep links back into the video.

/// Whole seconds of a playback offset. Negative and non-finite values map to 0.
fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    }
}

/// Format seconds as `m:ss`, or `h:mm:ss` once past the hour.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = whole_seconds(seconds);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Canonical watch URL for a video.
pub fn watch_url(base_url: &str, video_id: &str) -> String {
    format!("{}?v={}", base_url.trim_end_matches(['?', '/']), video_id)
}

/// Watch URL that starts playback at `timestamp` (truncated to whole seconds).
pub fn generate_youtube_link(base_url: &str, video_id: &str, timestamp: f64) -> String {
    format!("{}&t={}s", watch_url(base_url, video_id), whole_seconds(timestamp))
}
