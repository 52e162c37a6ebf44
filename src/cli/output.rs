//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one indexed video.
    pub fn video_info(id: &str, source: &str, chunks: usize, model: &str, indexed_at: &str) {
        println!(
            "  {} {} ({} chunks, {}, indexed {})",
            style("*").cyan(),
            style(id).bold(),
            chunks,
            style(model).dim(),
            indexed_at
        );
        println!("    {}", style(source).dim());
    }

    /// Print a cited source: rank, timestamp, similarity, preview and deep link.
    pub fn source(rank: usize, timestamp: &str, similarity: f32, content: &str, url: &str) {
        println!(
            "\n{} {} (relevance: {:.0}%)",
            style(format!("[{}]", rank)).green().bold(),
            style(timestamp).cyan(),
            similarity.clamp(0.0, 1.0) * 100.0
        );
        println!("   {}", content_preview(content, 200));
        println!("   {}", style(url).dim());
    }

    /// Print a transcript excerpt with its timestamp.
    pub fn excerpt(timestamp: &str, content: &str, url: &str) {
        println!("\n{} {}", style(timestamp).cyan().bold(), style(url).dim());
        println!("   {}", content);
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Format duration in seconds to a human-readable string.
pub(crate) fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Truncate content with ellipsis, on a character boundary.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    match content.char_indices().nth(max_chars) {
        None => content,
        Some((cut, _)) => format!("{}...", &content[..cut]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42.9), "42s");
        assert_eq!(format_duration(135.0), "2m 15s");
        assert_eq!(format_duration(3725.0), "1h 2m 5s");
    }

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short\ntext", 200), "short text");
        assert_eq!(content_preview("abcdef", 3), "abc...");
        // Multibyte text is cut between characters.
        assert_eq!(content_preview("日本語テキスト", 3), "日本語...");
    }
}
