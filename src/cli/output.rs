//! CLI output formatting utilities.

use chrono::{DateTime, Local, Utc};
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

    /// Print an ingested video.
    pub fn video_info(title: &str, id: &str, ingested_at: &DateTime<Utc>) {
        let local: DateTime<Local> = ingested_at.with_timezone(&Local);
        println!(
            "  {} {} ({}, {})",
            style("*").cyan(),
            style(title).bold(),
            style(id).dim(),
            local.format("%Y-%m-%d %H:%M")
        );
    }

    /// Print a retrieved transcript chunk.
    pub fn chunk(index: usize, text: &str) {
        println!(
            "  {} {}",
            style(format!("[{}]", index)).cyan(),
            content_preview(text, 200)
        );
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

/// Truncate content with ellipsis, counting characters.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short", 10), "short");
        assert_eq!(content_preview("a\nb", 10), "a b");
        assert_eq!(content_preview("abcdef", 3), "abc...");
        assert_eq!(content_preview("héllö wörld", 4), "héll...");
    }
}
