//! Subtitle text normalization.

use regex::Regex;
use std::sync::OnceLock;

fn cue_timing_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\d{2}:\d{2}:\d{2}\.\d{3} --> \d{2}:\d{2}:\d{2}\.\d{3}\n")
            .expect("cue timing regex is valid")
    })
}

fn newlines_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n+").expect("newline regex is valid"))
}

/// Normalize WebVTT subtitle text into one line of prose.
///
/// Removes bare cue timing lines, turns `&nbsp;` into spaces, and deletes
/// newlines outright (they are not replaced by spaces), then trims.
pub fn clean_subtitles(text: &str) -> String {
    let without_timings = cue_timing_regex().replace_all(text, "");
    let without_entities = without_timings.replace("&nbsp;", " ");
    newlines_regex()
        .replace_all(&without_entities, "")
        .trim()
        .to_string()
}
