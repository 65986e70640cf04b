//! YouTube source implementation backed by yt-dlp.

use super::{VideoMetadata, VideoSource};
use crate::error::{Result, VidqaError};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};
use url::Url;

/// Title used when yt-dlp reports none.
const FALLBACK_TITLE: &str = "No Title";

/// YouTube video source.
pub struct YoutubeSource {
    video_id_regex: Regex,
    subtitles_dir: PathBuf,
    subtitle_langs: Vec<String>,
}

impl YoutubeSource {
    pub fn new(subtitles_dir: PathBuf, subtitle_langs: Vec<String>) -> Self {
        // Matches short/embed URL forms and bare video IDs
        let video_id_regex = Regex::new(
            r"(?x)
            (?:
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtu\.be/|youtube\.com/embed/|youtube\.com/v/|youtube\.com/shorts/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            # Bare video ID (11 characters)
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex");

        let subtitle_langs = if subtitle_langs.is_empty() {
            vec!["en".to_string()]
        } else {
            subtitle_langs
        };

        Self {
            video_id_regex,
            subtitles_dir,
            subtitle_langs,
        }
    }

    /// Extract the video ID from a watch URL's `v` parameter, a short URL, or a bare ID.
    fn extract_video_id(&self, input: &str) -> Option<String> {
        let input = input.trim();

        let parsed = Url::parse(input).or_else(|e| {
            if input.contains("://") {
                Err(e)
            } else {
                Url::parse(&format!("https://{}", input))
            }
        });

        if let Ok(url) = parsed {
            if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
                let valid = !v.is_empty()
                    && v.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
                return valid.then(|| v.into_owned());
            }
        }

        let caps = self.video_id_regex.captures(input)?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    fn watch_url(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", video_id)
    }

    /// Locate a downloaded subtitle file, honouring language preference.
    fn find_subtitles(&self, dir: &Path) -> Option<PathBuf> {
        self.subtitle_langs
            .iter()
            .map(|lang| dir.join(format!("subtitles.{}.vtt", lang)))
            .find(|p| p.exists())
    }

    /// Run yt-dlp with the given arguments, mapping a missing binary to `ToolNotFound`.
    async fn run_ytdlp(args: &[&str]) -> Result<std::process::Output> {
        Command::new("yt-dlp")
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VidqaError::ToolNotFound("yt-dlp".to_string())
                } else {
                    VidqaError::ToolFailed(format!("Failed to run yt-dlp: {}", e))
                }
            })
    }
}

#[async_trait]
impl VideoSource for YoutubeSource {
    fn can_handle(&self, reference: &str) -> bool {
        self.extract_video_id(reference).is_some()
    }

    fn resolve_id(&self, reference: &str) -> Result<String> {
        self.extract_video_id(reference).ok_or_else(|| {
            VidqaError::InvalidReference(format!(
                "Invalid YouTube URL or video ID not found: {}",
                reference
            ))
        })
    }

    #[instrument(skip(self))]
    async fn fetch_metadata(&self, reference: &str) -> Result<VideoMetadata> {
        let video_id = self.resolve_id(reference)?;
        let url = Self::watch_url(&video_id);

        let output = Self::run_ytdlp(&["--dump-json", "--no-download", "--no-warnings", &url]).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidqaError::VideoNotFound(format!(
                "Video {} not found or unavailable: {}",
                video_id, stderr
            )));
        }

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).map_err(|e| {
            VidqaError::ToolFailed(format!("Failed to parse yt-dlp output: {}", e))
        })?;

        let title = json["title"]
            .as_str()
            .unwrap_or(FALLBACK_TITLE)
            .to_string();

        Ok(VideoMetadata {
            id: video_id,
            title,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_transcript(&self, reference: &str) -> Result<String> {
        let video_id = self.resolve_id(reference)?;
        let output_dir = self.subtitles_dir.join(&video_id);
        tokio::fs::create_dir_all(&output_dir).await?;

        if let Some(path) = self.find_subtitles(&output_dir) {
            info!("Using cached subtitles {:?}", path);
            return Ok(tokio::fs::read_to_string(path).await?);
        }

        let url = Self::watch_url(&video_id);
        let template = output_dir.join("subtitles");
        let template = template.to_string_lossy();
        let langs = self.subtitle_langs.join(",");

        info!("Downloading subtitles for {}", video_id);
        let output = Self::run_ytdlp(&[
            "--write-subs",
            "--write-auto-subs",
            "--sub-format",
            "vtt",
            "--sub-langs",
            &langs,
            "--skip-download",
            "--no-warnings",
            "--output",
            &template,
            &url,
        ])
        .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidqaError::ToolFailed(format!("yt-dlp failed: {}", stderr)));
        }

        let path = self.find_subtitles(&output_dir).ok_or_else(|| {
            VidqaError::TranscriptNotFound(format!(
                "No {} subtitles available for {}",
                langs, video_id
            ))
        })?;

        debug!("Subtitles written to {:?}", path);
        Ok(tokio::fs::read_to_string(path).await?)
    }
}
