//! ffmpeg-based audio segmentation.
//!
//! Splits an audio file into fixed-duration MP3 chunks using ffmpeg, with
//! ffprobe used once up front to determine the total duration.

use super::{Chunk, Segmenter};
use crate::error::{Result, SkrivError};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Segmenter backed by the ffmpeg/ffprobe command-line tools.
pub struct FfmpegSegmenter;

impl FfmpegSegmenter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Partition `duration_ms` into consecutive `[start, end)` windows of
/// `window_ms`, the last one truncated to the remainder.
pub fn plan_windows(duration_ms: u64, window_ms: u64) -> Vec<(u64, u64)> {
    assert!(window_ms > 0, "window must be positive");

    let mut windows = Vec::new();
    let mut start = 0;

    while start < duration_ms {
        let end = (start + window_ms).min(duration_ms);
        windows.push((start, end));
        start = end;
    }

    windows
}

#[async_trait]
impl Segmenter for FfmpegSegmenter {
    #[instrument(skip(self, out_dir), fields(source = %source.display()))]
    async fn segment(&self, source: &Path, out_dir: &Path, window_ms: u64) -> Result<Vec<Chunk>> {
        std::fs::create_dir_all(out_dir)?;

        let duration_ms = probe_duration_ms(source).await?;
        info!("Total audio duration: {:.1}s", duration_ms as f64 / 1000.0);

        // Short audio doesn't need splitting
        if duration_ms <= window_ms {
            return Ok(vec![Chunk {
                index: 0,
                start_ms: 0,
                end_ms: duration_ms,
                path: source.to_path_buf(),
            }]);
        }

        let base_name = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");

        let mut chunks = Vec::new();

        for (index, (start_ms, end_ms)) in plan_windows(duration_ms, window_ms).into_iter().enumerate() {
            let chunk_path = out_dir.join(format!("{}_{:04}.mp3", base_name, index));

            extract_window(source, &chunk_path, start_ms, end_ms - start_ms).await?;

            debug!("Created chunk {} at offset {}ms", index, start_ms);
            chunks.push(Chunk {
                index,
                start_ms,
                end_ms,
                path: chunk_path,
            });
        }

        info!("Created {} audio chunks", chunks.len());
        Ok(chunks)
    }
}

/// Extracts a time window from an audio file.
async fn extract_window(source: &Path, dest: &Path, start_ms: u64, length_ms: u64) -> Result<()> {
    let start = start_ms as f64 / 1000.0;
    let length = length_ms as f64 / 1000.0;

    // First attempt: stream copy (fast, no quality loss)
    let copy_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-c").arg("copy")
        .arg("-y")
        .arg("-loglevel").arg("warning")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if let Ok(status) = copy_result {
        if status.success() && dest.exists() {
            return Ok(());
        }
    }

    // Fallback: re-encode to MP3
    warn!("Stream copy failed, re-encoding chunk");

    let encode_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-codec:a").arg("libmp3lame")
        .arg("-qscale:a").arg("2")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match encode_result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(SkrivError::Segment(format!("Chunk extraction failed: {err}")))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SkrivError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(SkrivError::Segment(format!("ffmpeg error: {e}"))),
    }
}

/// Queries the duration of an audio file using ffprobe with JSON output.
async fn probe_duration_ms(path: &Path) -> Result<u64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SkrivError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(SkrivError::Decode(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(SkrivError::Decode(format!(
            "Input is not decodable audio: {}",
            path.display()
        )));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|_| SkrivError::Decode("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .map(|secs| (secs * 1000.0).round() as u64)
        .ok_or_else(|| SkrivError::Decode("Could not determine audio duration".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_windows_exact_multiple() {
        let windows = plan_windows(600_000, 300_000);
        assert_eq!(windows, vec![(0, 300_000), (300_000, 600_000)]);
    }

    #[test]
    fn test_plan_windows_remainder() {
        // 12 minutes at a 5-minute window: 5min, 5min, 2min
        let windows = plan_windows(720_000, 300_000);
        assert_eq!(
            windows,
            vec![(0, 300_000), (300_000, 600_000), (600_000, 720_000)]
        );
    }

    #[test]
    fn test_plan_windows_count_is_ceil() {
        for (duration, window) in [(1u64, 300_000u64), (299_999, 300_000), (300_001, 300_000), (900_000, 300_000)] {
            let expected = duration.div_ceil(window) as usize;
            assert_eq!(plan_windows(duration, window).len(), expected);
        }
    }

    #[test]
    fn test_plan_windows_contiguous_and_covering() {
        let duration = 1_234_567;
        let windows = plan_windows(duration, 300_000);

        assert_eq!(windows.first().unwrap().0, 0);
        assert_eq!(windows.last().unwrap().1, duration);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }

        let total: u64 = windows.iter().map(|(s, e)| e - s).sum();
        assert_eq!(total, duration);
    }

    #[test]
    fn test_plan_windows_short_audio_single_window() {
        assert_eq!(plan_windows(120_000, 300_000), vec![(0, 120_000)]);
        assert_eq!(plan_windows(300_000, 300_000), vec![(0, 300_000)]);
    }

    #[test]
    fn test_plan_windows_empty_duration() {
        assert!(plan_windows(0, 300_000).is_empty());
    }
}
