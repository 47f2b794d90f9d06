//! Transcribe command implementation.

use crate::audio::AudioAsset;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{Pipeline, ProgressFn};
use crate::summary::{summarize, SUMMARY_WORD_BUDGET};
use anyhow::Result;
use std::sync::Arc;

/// Run the transcribe command.
pub async fn run_transcribe(
    file: &str,
    api_key: Option<String>,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    let api_key = match preflight::resolve_api_key(api_key) {
        Ok(key) => key,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    let asset = match AudioAsset::from_path(file) {
        Ok(asset) => asset,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    Output::info(&format!(
        "Processing: {} ({:.2} MB)",
        asset.file_name,
        asset.size_bytes as f64 / (1024.0 * 1024.0)
    ));

    let pipeline = Pipeline::new(&api_key, &settings);

    // Splitting shells out to ffmpeg; make sure it's there before uploading.
    if pipeline.needs_split(&asset) {
        if let Err(e) = preflight::check(Operation::Split) {
            Output::error(&format!("{}", e));
            Output::info("Run 'skriv doctor' for detailed diagnostics.");
            return Err(e.into());
        }
        Output::warning("Large file detected, splitting into chunks.");
    }

    let pb = Output::progress_bar(100, "Transcribing");
    let bar = pb.clone();
    let progress: ProgressFn = Arc::new(move |fraction| {
        bar.set_position((fraction * 100.0).round() as u64);
    });

    let outcome = match pipeline.process_with_progress(&asset, Some(progress)).await {
        Ok(outcome) => {
            pb.finish_and_clear();
            outcome
        }
        Err(e) => {
            pb.finish_and_clear();
            Output::error(&format!("Failed to transcribe: {}", e));
            return Err(e.into());
        }
    };

    Output::success(&format!(
        "Transcription complete ({} chunk{})",
        outcome.chunk_count,
        if outcome.chunk_count == 1 { "" } else { "s" }
    ));

    Output::header("Short Summary");
    println!("{}", summarize(&outcome.transcript, SUMMARY_WORD_BUDGET));

    Output::header("Full Transcript");
    println!("{}", outcome.transcript);

    if let Some(output_path) = output {
        let bytes = crate::export::to_docx(&outcome.transcript)?;
        std::fs::write(&output_path, bytes)?;
        Output::success(&format!("Transcript saved to {}", output_path));
    }

    Ok(())
}
