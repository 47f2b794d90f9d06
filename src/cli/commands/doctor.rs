//! Doctor command: diagnose tool and credential availability.

use crate::cli::preflight::check_tool;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the doctor command.
pub fn run_doctor(settings: &Settings) -> Result<()> {
    Output::header("Skriv Doctor");
    println!();

    let mut problems = 0;

    for tool in ["ffmpeg", "ffprobe"] {
        match check_tool(tool) {
            Ok(()) => Output::kv(tool, "ok"),
            Err(e) => {
                Output::kv(tool, "missing");
                Output::warning(&format!("{}", e));
                problems += 1;
            }
        }
    }

    match std::env::var("ASSEMBLYAI_API_KEY") {
        Ok(key) if !key.is_empty() => Output::kv("ASSEMBLYAI_API_KEY", "set"),
        _ => {
            Output::kv("ASSEMBLYAI_API_KEY", "not set");
            Output::info("The key can also be passed per request (--api-key or the web form).");
        }
    }

    Output::kv(
        "config",
        &Settings::default_config_path().display().to_string(),
    );
    Output::kv("temp dir", &settings.temp_dir().display().to_string());

    println!();
    if problems == 0 {
        Output::success("Everything looks good.");
    } else {
        Output::warning(&format!(
            "{} problem(s) found. Splitting large files will not work until ffmpeg/ffprobe are installed.",
            problems
        ));
    }

    Ok(())
}
