//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and the service credential are available
//! before starting operations that would otherwise fail midway.

use crate::error::{Result, SkrivError};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Splitting large files requires ffmpeg and ffprobe.
    Split,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Split => {
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
        }
    }
    Ok(())
}

/// Resolve the AssemblyAI API key from a flag value or the environment.
pub fn resolve_api_key(flag: Option<String>) -> Result<String> {
    match flag {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(SkrivError::Config(
            "No API key provided. Pass --api-key or set ASSEMBLYAI_API_KEY.".to_string(),
        )),
    }
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash)
    match Command::new(name).arg("-version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(SkrivError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SkrivError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(SkrivError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
