//! Configuration module for Skriv.

mod settings;

pub use settings::{GeneralSettings, ServerSettings, Settings, TranscriptionSettings};
