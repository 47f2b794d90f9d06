//! Document export for Skriv.

mod docx;

pub use docx::{to_docx, DOCX_FILE_NAME, DOCX_MIME};
