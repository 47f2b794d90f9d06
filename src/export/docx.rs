//! DOCX serialization of a transcript.

use crate::error::{Result, SkrivError};
use docx_rs::{Docx, Paragraph, Run, Style, StyleType};
use std::io::Cursor;

/// Fixed download name for the exported document.
pub const DOCX_FILE_NAME: &str = "transcript.docx";

/// MIME type of the exported document.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Serialize a transcript into an in-memory Word document with a
/// "Transcription" heading and one body paragraph holding the full text.
pub fn to_docx(text: &str) -> Result<Vec<u8>> {
    let heading_style = Style::new("Heading1", StyleType::Paragraph)
        .name("Heading 1")
        .size(32)
        .bold();

    let mut buffer = Cursor::new(Vec::new());

    Docx::new()
        .add_style(heading_style)
        .add_paragraph(
            Paragraph::new()
                .style("Heading1")
                .add_run(Run::new().add_text("Transcription")),
        )
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
        .build()
        .pack(&mut buffer)
        .map_err(|e| SkrivError::Export(e.to_string()))?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docx_buffer_is_a_zip() {
        let bytes = to_docx("a\nb\nc\n").unwrap();
        assert!(!bytes.is_empty());
        // OOXML containers are ZIP archives
        assert_eq!(&bytes[..4], b"PK\x03\x04");
    }

    #[test]
    fn test_empty_text_still_exports() {
        let bytes = to_docx("").unwrap();
        assert!(!bytes.is_empty());
    }
}
