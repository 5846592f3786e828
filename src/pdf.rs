// Pdfium session helper and text-layer access
//
// A fresh Pdfium instance is created per operation; nothing is shared across
// calls, which sidesteps borrowing and threading concerns entirely.
use std::path::Path;

use pdfium_render::prelude::*;

use crate::config;
use crate::error::{LabelError, Result};

/// Run an operation against a freshly bound Pdfium instance.
pub fn with_pdfium<F, R>(f: F) -> Result<R>
where
    F: FnOnce(&Pdfium) -> Result<R>,
{
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
        &config::pdfium_library_path(),
    ))
    .or_else(|_| Pdfium::bind_to_system_library())
    .map_err(|e| LabelError::Pdfium(format!("failed to bind pdfium: {e}")))?;

    f(&Pdfium::new(bindings))
}

/// Extract the whole text layer of a document: page texts joined with a
/// single space and trimmed. Pages without a text layer contribute nothing.
pub fn document_text(path: &Path) -> Result<String> {
    with_pdfium(|pdfium| {
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| LabelError::Pdfium(format!("{}: {e}", path.display())))?;

        let mut parts = Vec::new();
        for page in document.pages().iter() {
            if let Ok(text) = page.text() {
                parts.push(text.all());
            }
        }
        Ok(parts.join(" ").trim().to_string())
    })
}
