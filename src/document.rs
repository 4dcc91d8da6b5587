/*!
 * Collaborator seam for translatable documents.
 *
 * Subtitle parsing and rendering live outside this library; the orchestrator
 * only needs an ordered text extraction and a way to apply an equal-length
 * list of translations back.
 */

use anyhow::{anyhow, Result};

/// A parsed document whose texts can be translated in place.
///
/// Implementations own the file-format details; this library only relies on
/// `extract_texts` producing a stable order and `apply_translations`
/// requiring exactly one translation per extracted text.
pub trait TranslatableDocument {
    /// Ordered translatable texts of the document
    fn extract_texts(&self) -> Vec<String>;

    /// Apply translations in the same order `extract_texts` produced.
    ///
    /// Implementations must reject a sequence whose length differs from the
    /// extracted texts; `ensure_translation_count` is provided for that.
    fn apply_translations(&mut self, translations: &[String]) -> Result<()>;
}

/// Validate that a translation sequence matches the extracted text count
pub fn ensure_translation_count(extracted: usize, translations: &[String]) -> Result<()> {
    if translations.len() != extracted {
        return Err(anyhow!(
            "Expected {} translations, got {}",
            extracted,
            translations.len()
        ));
    }
    Ok(())
}
