//! PDF text extraction via PDFium.

use std::path::Path;

use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

use crate::error::ExtractError;

/// Extract the text content of a PDF, pages in document order, separated by
/// newlines. Extraction failures are deterministic properties of the file,
/// so there is no retry.
pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let pdfium = create_pdfium()?;

    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| ExtractError::Open {
            source: Box::new(std::io::Error::other(format!(
                "Failed to load PDF: {e:?}"
            ))),
        })?;

    let page_count = document.pages().len();
    info!(pages = page_count, "Extracting PDF text");

    let mut pages = Vec::new();
    for (page_index, page) in document.pages().iter().enumerate() {
        let page_num = page_index as u32 + 1;

        let text = page.text().map_err(|e| {
            warn!(page = page_num, error = ?e, "Failed to get text object for page");
            ExtractError::Page {
                page: page_num,
                source: Box::new(std::io::Error::other(format!(
                    "Failed to extract text from page {page_num}: {e:?}"
                ))),
            }
        })?;

        pages.push(text.all());
    }

    let joined = join_pages(&pages).ok_or(ExtractError::Empty)?;

    debug!(pages = page_count, chars = joined.len(), "PDF text extracted");

    Ok(joined)
}

/// Concatenate per-page text in document order. Pages with no extractable
/// text contribute nothing. A document that yields only whitespace is a
/// failure, not an empty success, so this returns `None` for it.
fn join_pages(pages: &[String]) -> Option<String> {
    let joined = pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if joined.is_empty() { None } else { Some(joined) }
}

/// Create a new Pdfium instance (dynamically linked)
/// Searches for libpdfium in:
/// 1. Current directory (./libpdfium.so)
/// 2. vendor/pdfium/lib/
/// 3. System library paths
fn create_pdfium() -> Result<Pdfium, ExtractError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "./vendor/pdfium/lib/",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| ExtractError::Library {
            source: Box::new(std::io::Error::other(format!(
                "Failed to load PDFium library. Install libpdfium or place it next to the binary: {e:?}"
            ))),
        })?;

    Ok(Pdfium::new(bindings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_preserves_page_order() {
        let pages = vec![
            "first page".to_string(),
            "second page".to_string(),
            "third page".to_string(),
        ];
        assert_eq!(
            join_pages(&pages).unwrap(),
            "first page\nsecond page\nthird page"
        );
    }

    #[test]
    fn test_textless_pages_contribute_nothing() {
        let pages = vec![
            "first page".to_string(),
            String::new(),
            "   \n  ".to_string(),
            "last page".to_string(),
        ];
        assert_eq!(join_pages(&pages).unwrap(), "first page\nlast page");
    }

    #[test]
    fn test_whitespace_only_document_is_a_failure() {
        let pages = vec![String::new(), "  \t \n".to_string()];
        assert!(join_pages(&pages).is_none());
    }

    #[test]
    fn test_empty_document_is_a_failure() {
        assert!(join_pages(&[]).is_none());
    }
}
