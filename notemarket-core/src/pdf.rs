//! PDF inspection for uploads and derived preview copies.

use lopdf::Document as PdfDocument;
use tracing::debug;

use crate::error::{MarketError, Result};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Cheap header check, done before parsing.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

fn load(bytes: &[u8]) -> Result<PdfDocument> {
    if !looks_like_pdf(bytes) {
        return Err(MarketError::Pdf("missing %PDF- header".into()));
    }
    PdfDocument::load_mem(bytes).map_err(|e| MarketError::Pdf(e.to_string()))
}

/// Number of pages in the document.
pub fn page_count(bytes: &[u8]) -> Result<u32> {
    let doc = load(bytes)?;
    let pages = doc.get_pages().len();
    if pages == 0 {
        return Err(MarketError::Pdf("document has no pages".into()));
    }
    u32::try_from(pages).map_err(|_| MarketError::Pdf("too many pages".into()))
}

/// Copy of the document holding only its first `keep` pages. When `keep`
/// covers the whole document the input is returned unchanged.
pub fn truncate_to_pages(bytes: &[u8], keep: u32) -> Result<Vec<u8>> {
    let keep = keep.max(1);
    let mut doc = load(bytes)?;
    let total = doc.get_pages().len() as u32;
    if keep >= total {
        return Ok(bytes.to_vec());
    }

    // Delete from the back so remaining page numbers stay valid.
    let doomed: Vec<u32> = (keep + 1..=total).rev().collect();
    for page in doomed {
        doc.delete_pages(&[page]);
    }
    doc.prune_objects();
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| MarketError::Pdf(format!("save failed: {e}")))?;
    debug!(kept = keep, total, size = buffer.len(), "truncated preview copy");
    Ok(buffer)
}
