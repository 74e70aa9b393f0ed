//! Page rendering: mm-space layout primitives and the PDF assembler

pub mod layout;
pub mod page;

pub use page::render_receipt_pdf;

/// Fixed download name for the page artifact
pub const RECEIPT_FILE_NAME: &str = "recibo.pdf";

/// A finished, downloadable page artifact
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// Suggested file name for the download
    pub file_name: String,
    /// Serialized PDF bytes
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            file_name: RECEIPT_FILE_NAME.to_string(),
            bytes,
        }
    }
}
