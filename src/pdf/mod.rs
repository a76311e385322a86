pub mod document;
pub mod placeholder;

pub use document::{PdfDocument, ScrubMode};
