//! Page layout for the review document.
//!
//! [`LayoutEngine`] offers a small set of flow primitives (banner, section
//! header, labeled block, colored line, link, image) and produces a
//! backend-neutral [`Document`]. Text is measured with standard Helvetica
//! metrics and restricted to WinAnsi so any PDF viewer can show it without
//! embedded fonts.

pub mod document;
mod engine;
pub mod metrics;

pub use document::{
    Align, Block, BlockKind, Document, Footer, Frame, ImageData, Page, PageSize, Section, TextRun,
    TextStyle,
};
pub use engine::{LabelSize, LayoutEngine, Margins, TextSize};
pub use metrics::{FontFace, MM_PER_PT, encode_winansi, sanitize, text_width_mm, wrap};
