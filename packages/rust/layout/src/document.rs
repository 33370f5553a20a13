//! The laid-out document: pages of sections of positioned blocks.
//!
//! Coordinates are millimetres from the top-left corner of the page. The
//! model is backend-neutral; a writer only has to paint what it finds here.

use eksreview_shared::Rgb;

use crate::metrics::FontFace;

/// Page dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageSize {
    /// ISO A4, the default page.
    pub const A4: PageSize = PageSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    /// US Letter, 8.5 × 11 in.
    pub const LETTER: PageSize = PageSize {
        width_mm: 215.9,
        height_mm: 279.4,
    };
}

/// A rectangle on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Font settings of a text block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size_pt: f32,
    pub line_height_mm: f32,
}

/// How a run of text is placed within its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Already-wrapped lines of text sharing one style and color.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub lines: Vec<String>,
    pub style: TextStyle,
    pub color: Rgb,
    pub align: Align,
}

impl TextRun {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Decoded RGB8 pixels of an embedded image.
#[derive(Clone, PartialEq)]
pub struct ImageData {
    pub width_px: u32,
    pub height_px: u32,
    pub rgb: Vec<u8>,
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("width_px", &self.width_px)
            .field("height_px", &self.height_px)
            .field("bytes", &self.rgb.len())
            .finish()
    }
}

/// What a block draws.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// Large centered title on a shaded band.
    Banner { run: TextRun, fill: Rgb },
    /// Shaded section header bar.
    Header { run: TextRun, fill: Rgb },
    /// Bold field label above a paragraph.
    Label(TextRun),
    /// Wrapped body text.
    Paragraph(TextRun),
    /// A single colored entry, e.g. a recommendation.
    ColoredLine(TextRun),
    /// Underlined-looking link text with a target.
    Link { run: TextRun, url: String },
    Image(ImageData),
}

impl BlockKind {
    /// Text shown by this block, if any.
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Banner { run, .. }
            | Self::Header { run, .. }
            | Self::Label(run)
            | Self::Paragraph(run)
            | Self::ColoredLine(run)
            | Self::Link { run, .. } => Some(run.text()),
            Self::Image(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub frame: Frame,
    pub kind: BlockKind,
}

/// A titled section, or the part of one that landed on a given page.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    /// True when this is the overflow of a section begun on an earlier page.
    pub continued: bool,
    pub blocks: Vec<Block>,
}

/// Page footer, reserved at page creation and filled in at finalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Footer {
    Reserved,
    Text { run: TextRun, frame: Frame },
}

impl Footer {
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Reserved => None,
            Self::Text { run, .. } => Some(run.text()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub sections: Vec<Section>,
    pub footer: Footer,
}

impl Page {
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.sections.iter().flat_map(|s| s.blocks.iter())
    }
}

/// A finalized document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub page_size: PageSize,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All sections in document order, including continuations.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.pages.iter().flat_map(|p| p.sections.iter())
    }

    /// Titles of the sections in order, one entry per section (continuations
    /// are not repeated).
    pub fn section_titles(&self) -> Vec<&str> {
        self.sections()
            .filter(|s| !s.continued)
            .map(|s| s.title.as_str())
            .collect()
    }

    /// Blocks of the section titled `title`, across continuation pages.
    pub fn section_blocks(&self, title: &str) -> Vec<&Block> {
        self.sections()
            .filter(|s| s.title == title)
            .flat_map(|s| s.blocks.iter())
            .collect()
    }

    /// Plain-text rendition of everything on every page, footers included.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for page in &self.pages {
            for block in page.blocks() {
                match block.kind.text() {
                    Some(text) => out.push_str(&text),
                    None => out.push_str("[image]"),
                }
                out.push('\n');
            }
            if let Some(footer) = page.footer.text() {
                out.push_str(&footer);
                out.push('\n');
            }
            out.push('\u{c}');
        }
        out
    }
}
