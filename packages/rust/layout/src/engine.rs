//! Section layout engine.
//!
//! A flow layout over fixed-size pages: each primitive places its content at
//! the cursor and moves the cursor down. Content that does not fit below the
//! cursor continues on a fresh page inside the same section, without
//! repeating the section header. Footers are reserved when a page is opened
//! and only get their "Page X/N" text in [`LayoutEngine::finalize`], once the
//! total is known.

use std::path::Path;

use tracing::{debug, instrument};

use eksreview_shared::{EksReviewError, Result, Rgb};

use crate::document::{
    Align, Block, BlockKind, Document, Footer, Frame, ImageData, Page, PageSize, Section, TextRun,
    TextStyle,
};
use crate::metrics::{FontFace, sanitize, wrap};

// ---------------------------------------------------------------------------
// Geometry and styles
// ---------------------------------------------------------------------------

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    /// Distance from the bottom edge at which content breaks to a new page.
    pub bottom: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 10.0,
            top: 10.0,
            right: 10.0,
            bottom: 20.0,
        }
    }
}

const BANNER: TextStyle = TextStyle {
    face: FontFace::Bold,
    size_pt: 24.0,
    line_height_mm: 20.0,
};
const HEADER: TextStyle = TextStyle {
    face: FontFace::Bold,
    size_pt: 16.0,
    line_height_mm: 10.0,
};
const LABEL: TextStyle = TextStyle {
    face: FontFace::Bold,
    size_pt: 14.0,
    line_height_mm: 10.0,
};
const SUBLABEL: TextStyle = TextStyle {
    face: FontFace::Bold,
    size_pt: 12.0,
    line_height_mm: 10.0,
};
const BODY: TextStyle = TextStyle {
    face: FontFace::Regular,
    size_pt: 12.0,
    line_height_mm: 10.0,
};
const LEGEND: TextStyle = TextStyle {
    face: FontFace::Regular,
    size_pt: 11.0,
    line_height_mm: 7.0,
};
const FOOTER: TextStyle = TextStyle {
    face: FontFace::Italic,
    size_pt: 8.0,
    line_height_mm: 10.0,
};

/// Footer baseline box sits this far above the bottom edge.
const FOOTER_OFFSET: f32 = 15.0;

/// Emphasis of a standalone label line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSize {
    /// Field labels and timeframe headings.
    Large,
    /// Reference categories.
    Small,
}

/// Size of a plain text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Body,
    /// Compact lines such as the chart legend.
    Compact,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Builds a [`Document`] one primitive at a time.
#[derive(Debug)]
pub struct LayoutEngine {
    title: String,
    page_size: PageSize,
    margins: Margins,
    pages: Vec<Page>,
    /// Cursor, millimetres from the top of the current page.
    y: f32,
    /// Title of the section the cursor is in.
    open_section: Option<String>,
}

impl LayoutEngine {
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_geometry(title, PageSize::A4, Margins::default())
    }

    pub fn with_geometry(title: impl Into<String>, page_size: PageSize, margins: Margins) -> Self {
        Self {
            title: title.into(),
            page_size,
            margins,
            pages: Vec::new(),
            y: margins.top,
            open_section: None,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Cursor position on the current page.
    pub fn cursor_y(&self) -> f32 {
        self.y
    }

    fn content_width(&self) -> f32 {
        self.page_size.width_mm - self.margins.left - self.margins.right
    }

    fn content_height(&self) -> f32 {
        self.page_size.height_mm - self.margins.top - self.margins.bottom
    }

    fn break_y(&self) -> f32 {
        self.page_size.height_mm - self.margins.bottom
    }

    /// Open a new page with a reserved footer. The cursor moves to the top.
    pub fn start_page(&mut self) {
        let number = self.pages.len() + 1;
        self.pages.push(Page {
            number,
            sections: Vec::new(),
            footer: Footer::Reserved,
        });
        self.y = self.margins.top;
        self.open_section = None;
    }

    /// Title banner. Opens a section named after the banner text.
    pub fn banner(&mut self, text: &str) {
        let text = sanitize(text);
        let lines = self.wrap_lines(&text, BANNER);
        let height = BANNER.line_height_mm * lines.len() as f32;
        self.open(text.clone(), height);
        let frame = self.full_width_frame(height);
        self.push(Block {
            frame,
            kind: BlockKind::Banner {
                run: run(lines, BANNER, Rgb::BLACK, Align::Center),
                fill: Rgb::BANNER_FILL,
            },
        });
        self.y += height;
    }

    /// Shaded section header. Starts a new section at the cursor.
    pub fn section_header(&mut self, title: &str) {
        let title = sanitize(title);
        let lines = self.wrap_lines(&title, HEADER);
        let height = HEADER.line_height_mm * lines.len() as f32;
        // Keep the header together with at least one line of its content.
        self.open(title, height + BODY.line_height_mm);
        let frame = self.full_width_frame(height);
        self.push(Block {
            frame,
            kind: BlockKind::Header {
                run: run(lines, HEADER, Rgb::BLACK, Align::Left),
                fill: Rgb::HEADER_FILL,
            },
        });
        self.y += height;
    }

    /// A bold label line.
    pub fn label(&mut self, text: &str, size: LabelSize) {
        let style = match size {
            LabelSize::Large => LABEL,
            LabelSize::Small => SUBLABEL,
        };
        let text = sanitize(text);
        let lines = self.wrap_lines(&text, style);
        let height = style.line_height_mm * lines.len() as f32;
        self.ensure_space(height + BODY.line_height_mm);
        let frame = self.full_width_frame(height);
        self.push(Block {
            frame,
            kind: BlockKind::Label(run(lines, style, Rgb::BLACK, Align::Left)),
        });
        self.y += height;
    }

    /// Wrapped body text in black.
    pub fn paragraph(&mut self, text: &str) {
        self.text(text, TextSize::Body, Rgb::BLACK);
    }

    /// Wrapped text of the given size and color.
    pub fn text(&mut self, text: &str, size: TextSize, color: Rgb) {
        let style = match size {
            TextSize::Body => BODY,
            TextSize::Compact => LEGEND,
        };
        self.flow(text, style, color, BlockKind::Paragraph);
    }

    /// `label:` followed by `body`. Blank bodies place nothing at all and
    /// return `false`.
    pub fn labeled_block(&mut self, label: &str, body: &str) -> bool {
        if body.trim().is_empty() {
            return false;
        }
        self.label(&format!("{label}:"), LabelSize::Large);
        self.paragraph(body.trim_end());
        true
    }

    /// A single entry drawn in `color`, wrapped if it is long.
    pub fn colored_line(&mut self, text: &str, color: Rgb) {
        self.flow(text, BODY, color, BlockKind::ColoredLine);
    }

    /// Link text pointing at `url`.
    pub fn link(&mut self, text: &str, url: &str) {
        let url = url.to_string();
        self.flow(text, BODY, Rgb::LINK_BLUE, move |run| BlockKind::Link {
            run,
            url: url.clone(),
        });
    }

    /// Vertical gap. Never breaks the page by itself.
    pub fn space(&mut self, mm: f32) {
        self.y += mm;
    }

    /// Place the image at `path` at the left margin, `width_mm` wide, keeping
    /// its aspect ratio. Images taller than a page are scaled to fit.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn embed_image(&mut self, path: &Path, width_mm: f32) -> Result<()> {
        let decoded = image::open(path)
            .map_err(|e| {
                EksReviewError::assembly(format!("cannot embed image {}: {e}", path.display()))
            })?
            .to_rgb8();
        let (width_px, height_px) = decoded.dimensions();
        if width_px == 0 || height_px == 0 {
            return Err(EksReviewError::assembly(format!(
                "image {} has no pixels",
                path.display()
            )));
        }

        let aspect = height_px as f32 / width_px as f32;
        let mut width = width_mm.min(self.content_width());
        let mut height = width * aspect;
        if height > self.content_height() {
            height = self.content_height();
            width = height / aspect;
        }

        self.ensure_space(height);
        let frame = Frame {
            x: self.margins.left,
            y: self.y,
            width,
            height,
        };
        self.push(Block {
            frame,
            kind: BlockKind::Image(ImageData {
                width_px,
                height_px,
                rgb: decoded.into_raw(),
            }),
        });
        self.y += height;
        debug!(width, height, "image placed");
        Ok(())
    }

    /// Resolve every footer to "Page X/N" and hand back the document.
    pub fn finalize(mut self) -> Document {
        let total = self.pages.len();
        let frame = Frame {
            x: self.margins.left,
            y: self.page_size.height_mm - FOOTER_OFFSET,
            width: self.content_width(),
            height: FOOTER.line_height_mm,
        };
        for page in &mut self.pages {
            page.footer = Footer::Text {
                run: run(
                    vec![format!("Page {}/{}", page.number, total)],
                    FOOTER,
                    Rgb::BLACK,
                    Align::Center,
                ),
                frame,
            };
        }
        debug!(pages = total, "layout finalized");
        Document {
            title: self.title,
            page_size: self.page_size,
            pages: self.pages,
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn wrap_lines(&self, text: &str, style: TextStyle) -> Vec<String> {
        wrap(text, style.face, style.size_pt, self.content_width())
    }

    fn full_width_frame(&self, height: f32) -> Frame {
        Frame {
            x: self.margins.left,
            y: self.y,
            width: self.content_width(),
            height,
        }
    }

    /// Start a section, breaking the page first if `needed` would not fit.
    fn open(&mut self, title: String, needed: f32) {
        self.ensure_page();
        if self.overflows(needed) {
            self.break_page(false);
        }
        self.current_page().sections.push(Section {
            title: title.clone(),
            continued: false,
            blocks: Vec::new(),
        });
        self.open_section = Some(title);
    }

    fn ensure_page(&mut self) {
        if self.pages.is_empty() {
            self.start_page();
        }
    }

    /// True when `height` would cross the break line and the page already
    /// holds something. An empty page accepts anything.
    fn overflows(&self, height: f32) -> bool {
        let page_used = self.y > self.margins.top + f32::EPSILON;
        page_used && self.y + height > self.break_y()
    }

    fn ensure_space(&mut self, height: f32) {
        self.ensure_page();
        if self.overflows(height) {
            self.break_page(true);
        }
    }

    /// Move to a fresh page. With `continue_section`, the open section
    /// carries on there without a header.
    fn break_page(&mut self, continue_section: bool) {
        let carried = if continue_section {
            self.open_section.clone()
        } else {
            None
        };
        self.start_page();
        if let Some(title) = carried {
            debug!(section = %title, page = self.pages.len(), "section continues on new page");
            self.current_page().sections.push(Section {
                title: title.clone(),
                continued: true,
                blocks: Vec::new(),
            });
            self.open_section = Some(title);
        }
    }

    fn current_page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.start_page();
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn push(&mut self, block: Block) {
        let page = self.current_page();
        if page.sections.is_empty() {
            page.sections.push(Section {
                title: String::new(),
                continued: false,
                blocks: Vec::new(),
            });
        }
        if let Some(section) = page.sections.last_mut() {
            section.blocks.push(block);
        }
    }

    /// Place wrapped text line by line, splitting it into one block per page
    /// when it runs past the break line.
    fn flow<F>(&mut self, text: &str, style: TextStyle, color: Rgb, make: F)
    where
        F: Fn(TextRun) -> BlockKind,
    {
        let text = sanitize(text);
        let lines = self.wrap_lines(&text, style);
        self.ensure_page();

        let mut pending: Vec<String> = Vec::new();
        let mut top = self.y;
        for line in lines {
            if self.overflows(style.line_height_mm) {
                if !pending.is_empty() {
                    let block = self.text_block(top, std::mem::take(&mut pending), style, color, &make);
                    self.push(block);
                }
                self.break_page(true);
            }
            if pending.is_empty() {
                top = self.y;
            }
            pending.push(line);
            self.y += style.line_height_mm;
        }
        if !pending.is_empty() {
            let block = self.text_block(top, pending, style, color, &make);
            self.push(block);
        }
    }

    fn text_block<F>(
        &self,
        top: f32,
        lines: Vec<String>,
        style: TextStyle,
        color: Rgb,
        make: &F,
    ) -> Block
    where
        F: Fn(TextRun) -> BlockKind,
    {
        let frame = Frame {
            x: self.margins.left,
            y: top,
            width: self.content_width(),
            height: style.line_height_mm * lines.len() as f32,
        };
        Block {
            frame,
            kind: make(run(lines, style, color, Align::Left)),
        }
    }
}

fn run(lines: Vec<String>, style: TextStyle, color: Rgb, align: Align) -> TextRun {
    TextRun {
        lines,
        style,
        color,
        align,
    }
}
