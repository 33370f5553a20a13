//! PDF backend: paints a laid-out [`Document`] with `lopdf`.
//!
//! Fonts are the base-14 Helvetica faces with WinAnsiEncoding, so nothing is
//! embedded. Images become FlateDecode RGB XObjects and links become URI
//! annotations over their text.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as PdfDocument, Object, Stream, dictionary};
use tracing::{debug, instrument};

use eksreview_layout::{
    Align, Block, BlockKind, Document, FontFace, Footer, Frame, ImageData, MM_PER_PT, TextRun,
    encode_winansi, text_width_mm,
};
use eksreview_shared::{EksReviewError, Result, Rgb};

const PRODUCER: &str = "eksreview";

/// Horizontal padding inside a text cell, in millimetres.
const CELL_PADDING: f32 = 1.0;

fn pt(mm: f32) -> f32 {
    mm / MM_PER_PT
}

fn real(v: f32) -> Object {
    Object::Real(v)
}

fn font_resource(face: FontFace) -> &'static str {
    match face {
        FontFace::Regular => "F1",
        FontFace::Bold => "F2",
        FontFace::Italic => "F3",
    }
}

fn pdf_err(context: &str, e: impl std::fmt::Display) -> EksReviewError {
    EksReviewError::assembly(format!("{context}: {e}"))
}

/// Encode `doc` as PDF bytes.
#[instrument(skip_all, fields(title = %doc.title, pages = doc.page_count()))]
pub fn render_pdf(doc: &Document) -> Result<Vec<u8>> {
    if doc.pages.is_empty() {
        return Err(EksReviewError::assembly("document has no pages"));
    }

    let mut pdf = PdfDocument::with_version("1.5");
    let pages_id = pdf.new_object_id();

    let mut fonts = Dictionary::new();
    for face in [FontFace::Regular, FontFace::Bold, FontFace::Italic] {
        let font_id = pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font_resource(face), font_id);
    }

    let page_height = doc.page_size.height_mm;
    let media_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        real(pt(doc.page_size.width_mm)),
        real(pt(page_height)),
    ];

    let mut kids: Vec<Object> = Vec::with_capacity(doc.pages.len());
    let mut image_count = 0usize;

    for page in &doc.pages {
        let mut painter = Painter::new(page_height);
        let mut xobjects = Dictionary::new();
        let mut annots: Vec<Object> = Vec::new();

        for block in page.blocks() {
            match &block.kind {
                BlockKind::Image(image) => {
                    image_count += 1;
                    let name = format!("Im{image_count}");
                    let image_id = pdf.add_object(image_xobject(image)?);
                    xobjects.set(name.as_str(), image_id);
                    painter.image(&name, block.frame);
                }
                BlockKind::Link { run, url } => {
                    painter.text(run, block.frame);
                    if is_external(url) {
                        for rect in painter.line_rects(run, block.frame) {
                            annots.push(pdf.add_object(link_annotation(rect, url)).into());
                        }
                    }
                }
                _ => painter.block(block),
            }
        }
        if let Footer::Text { run, frame } = &page.footer {
            painter.text(run, *frame);
        }

        let content = painter
            .finish()
            .encode()
            .map_err(|e| pdf_err("encode page content", e))?;
        let content_id = pdf.add_object(Stream::new(Dictionary::new(), content));

        let mut resources = dictionary! { "Font" => fonts.clone() };
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.clone(),
            "Contents" => content_id,
            "Resources" => resources,
        };
        if !annots.is_empty() {
            page_dict.set("Annots", annots);
        }
        kids.push(pdf.add_object(page_dict).into());
    }

    let count = kids.len() as i64;
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
        }),
    );

    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = pdf.add_object(dictionary! {
        "Title" => Object::string_literal(encode_winansi(&doc.title)),
        "Producer" => Object::string_literal(PRODUCER),
    });
    pdf.trailer.set("Root", catalog_id);
    pdf.trailer.set("Info", info_id);
    pdf.compress();

    let mut bytes = Vec::new();
    pdf.save_to(&mut bytes)
        .map_err(|e| pdf_err("serialize PDF", e))?;
    debug!(bytes = bytes.len(), images = image_count, "PDF encoded");
    Ok(bytes)
}

fn is_external(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

fn link_annotation(rect: [f32; 4], url: &str) -> Dictionary {
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => rect.iter().copied().map(real).collect::<Vec<_>>(),
        "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
        "A" => dictionary! {
            "S" => "URI",
            "URI" => Object::string_literal(url),
        },
    }
}

fn image_xobject(image: &ImageData) -> Result<Stream> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&image.rgb)
        .map_err(|e| pdf_err("compress image", e))?;
    let data = encoder.finish().map_err(|e| pdf_err("compress image", e))?;

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => Object::Integer(i64::from(image.width_px)),
        "Height" => Object::Integer(i64::from(image.height_px)),
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => Object::Integer(8),
        "Filter" => "FlateDecode",
    };
    Ok(Stream::new(dict, data).with_compression(false))
}

// ---------------------------------------------------------------------------
// Content stream painter
// ---------------------------------------------------------------------------

/// Accumulates drawing operations for one page, converting top-left
/// millimetre frames to PDF user space.
struct Painter {
    page_height_mm: f32,
    ops: Vec<Operation>,
}

impl Painter {
    fn new(page_height_mm: f32) -> Self {
        Self {
            page_height_mm,
            ops: Vec::new(),
        }
    }

    fn finish(self) -> Content {
        Content {
            operations: self.ops,
        }
    }

    /// PDF y coordinate of a distance `y_mm` from the top edge.
    fn y(&self, y_mm: f32) -> f32 {
        pt(self.page_height_mm - y_mm)
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(operator, operands));
    }

    fn set_fill(&mut self, color: Rgb) {
        let [r, g, b] = color.unit();
        self.op("rg", vec![real(r), real(g), real(b)]);
    }

    fn block(&mut self, block: &Block) {
        match &block.kind {
            BlockKind::Banner { run, fill } | BlockKind::Header { run, fill } => {
                self.fill_rect(block.frame, *fill);
                self.text(run, block.frame);
            }
            BlockKind::Label(run)
            | BlockKind::Paragraph(run)
            | BlockKind::ColoredLine(run)
            | BlockKind::Link { run, .. } => self.text(run, block.frame),
            BlockKind::Image(_) => {}
        }
    }

    fn fill_rect(&mut self, frame: Frame, color: Rgb) {
        let bottom = self.y(frame.y + frame.height);
        self.op("q", vec![]);
        self.set_fill(color);
        self.op(
            "re",
            vec![
                real(pt(frame.x)),
                real(bottom),
                real(pt(frame.width)),
                real(pt(frame.height)),
            ],
        );
        self.op("f", vec![]);
        self.op("Q", vec![]);
    }

    fn image(&mut self, name: &str, frame: Frame) {
        let bottom = self.y(frame.y + frame.height);
        self.op("q", vec![]);
        self.op(
            "cm",
            vec![
                real(pt(frame.width)),
                real(0.0),
                real(0.0),
                real(pt(frame.height)),
                real(pt(frame.x)),
                real(bottom),
            ],
        );
        self.op("Do", vec![Object::Name(name.as_bytes().to_vec())]);
        self.op("Q", vec![]);
    }

    /// Left edge of a line within `frame`, in millimetres.
    fn line_x(run: &TextRun, frame: Frame, line: &str) -> f32 {
        match run.align {
            Align::Left => frame.x + CELL_PADDING,
            Align::Center => {
                let width = text_width_mm(line, run.style.face, run.style.size_pt);
                frame.x + (frame.width - width) / 2.0
            }
        }
    }

    /// Baseline of line `index`, vertically centered in its line box.
    fn baseline_mm(run: &TextRun, frame: Frame, index: usize) -> f32 {
        let top = frame.y + run.style.line_height_mm * index as f32;
        top + run.style.line_height_mm / 2.0 + 0.3 * run.style.size_pt * MM_PER_PT
    }

    fn text(&mut self, run: &TextRun, frame: Frame) {
        self.op("BT", vec![]);
        self.op(
            "Tf",
            vec![
                Object::Name(font_resource(run.style.face).as_bytes().to_vec()),
                real(run.style.size_pt),
            ],
        );
        self.set_fill(run.color);
        for (i, line) in run.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let x = pt(Self::line_x(run, frame, line));
            let y = self.y(Self::baseline_mm(run, frame, i));
            // Absolute positioning per line: reset the text matrix.
            self.op(
                "Tm",
                vec![real(1.0), real(0.0), real(0.0), real(1.0), real(x), real(y)],
            );
            self.op("Tj", vec![Object::string_literal(encode_winansi(line))]);
        }
        self.op("ET", vec![]);
    }

    /// Clickable rectangles `[x1, y1, x2, y2]` covering each line of `run`.
    fn line_rects(&self, run: &TextRun, frame: Frame) -> Vec<[f32; 4]> {
        run.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| !line.is_empty())
            .map(|(i, line)| {
                let x = Self::line_x(run, frame, line);
                let width = text_width_mm(line, run.style.face, run.style.size_pt);
                let top = frame.y + run.style.line_height_mm * i as f32;
                let bottom = top + run.style.line_height_mm;
                [pt(x), self.y(bottom), pt(x + width), self.y(top)]
            })
            .collect()
    }
}
