//! PDF rendering with printpdf's built-in Helvetica.
//!
//! A4, 15mm margins, 12pt body. Lines are wrapped with the static width table
//! in `font_metrics` and a new page starts when the cursor reaches the bottom margin.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::export::font_metrics::wrap_line;
use crate::export::{classify_line, strip_inline_markup, Block, ExportError};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const TEXT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

const BODY_SIZE_PT: f32 = 12.0;
const LINE_HEIGHT_MM: f32 = 6.0;
const BLANK_LINE_MM: f32 = 5.0;

/// Heading font sizes, indexed by level - 1.
const HEADING_SIZES_PT: [f32; 2] = [16.0, 14.0];

const LAYER_NAME: &str = "Layer 1";

struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Baseline of the next line, measured from the bottom edge.
    y: f32,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, ExportError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        })
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height >= MARGIN_MM {
            return;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT_MM - MARGIN_MM;
    }

    fn write_line(&mut self, text: &str, size_pt: f32, bold: bool) {
        let height = LINE_HEIGHT_MM * size_pt / BODY_SIZE_PT;
        self.ensure_room(height);
        self.y -= height;
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size_pt, Mm(MARGIN_MM), Mm(self.y), font);
    }

    fn skip(&mut self, height: f32) {
        self.ensure_room(height);
        self.y -= height;
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| ExportError::Pdf(e.to_string()))
    }
}

pub fn to_pdf(title: &str, text: &str) -> Result<Vec<u8>, ExportError> {
    let mut writer = PageWriter::new(title)?;

    for line in text.lines() {
        match classify_line(line) {
            Block::Blank => writer.skip(BLANK_LINE_MM),
            Block::Heading(level, heading) => {
                let size = HEADING_SIZES_PT[usize::from(level.clamp(1, 2)) - 1];
                let heading = to_latin(&strip_inline_markup(heading));
                for wrapped in wrap_line(&heading, size, true, TEXT_WIDTH_MM) {
                    writer.write_line(&wrapped, size, true);
                }
            }
            Block::Text(body) => {
                let body = to_latin(&strip_inline_markup(body));
                for wrapped in wrap_line(&body, BODY_SIZE_PT, false, TEXT_WIDTH_MM) {
                    writer.write_line(&wrapped, BODY_SIZE_PT, false);
                }
            }
        }
    }

    writer.finish()
}

/// Maps typographic punctuation to ASCII. Built-in PDF fonts only cover a
/// single-byte encoding; anything else becomes `?`.
fn to_latin(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2022}' | '\u{25CF}' | '\u{25AA}' | '\u{00B7}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\t' => out.push(' '),
            c if c.is_ascii() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}
