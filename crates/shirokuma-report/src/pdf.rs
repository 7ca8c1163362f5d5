// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A4 PDF rendering via `printpdf`.
//!
//! Japanese text needs an embedded TrueType font (`assets.font_path`); the
//! built-in Helvetica fallback only covers Latin text.

use std::io::{BufWriter, Cursor};
use std::path::Path;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use shirokuma_core::error::ShirokumaError;
use shirokuma_core::traits::{PluginAdapter, ReportRenderer};
use shirokuma_core::types::{AdapterType, RenderedReport, ReportDocument};

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN_X: f32 = 20.0;
const TOP_Y: f32 = 277.0;
const BOTTOM_Y: f32 = 20.0;

const TITLE_SIZE: f32 = 16.0;
const SUMMARY_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 11.0;

/// Width units per line. A full-width character counts two units.
const SUMMARY_UNITS: usize = 90;
const BODY_UNITS: usize = 82;

#[derive(Debug, Clone)]
enum FontSource {
    Builtin,
    External(Vec<u8>),
}

/// Renders [`ReportDocument`]s into PDF bytes.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    font: FontSource,
}

impl PdfRenderer {
    /// Renderer using the built-in Helvetica font.
    pub fn builtin() -> Self {
        Self {
            font: FontSource::Builtin,
        }
    }

    /// Renderer embedding the TrueType font at `path`.
    pub fn with_font_file(path: &Path) -> Result<Self, ShirokumaError> {
        let bytes = std::fs::read(path).map_err(|e| ShirokumaError::Asset {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            font: FontSource::External(bytes),
        })
    }

    /// Builds the renderer from the optional configured font path.
    pub fn from_font_path(path: Option<&str>) -> Result<Self, ShirokumaError> {
        match path.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => Self::with_font_file(Path::new(p)),
            None => {
                tracing::warn!("assets.font_path not set, PDF reports fall back to Helvetica");
                Ok(Self::builtin())
            }
        }
    }

    pub fn embeds_font(&self) -> bool {
        matches!(self.font, FontSource::External(_))
    }

    fn load_font(&self, doc: &PdfDocumentReference) -> Result<IndirectFontRef, ShirokumaError> {
        let result = match &self.font {
            FontSource::Builtin => doc.add_builtin_font(BuiltinFont::Helvetica),
            FontSource::External(bytes) => doc.add_external_font(Cursor::new(bytes.as_slice())),
        };
        result.map_err(|e| ShirokumaError::Report(format!("PDF font error: {e}")))
    }
}

/// Tracks the write position and adds pages as the text runs down.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    font: &'a IndirectFontRef,
    y: f32,
    pages: usize,
}

impl PageWriter<'_> {
    fn line(&mut self, text: &str, size: f32, height: f32) {
        if self.y - height < BOTTOM_Y {
            let (page, layer) = self.doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP_Y;
            self.pages += 1;
        }
        self.y -= height;
        if !text.is_empty() {
            self.layer
                .use_text(text, size, Mm(MARGIN_X), Mm(self.y), self.font);
        }
    }

    fn paragraph(&mut self, text: &str, size: f32, units: usize, height: f32) {
        for raw in text.lines() {
            for line in wrap_line(raw, units) {
                self.line(&line, size, height);
            }
        }
    }
}

#[async_trait::async_trait]
impl PluginAdapter for PdfRenderer {
    fn name(&self) -> &str {
        "printpdf"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Renderer
    }
}

impl ReportRenderer for PdfRenderer {
    fn render(&self, document: &ReportDocument) -> Result<RenderedReport, ShirokumaError> {
        let (doc, page1, layer1) =
            PdfDocument::new(&document.title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
        let font = self.load_font(&doc)?;

        let pages = {
            let mut writer = PageWriter {
                doc: &doc,
                layer: doc.get_page(page1).get_layer(layer1),
                font: &font,
                y: TOP_Y + 5.0,
                pages: 1,
            };

            writer.line(&document.title, TITLE_SIZE, 10.0);
            writer.line("", BODY_SIZE, 4.0);

            if !document.summary.trim().is_empty() {
                writer.paragraph(&document.summary, SUMMARY_SIZE, SUMMARY_UNITS, 5.5);
                writer.line("", BODY_SIZE, 6.0);
            }

            writer.paragraph(&document.body, BODY_SIZE, BODY_UNITS, 6.5);
            writer.pages
        };

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| ShirokumaError::Report(format!("PDF save error: {e}")))?;
        let bytes = buf
            .into_inner()
            .map_err(|e| ShirokumaError::Report(format!("PDF buffer error: {e}")))?;

        tracing::debug!(file = %document.file_name, pages, bytes = bytes.len(), "report rendered");
        Ok(RenderedReport {
            file_name: document.file_name.clone(),
            bytes,
        })
    }
}

/// Splits one line of text so that no piece exceeds `max_units`.
///
/// ASCII characters count one unit, everything else two. Latin words are
/// kept whole where possible; Japanese text breaks between any characters.
pub fn wrap_line(text: &str, max_units: usize) -> Vec<String> {
    let max_units = max_units.max(2);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut used = 0;

    for token in tokens(text) {
        let width: usize = token.chars().map(char_units).sum();
        if used + width > max_units && !current.is_empty() {
            lines.push(std::mem::take(&mut current).trim_end().to_string());
            used = 0;
            if token == " " {
                continue;
            }
        }
        if width > max_units {
            // A single word longer than a line is hard-broken.
            for c in token.chars() {
                let w = char_units(c);
                if used + w > max_units {
                    lines.push(std::mem::take(&mut current));
                    used = 0;
                }
                current.push(c);
                used += w;
            }
            continue;
        }
        current.push_str(token);
        used += width;
    }

    if !current.trim().is_empty() || lines.is_empty() {
        lines.push(current.trim_end().to_string());
    }
    lines
}

fn char_units(c: char) -> usize {
    if c.is_ascii() { 1 } else { 2 }
}

/// Latin words, single spaces, and individual non-ASCII characters.
fn tokens(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        if c.is_ascii() && !c.is_ascii_whitespace() {
            start.get_or_insert(i);
            continue;
        }
        if let Some(s) = start.take() {
            out.push(&text[s..i]);
        }
        out.push(&text[i..i + c.len_utf8()]);
    }
    if let Some(s) = start {
        out.push(&text[s..]);
    }
    out
}
