//! Markdown to PDF for summaries too long to send inline.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] printpdf::Error),
}

// US Letter with one-inch margins.
const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 25.4;
const PT_TO_MM: f32 = 0.352_778;
const LEADING: f32 = 1.45;

const BODY_SIZE: f32 = 11.0;
const H1_SIZE: f32 = 16.0;
const H2_SIZE: f32 = 14.0;
const H3_SIZE: f32 = 12.0;

/// Render markdown into PDF bytes.
///
/// Headings, bullets and paragraphs are laid out with a greedy word wrap;
/// inline emphasis markers are dropped since the builtin fonts cannot switch
/// weight mid-line.
pub fn markdown_to_pdf(markdown: &str, title: &str) -> Result<Vec<u8>, RenderError> {
    let (doc, page, layer) = PdfDocument::new(
        title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut writer = PageWriter {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        cursor_y: PAGE_HEIGHT_MM - MARGIN_MM,
    };

    for raw in markdown.split('\n') {
        let line = raw.trim();
        if line.is_empty() {
            writer.space(2.5);
        } else if let Some(text) = line.strip_prefix("### ") {
            writer.heading(text, H3_SIZE, &bold);
        } else if let Some(text) = line.strip_prefix("## ") {
            writer.heading(text, H2_SIZE, &bold);
        } else if let Some(text) = line.strip_prefix("# ") {
            writer.heading(text, H1_SIZE, &bold);
        } else if let Some(content) = bullet_content(line) {
            writer.bullet(&strip_inline_markers(content), &regular);
        } else {
            writer.paragraph(&strip_inline_markers(line), &regular);
        }
    }

    doc.save_to_bytes().map_err(RenderError::from)
}

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    cursor_y: f32,
}

impl PageWriter<'_> {
    fn heading(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        self.space(size * 0.25 * PT_TO_MM + 2.0);
        for line in wrap_text(text, chars_per_line(size)) {
            self.write_line(&line, size, font, 0.0);
        }
        self.space(1.2);
    }

    fn paragraph(&mut self, text: &str, font: &IndirectFontRef) {
        for line in wrap_text(text, chars_per_line(BODY_SIZE)) {
            self.write_line(&line, BODY_SIZE, font, 0.0);
        }
        self.space(1.2);
    }

    fn bullet(&mut self, text: &str, font: &IndirectFontRef) {
        let wrapped = wrap_text(text, chars_per_line(BODY_SIZE).saturating_sub(3));
        for (idx, line) in wrapped.iter().enumerate() {
            if idx == 0 {
                self.write_line(&format!("- {line}"), BODY_SIZE, font, 2.0);
            } else {
                self.write_line(line, BODY_SIZE, font, 6.0);
            }
        }
        self.space(0.8);
    }

    fn write_line(&mut self, text: &str, size: f32, font: &IndirectFontRef, indent: f32) {
        let line_height = size * LEADING * PT_TO_MM;
        self.ensure_room(line_height);
        self.cursor_y -= line_height;
        self.layer
            .use_text(text, size, Mm(MARGIN_MM + indent), Mm(self.cursor_y), font);
    }

    fn ensure_room(&mut self, needed: f32) {
        if self.cursor_y - needed < MARGIN_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.cursor_y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
    }

    fn space(&mut self, mm: f32) {
        self.cursor_y = (self.cursor_y - mm).max(MARGIN_MM);
    }
}

fn bullet_content(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('-').or_else(|| line.strip_prefix('*'))?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn strip_inline_markers(text: &str) -> String {
    text.replace("**", "").replace("__", "")
}

/// Approximate capacity of one line, assuming an average glyph is half an em.
fn chars_per_line(size: f32) -> usize {
    let content_width_pt = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / PT_TO_MM;
    (content_width_pt / (size * 0.5)) as usize
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    for word in text.split_whitespace() {
        for piece in chunk_word(word, max) {
            let piece_len = piece.chars().count();
            let needed = if current_len == 0 {
                piece_len
            } else {
                current_len + 1 + piece_len
            };
            if needed > max && current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(piece);
            current_len += piece_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn chunk_word(word: &str, max: usize) -> Vec<&str> {
    if word.chars().count() <= max {
        return vec![word];
    }
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in word.char_indices() {
        if count == max {
            chunks.push(&word[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    chunks.push(&word[start..]);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text("aaa bbb ccc", 7),
            vec!["aaa bbb".to_string(), "ccc".to_string()]
        );
    }

    #[test]
    fn splits_words_longer_than_a_line() {
        assert_eq!(
            wrap_text("abcdefghij", 4),
            vec!["abcd".to_string(), "efgh".to_string(), "ij".to_string()]
        );
    }

    #[test]
    fn renders_pdf_bytes() {
        let bytes = markdown_to_pdf("# Summary\n\n* **Key:** value\n\nBody text.", "Weekly recap")
            .expect("render should succeed");
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn paginates_long_documents() {
        let long = "A line of body text that should wrap and fill pages.\n".repeat(200);
        let bytes = markdown_to_pdf(&long, "Long recap").expect("render should succeed");
        let short = markdown_to_pdf("one line", "Short recap").expect("render should succeed");
        assert!(bytes.len() > short.len());
    }
}
