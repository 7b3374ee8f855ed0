//! Word-wrapping PDF page layout on printpdf.
//!
//! Pages are built as Op lists with builtin Helvetica/Courier fonts. The
//! cursor flows top-down in mm; crossing the bottom margin starts a new
//! page.

use printpdf::{BuiltinFont, Mm, Op, PdfPage, Point, TextItem};

/// A4 page dimensions in mm.
const PAGE_W: Mm = Mm(210.0);
const PAGE_H: Mm = Mm(297.0);

/// Margins in mm.
const MARGIN: f32 = 25.0;

/// Line height multiplier.
const LINE_HEIGHT: f32 = 1.4;

/// Approximate mm per pt.
const MM_PER_PT: f32 = 0.353;

pub const FONT_SIZE_BODY: f32 = 11.0;
pub const FONT_SIZE_H1: f32 = 22.0;
pub const FONT_SIZE_H2: f32 = 18.0;
pub const FONT_SIZE_H3: f32 = 15.0;

/// Fixed metrics for the monospace last-resort layout.
pub const FONT_SIZE_MONO: f32 = 10.0;
pub const MONO_CHARS_PER_LINE: usize = 80;

pub struct PageBuilder {
    pages: Vec<PdfPage>,
    current_ops: Vec<Op>,
    y_pos: f32, // mm from bottom
    chars_per_line: usize,
    in_text: bool,
}

impl PageBuilder {
    /// Builder with a width estimate for proportional body text.
    pub fn new() -> Self {
        let usable_w = 210.0 - 2.0 * MARGIN;
        let chars_per_line = (usable_w / (FONT_SIZE_BODY * 0.5 * MM_PER_PT)) as usize;
        Self::with_chars_per_line(chars_per_line)
    }

    /// Builder with a fixed character budget per line (monospace layout).
    pub fn with_chars_per_line(chars_per_line: usize) -> Self {
        let mut pb = PageBuilder {
            pages: Vec::new(),
            current_ops: Vec::new(),
            y_pos: 297.0 - MARGIN,
            chars_per_line,
            in_text: false,
        };
        pb.start_text();
        pb
    }

    fn start_text(&mut self) {
        if !self.in_text {
            self.current_ops.push(Op::StartTextSection);
            self.in_text = true;
        }
    }

    fn end_text(&mut self) {
        if self.in_text {
            self.current_ops.push(Op::EndTextSection);
            self.in_text = false;
        }
    }

    fn new_page(&mut self) {
        self.end_text();
        let ops = std::mem::take(&mut self.current_ops);
        self.pages.push(PdfPage::new(PAGE_W, PAGE_H, ops));
        self.y_pos = 297.0 - MARGIN;
        self.start_text();
    }

    fn ensure_space(&mut self, needed_mm: f32) {
        if self.y_pos - needed_mm < MARGIN {
            self.new_page();
        }
    }

    /// Extra vertical gap, e.g. for a blank source line.
    pub fn vertical_space(&mut self, font_size: f32) {
        self.y_pos -= font_size * LINE_HEIGHT * MM_PER_PT;
        if self.y_pos < MARGIN {
            self.new_page();
        }
    }

    /// Fixed gap in mm, clamped to the page.
    pub fn gap(&mut self, mm: f32) {
        self.y_pos -= mm;
        if self.y_pos < MARGIN {
            self.new_page();
        }
    }

    pub fn write_line(&mut self, text: &str, font_size: f32, font: BuiltinFont) {
        let line_h = font_size * LINE_HEIGHT * MM_PER_PT;
        self.ensure_space(line_h);

        self.current_ops.push(Op::SetTextCursor {
            pos: Point {
                x: Mm(MARGIN).into(),
                y: Mm(self.y_pos).into(),
            },
        });
        self.current_ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(text.to_string())],
            font,
        });

        self.y_pos -= line_h;
    }

    /// Word-wrap `text` against the line character budget.
    pub fn write_wrapped(&mut self, text: &str, font_size: f32, font: BuiltinFont) {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut line = String::new();

        for word in words {
            if line.len() + word.len() + 1 > self.chars_per_line && !line.is_empty() {
                self.write_line(&line, font_size, font);
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        if !line.is_empty() {
            self.write_line(&line, font_size, font);
        }
    }

    pub fn finish(mut self) -> Vec<PdfPage> {
        self.end_text();
        let ops = std::mem::take(&mut self.current_ops);
        if !ops.is_empty() {
            self.pages.push(PdfPage::new(PAGE_W, PAGE_H, ops));
        }
        self.pages
    }
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}
