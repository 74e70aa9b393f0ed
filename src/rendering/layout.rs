//! Layout primitives for the A4 receipt page
//!
//! Everything here works in millimeters with y measured from the page
//! top (matching how the layout was designed); conversion to the PDF's
//! bottom-up axis happens only at draw time via [`from_top`]. The page
//! is laid out in two passes: top-down content advances a vertical
//! cursor, then bottom-anchored elements (signature, observation box)
//! are resolved against the final cursor so they can never overlap what
//! was drawn above them.

use printpdf::Mm;

/// A4 page width in mm
pub const PAGE_W_MM: f32 = 210.0;
/// A4 page height in mm
pub const PAGE_H_MM: f32 = 297.0;
/// Default vertical advance per body text line
pub const LINE_HEIGHT_MM: f32 = 6.0;

const PT_TO_MM: f32 = 0.352_778;
// Average Helvetica glyph advance, as a fraction of the font size.
const AVG_CHAR_EM: f32 = 0.5;

/// A rectangle in page units, y from the top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// A rectangle grouping label/value rows, with an optional border.
/// Constructed and discarded per render; nothing here is persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBox {
    pub rect: Rect,
    pub border: bool,
    pub padding: f32,
}

impl LayoutBox {
    pub fn bordered(rect: Rect) -> Self {
        Self { rect, border: true, padding: 4.0 }
    }

    /// Width available to text inside the padding.
    pub fn content_width(&self) -> f32 {
        (self.rect.w - 2.0 * self.padding).max(0.0)
    }

    /// Left edge of the content area.
    pub fn content_x(&self) -> f32 {
        self.rect.x + self.padding
    }

    /// Baseline of the i-th fixed-offset row inside the box.
    pub fn row_y(&self, row: usize) -> f32 {
        self.rect.y + self.padding + 4.0 + row as f32 * LINE_HEIGHT_MM
    }

    /// Bottom edge, where the cursor continues after the box.
    pub fn bottom(&self) -> f32 {
        self.rect.y + self.rect.h
    }
}

/// Convert a top-down y coordinate to the PDF's bottom-up axis.
pub fn from_top(y: f32) -> Mm {
    Mm(PAGE_H_MM - y)
}

/// Estimated rendered width of `text` at `font_size` points.
///
/// Builtin PDF fonts carry no metrics we can query, so widths are
/// estimated from an average glyph advance; good enough for centering
/// and wrap decisions on a form-like page.
pub fn text_width_mm(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * AVG_CHAR_EM * PT_TO_MM
}

/// Greedy word wrap of `text` into lines no wider than `max_width` mm.
/// Words longer than a full line are emitted on their own line rather
/// than split.
pub fn wrap_text(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let char_w = font_size * AVG_CHAR_EM * PT_TO_MM;
    let chars_per_line = if char_w > 0.0 {
        ((max_width / char_w) as usize).max(1)
    } else {
        1
    };

    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        if !cur.is_empty() && cur.chars().count() + 1 + word.chars().count() > chars_per_line {
            lines.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(word);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

/// Resolve a bottom-anchored element's top edge: the preferred position
/// (measured from the page top), pushed down if the content cursor plus
/// a clearance gap has already passed it.
pub fn anchor_from_bottom(cursor: f32, gap: f32, preferred_top: f32) -> f32 {
    preferred_top.max(cursor + gap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width_and_keeps_words_whole() {
        let lines = wrap_text(
            "este recibo reconhece o pagamento e o recebimento do valor indicado",
            40.0,
            10.0,
        );
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, 10.0) <= 40.0 + 1.0);
            assert!(!line.starts_with(' ') && !line.ends_with(' '));
        }
    }

    #[test]
    fn wrap_of_short_text_is_a_single_line() {
        assert_eq!(wrap_text("Assinatura", 80.0, 10.0), vec!["Assinatura"]);
    }

    #[test]
    fn wrap_of_empty_text_is_empty() {
        assert!(wrap_text("   ", 80.0, 10.0).is_empty());
    }

    #[test]
    fn anchored_element_stays_at_preferred_position_for_short_content() {
        let preferred = PAGE_H_MM - 36.0 - 22.0;
        assert_eq!(anchor_from_bottom(120.0, 16.0, preferred), preferred);
    }

    #[test]
    fn anchored_element_is_pushed_past_a_long_content_cursor() {
        let preferred = PAGE_H_MM - 36.0 - 22.0;
        let cursor = 250.0;
        let top = anchor_from_bottom(cursor, 16.0, preferred);
        assert_eq!(top, cursor + 16.0);
        assert!(top >= preferred);
    }

    #[test]
    fn layout_box_rows_step_by_line_height() {
        let b = LayoutBox::bordered(Rect { x: 18.0, y: 80.0, w: 84.0, h: 38.0 });
        assert_eq!(b.row_y(0), 88.0);
        assert_eq!(b.row_y(1) - b.row_y(0), LINE_HEIGHT_MM);
        assert_eq!(b.bottom(), 118.0);
        assert_eq!(b.content_width(), 76.0);
    }

    #[test]
    fn from_top_flips_the_axis() {
        assert_eq!(from_top(0.0).0, PAGE_H_MM);
        assert_eq!(from_top(PAGE_H_MM).0, 0.0);
    }
}
