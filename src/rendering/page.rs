//! Page layout renderer
//!
//! Assembles the single fixed-size A4 receipt page: letterhead
//! background, title, bordered identity/metadata boxes, event box, a
//! one-row item table, the reference/amount summary and the
//! bottom-anchored footer. Only a failure to finalize the PDF itself is
//! fatal; a missing or broken letterhead is logged and the page renders
//! on a blank background.

use std::path::Path;

use chrono::{Local, NaiveDate};
use image::{DynamicImage, Rgba, RgbaImage};
use log::warn;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};

use crate::currency::{format_brl, parse_brl};
use crate::error::Result;
use crate::letterhead::{self, A4_CANVAS_H, A4_CANVAS_W};
use crate::narrative::{NF_NOTE_LABEL, NF_NOTE_TEXT};
use crate::rendering::layout::{
    anchor_from_bottom, from_top, text_width_mm, wrap_text, LayoutBox, Rect, LINE_HEIGHT_MM,
    PAGE_H_MM, PAGE_W_MM,
};
use crate::rendering::RenderedDocument;
use crate::taxes::compute_taxes;
use crate::{Receipt, RenderConfig};

const TITLE: &str = "RECIBO DE PAGAMENTO";
const FIELD_FILLER: &str = "__________";

// Column shares of the item table (description, qty, unit, total).
const TABLE_COLS: [f32; 4] = [0.55, 0.10, 0.175, 0.175];

// The letterhead canvas is 1240x1754 which at 150 DPI is exactly A4,
// so a plain dpi transform gives a full-bleed placement.
const LETTERHEAD_DPI: f32 = 150.0;

// Observation box: bottom edge anchored this fraction of the page
// height above the bottom edge.
const OBS_BOTTOM_FRAC: f32 = 0.04;

/// Render the full receipt page and serialize it to PDF bytes.
///
/// `letterhead` is loaded and normalized asynchronously; any failure
/// there is non-fatal. The receipt itself is never mutated.
pub async fn render_receipt_pdf(
    receipt: &Receipt,
    letterhead: Option<&Path>,
    config: &RenderConfig,
) -> Result<RenderedDocument> {
    config.validate()?;

    let background = match letterhead {
        Some(path) => match letterhead::load_normalized(path, config.fit).await {
            Ok(img) => Some(img),
            Err(e) => {
                warn!("rendering without background: {e}");
                None
            }
        },
        None => None,
    };

    let (doc, page_idx, layer_idx) =
        PdfDocument::new(TITLE, Mm(PAGE_W_MM), Mm(PAGE_H_MM), "Layer 1");
    let layer = doc.get_page(page_idx).get_layer(layer_idx);

    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    if let Some(bg) = background {
        add_background(&layer, bg);
    }

    draw_content(&layer, &font, &bold, receipt, config);

    let mut writer = std::io::BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| crate::Error::Artifact(e.to_string()))?;
    Ok(RenderedDocument::new(bytes))
}

/// Flatten the (possibly letterboxed) canvas onto white and embed it
/// full-bleed. PDF pages have no alpha, so transparent canvas areas
/// must become paper white rather than black.
fn add_background(layer: &PdfLayerReference, bg: DynamicImage) {
    let mut flat = RgbaImage::from_pixel(A4_CANVAS_W, A4_CANVAS_H, Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut flat, &bg.to_rgba8(), 0, 0);
    let rgb = DynamicImage::ImageRgba8(flat).to_rgb8();

    let image = printpdf::Image::from_dynamic_image(&DynamicImage::ImageRgb8(rgb));
    image.add_to_layer(
        layer.clone(),
        printpdf::ImageTransform {
            dpi: Some(LETTERHEAD_DPI),
            ..Default::default()
        },
    );
}

fn draw_content(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
    receipt: &Receipt,
    config: &RenderConfig,
) {
    let sa = &config.safe_area;
    let top = sa.top * PAGE_H_MM;
    let bottom = sa.bottom * PAGE_H_MM;
    let left = sa.left * PAGE_W_MM;
    let right = sa.right * PAGE_W_MM;
    let content_w = PAGE_W_MM - left - right;

    let gross = parse_brl(&receipt.value).unwrap_or(0.0);
    let gross_fmt = match parse_brl(&receipt.value) {
        Some(n) => format_brl(n),
        // Unparsable input stays visible verbatim.
        None => receipt.value.clone(),
    };
    let summary = compute_taxes(gross, receipt.enable_taxes, receipt.taxes.as_ref());

    layer.set_outline_color(Color::Rgb(Rgb::new(0.25, 0.25, 0.25, None)));
    layer.set_outline_thickness(0.4);

    // Title, centered in the safe area.
    let mut cursor = top + 6.0;
    let title_x = (PAGE_W_MM - text_width_mm(TITLE, 14.0)) / 2.0;
    layer.use_text(TITLE, 14.0, Mm(title_x), from_top(cursor), bold);
    cursor += 10.0;

    // Side-by-side identity boxes: payee on the left, receipt/payment
    // metadata on the right.
    let gutter = 6.0;
    let box_w = (content_w - gutter) / 2.0;
    let box_h = 4.0 + 4.0 + 5.0 * LINE_HEIGHT_MM;

    let payee_box = LayoutBox::bordered(Rect { x: left, y: cursor, w: box_w, h: box_h });
    draw_box(layer, &payee_box);
    draw_heading(layer, bold, &payee_box, "RECEBEDOR");
    let rows = [
        ("Nome", or_filler(receipt.payee())),
        ("CPF/CNPJ", or_filler(receipt.payee_cpf_cnpj.as_deref())),
        ("Endereço", or_filler(receipt.payee_address.as_deref())),
        ("Cidade/UF", city_state(receipt.payee_city.as_deref(), receipt.payee_state.as_deref())),
    ];
    draw_rows(layer, font, bold, &payee_box, &rows);

    let meta_box = LayoutBox::bordered(Rect {
        x: left + box_w + gutter,
        y: cursor,
        w: box_w,
        h: box_h,
    });
    draw_box(layer, &meta_box);
    draw_heading(layer, bold, &meta_box, "RECIBO");
    let rows = [
        ("Número", or_filler(receipt.receipt_number.as_deref())),
        ("Emissão", date_or_filler(receipt.issue_date.as_deref())),
        ("Pagamento", or_filler(receipt.payment_method.as_deref())),
        ("Data pgto.", date_or_filler(receipt.payment_date.as_deref())),
    ];
    draw_rows(layer, font, bold, &meta_box, &rows);

    cursor = payee_box.bottom() + 5.0;

    // Full-width event box.
    let event_h = 4.0 + 4.0 + 3.0 * LINE_HEIGHT_MM;
    let event_box = LayoutBox::bordered(Rect { x: left, y: cursor, w: content_w, h: event_h });
    draw_box(layer, &event_box);
    draw_heading(layer, bold, &event_box, "EVENTO");
    let x = event_box.content_x();
    let y = event_box.row_y(1);
    draw_pair(layer, font, bold, x, y, "Evento", &or_filler(receipt.event_name.as_deref()));
    draw_pair(layer, font, bold, x + 88.0, y, "Data", &date_or_filler(receipt.event_date.as_deref()));
    draw_pair(
        layer, font, bold, x + 125.0, y,
        "Horário",
        &format!(
            "das {} às {}",
            or_time_filler(receipt.start_time.as_deref()),
            or_time_filler(receipt.end_time.as_deref())
        ),
    );
    let y = event_box.row_y(2);
    draw_pair(layer, font, bold, x, y, "Local", &or_filler(receipt.event_location.as_deref()));
    draw_pair(layer, font, bold, x + 88.0, y, "Cidade", &or_filler(receipt.city.as_deref()));

    cursor = event_box.bottom() + 5.0;

    // One-row item table.
    cursor = draw_item_table(layer, font, bold, receipt, &gross_fmt, left, content_w, cursor);
    cursor += 6.0;

    // Two-column summary: references left, amounts right.
    cursor = draw_summary(layer, font, bold, receipt, &summary, &gross_fmt, left, content_w, cursor);

    // Bottom-anchored footer resolved last, clamped against the cursor:
    // city/date closing line, then the centered signature rule.
    let footer_top = anchor_from_bottom(cursor, 10.0, PAGE_H_MM - bottom - 30.0);
    let closing = footer_closing(receipt, Local::now().date_naive());
    let closing_x = (PAGE_W_MM - text_width_mm(&closing, 10.0)) / 2.0;
    layer.use_text(closing, 10.0, Mm(closing_x), from_top(footer_top), font);

    let sig_top = footer_top + 8.0;
    let sig_w = 80.0;
    let sig_x = (PAGE_W_MM - sig_w) / 2.0;
    draw_segment(layer, sig_x, sig_top, sig_x + sig_w, sig_top);
    let caption_y = sig_top + LINE_HEIGHT_MM;
    let caption_x = (PAGE_W_MM - text_width_mm("Assinatura", 10.0)) / 2.0;
    layer.use_text("Assinatura", 10.0, Mm(caption_x), from_top(caption_y), font);

    if receipt.nf_note_enabled() {
        draw_observation_box(layer, font, bold, caption_y + 2.0);
    }
}

/// Closing line above the signature rule: the receipt's city plus the
/// date the document is being produced.
fn footer_closing(receipt: &Receipt, today: NaiveDate) -> String {
    format!(
        "{}, {}",
        or_filler(receipt.city.as_deref()),
        today.format("%d/%m/%Y")
    )
}

fn or_filler(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => FIELD_FILLER.to_string(),
    }
}

fn or_time_filler(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "__:__".to_string(),
    }
}

fn date_or_filler(value: Option<&str>) -> String {
    value
        .and_then(crate::narrative::parse_date_br)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "____/____/____".to_string())
}

fn city_state(city: Option<&str>, state: Option<&str>) -> String {
    match (city.map(str::trim), state.map(str::trim)) {
        (Some(c), Some(uf)) if !c.is_empty() && !uf.is_empty() => format!("{c}/{uf}"),
        (Some(c), _) if !c.is_empty() => c.to_string(),
        _ => FIELD_FILLER.to_string(),
    }
}

fn draw_heading(layer: &PdfLayerReference, bold: &IndirectFontRef, lb: &LayoutBox, text: &str) {
    layer.use_text(text, 10.0, Mm(lb.content_x()), from_top(lb.row_y(0)), bold);
}

/// Fixed-offset label/value rows inside a bordered box, one per line.
/// Values too long for the row's remaining width are clipped with a
/// trailing ellipsis so the cut stays visible.
fn draw_rows(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
    lb: &LayoutBox,
    rows: &[(&str, String)],
) {
    let label_w = 24.0;
    for (i, (label, value)) in rows.iter().enumerate() {
        let y = lb.row_y(i + 1);
        layer.use_text(*label, 8.5, Mm(lb.content_x()), from_top(y), bold);
        let value_w = lb.content_width() - label_w;
        let shown = clip_row_value(value, value_w, 9.5);
        layer.use_text(shown, 9.5, Mm(lb.content_x() + label_w), from_top(y), font);
    }
}

/// Fit a row value onto a single line. A value that would wrap is re-fit
/// with room reserved for `...` and the first line is shown with that
/// suffix.
fn clip_row_value(value: &str, max_w: f32, font_size: f32) -> String {
    let mut lines = wrap_text(value, max_w, font_size);
    if lines.len() <= 1 {
        return lines.pop().unwrap_or_else(|| FIELD_FILLER.to_string());
    }
    let head_w = (max_w - text_width_mm("...", font_size)).max(1.0);
    let head = wrap_text(value, head_w, font_size)
        .into_iter()
        .next()
        .unwrap_or_default();
    format!("{head}...")
}

fn draw_pair(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
    x: f32,
    y: f32,
    label: &str,
    value: &str,
) {
    layer.use_text(label, 8.5, Mm(x), from_top(y), bold);
    let offset = text_width_mm(label, 8.5) + 2.0;
    layer.use_text(value, 9.5, Mm(x + offset), from_top(y), font);
}

/// Header + single data row with proportional columns and vertical
/// separators spanning both. Returns the cursor below the table. The
/// description cell wraps, growing the data row before anything below
/// computes its anchor.
fn draw_item_table(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
    receipt: &Receipt,
    gross_fmt: &str,
    left: f32,
    content_w: f32,
    y: f32,
) -> f32 {
    let header_h = 7.0;
    let pad = 2.0;

    let desc = or_filler(receipt.job_description.as_deref());
    let desc_w = content_w * TABLE_COLS[0] - 2.0 * pad;
    let desc_lines = wrap_text(&desc, desc_w, 9.5);
    let row_h = (desc_lines.len().max(1) as f32 * 5.0 + 3.0).max(8.0);

    // Column x positions (left edges), then the table's right edge.
    let mut edges = vec![left];
    let mut acc = left;
    for share in TABLE_COLS {
        acc += content_w * share;
        edges.push(acc);
    }

    // Horizontal rules: top, under the header, bottom.
    let bottom_y = y + header_h + row_h;
    draw_segment(layer, left, y, left + content_w, y);
    draw_segment(layer, left, y + header_h, left + content_w, y + header_h);
    draw_segment(layer, left, bottom_y, left + content_w, bottom_y);
    // Vertical separators spanning header + row.
    for x in &edges {
        draw_segment(layer, *x, y, *x, bottom_y);
    }

    let header_y = y + 5.0;
    for (i, label) in ["Descrição", "Qtd", "Unitário", "Total"].iter().enumerate() {
        layer.use_text(*label, 9.0, Mm(edges[i] + pad), from_top(header_y), bold);
    }

    let mut line_y = y + header_h + 4.5;
    for line in desc_lines.iter().take(4) {
        layer.use_text(line.as_str(), 9.5, Mm(edges[0] + pad), from_top(line_y), font);
        line_y += 5.0;
    }
    let row_y = y + header_h + 4.5;
    layer.use_text("1", 9.5, Mm(edges[1] + pad), from_top(row_y), font);
    layer.use_text(format!("R$ {gross_fmt}"), 9.5, Mm(edges[2] + pad), from_top(row_y), font);
    layer.use_text(format!("R$ {gross_fmt}"), 9.5, Mm(edges[3] + pad), from_top(row_y), font);

    bottom_y
}

/// Left column: present reference fields. Right column: gross, the
/// non-zero deduction lines negated with a `(-)` prefix, and the bold
/// net total (equal to the gross when deductions are disabled).
#[allow(clippy::too_many_arguments)]
fn draw_summary(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
    receipt: &Receipt,
    summary: &crate::taxes::TaxSummary,
    gross_fmt: &str,
    left: f32,
    content_w: f32,
    y: f32,
) -> f32 {
    let mut left_y = y;
    let refs = [
        ("PO/OS", receipt.purchase_order.as_deref()),
        ("Centro de Custo", receipt.cost_center.as_deref()),
        ("Ref. Interna", receipt.internal_ref.as_deref()),
    ];
    for (label, value) in refs {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            layer.use_text(format!("{label}: {v}"), 9.5, Mm(left), from_top(left_y), font);
            left_y += LINE_HEIGHT_MM;
        }
    }

    let amount_x = left + content_w * 0.55;
    let value_x = amount_x + 42.0;
    let mut right_y = y;

    layer.use_text("Valor bruto", 9.5, Mm(amount_x), from_top(right_y), font);
    layer.use_text(format!("R$ {gross_fmt}"), 9.5, Mm(value_x), from_top(right_y), font);
    right_y += LINE_HEIGHT_MM;

    for (label, amount) in summary.nonzero_lines() {
        layer.use_text(format!("(-) {label}"), 9.5, Mm(amount_x), from_top(right_y), font);
        layer.use_text(
            format!("R$ {}", format_brl(amount)),
            9.5,
            Mm(value_x),
            from_top(right_y),
            font,
        );
        right_y += LINE_HEIGHT_MM;
    }

    layer.use_text("Valor líquido", 10.0, Mm(amount_x), from_top(right_y), bold);
    layer.use_text(
        format!("R$ {}", format_brl(summary.net)),
        10.0,
        Mm(value_x),
        from_top(right_y),
        bold,
    );
    right_y += LINE_HEIGHT_MM;

    left_y.max(right_y)
}

/// Rounded bordered box near the bottom edge with the fixed compliance
/// note, sized from its wrapped line count and clamped below whatever
/// content came before it.
fn draw_observation_box(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
    cursor: f32,
) {
    let box_w = 150.0;
    let box_x = (PAGE_W_MM - box_w) / 2.0;
    let pad = 4.0;
    let line_h = 4.5;

    let lines = wrap_text(NF_NOTE_TEXT, box_w - 2.0 * pad, 8.5);
    let box_h = 2.0 * pad + line_h * (lines.len() + 1) as f32;

    let preferred_top = PAGE_H_MM * (1.0 - OBS_BOTTOM_FRAC) - box_h;
    let top = anchor_from_bottom(cursor, 2.0, preferred_top);

    draw_rounded_rect(layer, box_x, top, box_w, box_h, 2.0);

    let mut y = top + pad + 3.0;
    layer.use_text(NF_NOTE_LABEL, 8.5, Mm(box_x + pad), from_top(y), bold);
    y += line_h;
    for line in &lines {
        layer.use_text(line.as_str(), 8.5, Mm(box_x + pad), from_top(y), font);
        y += line_h;
    }
}

fn draw_box(layer: &PdfLayerReference, lb: &LayoutBox) {
    if !lb.border {
        return;
    }
    let Rect { x, y, w, h } = lb.rect;
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x), from_top(y)), false),
            (Point::new(Mm(x + w), from_top(y)), false),
            (Point::new(Mm(x + w), from_top(y + h)), false),
            (Point::new(Mm(x), from_top(y + h)), false),
        ],
        is_closed: true,
    });
}

fn draw_segment(layer: &PdfLayerReference, x1: f32, y1: f32, x2: f32, y2: f32) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), from_top(y1)), false),
            (Point::new(Mm(x2), from_top(y2)), false),
        ],
        is_closed: false,
    });
}

/// Rounded rectangle outline from four line segments and four cubic
/// bezier corner arcs.
fn draw_rounded_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32, r: f32) {
    // Standard circle-approximation constant for a quarter arc.
    let k = r * 0.5523;
    let pt = |px: f32, py: f32, ctrl: bool| (Point::new(Mm(px), from_top(py)), ctrl);

    layer.add_line(Line {
        points: vec![
            pt(x + r, y, false),
            pt(x + w - r, y, false),
            pt(x + w - r + k, y, true),
            pt(x + w, y + r - k, true),
            pt(x + w, y + r, false),
            pt(x + w, y + h - r, false),
            pt(x + w, y + h - r + k, true),
            pt(x + w - r + k, y + h, true),
            pt(x + w - r, y + h, false),
            pt(x + r, y + h, false),
            pt(x + r - k, y + h, true),
            pt(x, y + h - r + k, true),
            pt(x, y + h - r, false),
            pt(x, y + r, false),
            pt(x, y + r - k, true),
            pt(x + r - k, y, true),
            pt(x + r, y, false),
        ],
        is_closed: true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparsable_gross_is_preserved_verbatim_for_display() {
        // Arithmetic degrades to zero but the display string survives.
        assert_eq!(parse_brl("???"), None);
        let shown = match parse_brl("???") {
            Some(n) => format_brl(n),
            None => "???".to_string(),
        };
        assert_eq!(shown, "???");
    }

    #[test]
    fn table_column_shares_cover_the_full_width() {
        let total: f32 = TABLE_COLS.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn city_state_joins_with_slash_only_when_both_present() {
        assert_eq!(city_state(Some("Campinas"), Some("SP")), "Campinas/SP");
        assert_eq!(city_state(Some("Campinas"), None), "Campinas");
        assert_eq!(city_state(None, Some("SP")), FIELD_FILLER);
    }

    #[test]
    fn footer_closing_combines_city_and_render_date() {
        let receipt = Receipt {
            city: Some("Campinas".to_string()),
            ..Receipt::default()
        };
        let day = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(footer_closing(&receipt, day), "Campinas, 10/06/2024");
        assert_eq!(
            footer_closing(&Receipt::default(), day),
            format!("{FIELD_FILLER}, 10/06/2024")
        );
    }

    #[test]
    fn overlong_row_values_are_clipped_with_an_ellipsis() {
        let long = "Prestação de serviços de sonorização e iluminação para evento corporativo";
        let clipped = clip_row_value(long, 52.0, 9.5);
        assert!(clipped.ends_with("..."));
        assert!(text_width_mm(&clipped, 9.5) <= 52.0);
    }

    #[test]
    fn short_row_values_pass_through_unclipped() {
        assert_eq!(clip_row_value("Maria Souza", 52.0, 9.5), "Maria Souza");
        assert_eq!(clip_row_value("", 52.0, 9.5), FIELD_FILLER);
    }
}
