use super::Region;
use crate::{
    design::{fit_text, FittedText, ResolvedStyle, ShapeStyle},
    pptx::{AutoShape, Bullet, Font, LineStyle, Paragraph, Run, ShapeRole, Slide, TextFrame, VerticalAnchor},
};

pub(crate) fn title_frame(title: &str, style: &ResolvedStyle) -> TextFrame {
    let font = Font {
        name: Some(style.title_font.clone()),
        size: Some(style.title_font_size),
        bold: Some(style.title_bold),
        italic: None,
        color: Some(style.primary_color),
    };
    let paragraph =
        Paragraph { runs: vec![Run::new(title, font)], alignment: Some(style.title_alignment), ..Default::default() };
    TextFrame { paragraphs: vec![paragraph], anchor: VerticalAnchor::Middle, ..Default::default() }
}

pub(crate) fn subtitle_frame(subtitle: &str, style: &ResolvedStyle) -> TextFrame {
    let paragraph = Paragraph {
        runs: vec![Run::new(subtitle, body_font(style, style.body_font_size))],
        alignment: Some(style.title_alignment),
        line_spacing: Some(style.line_spacing),
        ..Default::default()
    };
    TextFrame { paragraphs: vec![paragraph], ..Default::default() }
}

pub(crate) fn body_font(style: &ResolvedStyle, size: f64) -> Font {
    Font {
        name: Some(style.body_font.clone()),
        size: Some(size),
        bold: None,
        italic: None,
        color: Some(style.secondary_color),
    }
}

/// A body paragraph, with its text fitted to the style.
pub(crate) fn body_paragraph(text: &str, style: &ResolvedStyle, bullet: Option<Bullet>) -> (Paragraph, FittedText) {
    let fitted = fit_text(text, style.body_font_size, style);
    let paragraph = Paragraph {
        runs: vec![Run::new(fitted.text.clone(), body_font(style, fitted.font_size))],
        alignment: Some(style.alignment),
        level: 0,
        bullet,
        line_spacing: Some(style.line_spacing),
    };
    (paragraph, fitted)
}

pub(crate) fn body_frame(text: &str, style: &ResolvedStyle) -> (TextFrame, FittedText) {
    let (paragraph, fitted) = body_paragraph(text, style, None);
    (TextFrame { paragraphs: vec![paragraph], ..Default::default() }, fitted)
}

/// Add a shape styled by the given shape style with some text inside it.
pub(crate) fn push_text_shape(
    slide: &mut Slide,
    region: Region,
    text: &str,
    style: &ResolvedStyle,
    shape_style: &ShapeStyle,
) -> FittedText {
    let font_size = shape_style.font_size.unwrap_or(style.body_font_size);
    let fitted = fit_text(text, font_size, style);
    let color = shape_style.text_color.unwrap_or(style.secondary_color);
    let font = Font { color: Some(color), ..body_font(style, fitted.font_size) };
    let paragraph = Paragraph {
        runs: vec![Run::new(fitted.text.clone(), font)],
        alignment: Some(style.alignment),
        line_spacing: Some(style.line_spacing),
        ..Default::default()
    };
    let shape = AutoShape {
        geometry: shape_style.shape_type,
        fill: Some(shape_style.fill_color),
        line: Some(LineStyle { color: shape_style.line_color, width: shape_style.line_width }),
        text: TextFrame { paragraphs: vec![paragraph], anchor: VerticalAnchor::Middle, ..Default::default() },
    };
    slide.add_auto_shape(ShapeRole::Other, region.rect(), shape);
    fitted
}
