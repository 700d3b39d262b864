use super::{text, Region};
use crate::{
    design::{fit::scale_font_size, BulletType, ResolvedStyle},
    pptx::{
        Alignment, AutoShape, Bullet, Font, Geometry, Insets, Paragraph, Rect, Run, ShapeRole, Slide, TextFrame,
        VerticalAnchor,
    },
};

const BULLET: char = '•';

// Numbers take half the height of their circle.
const CIRCLE_FONT_RATE: f64 = 0.5;
const POINTS_PER_INCH: f64 = 72.0;

/// Add a list of items to a region of a slide.
///
/// Numbered items start counting after `offset`, so a list split in columns keeps its numbering.
pub(crate) fn push_list(slide: &mut Slide, region: Region, items: &[String], offset: usize, style: &ResolvedStyle) {
    if items.is_empty() {
        return;
    }
    match paragraph_bullet(style.bullet_type) {
        Some(bullet) => {
            slide.add_text_box(ShapeRole::Body, region.rect(), list_frame(items, bullet, style));
        }
        None => push_numbered(slide, region, items, offset, style),
    }
}

// Numbered circles are shapes rather than paragraph bullets.
fn paragraph_bullet(bullet_type: BulletType) -> Option<Bullet> {
    match bullet_type {
        BulletType::Bullet => Some(Bullet::Char(BULLET)),
        BulletType::None => Some(Bullet::None),
        BulletType::CircleNumber => None,
    }
}

fn list_frame(items: &[String], bullet: Bullet, style: &ResolvedStyle) -> TextFrame {
    let paragraphs = items.iter().map(|item| text::body_paragraph(item, style, Some(bullet.clone())).0).collect();
    TextFrame { paragraphs, ..Default::default() }
}

fn push_numbered(slide: &mut Slide, region: Region, items: &[String], offset: usize, style: &ResolvedStyle) {
    let diameter = style.circle_diameter;
    let pitch = style.vertical_spacing.max(diameter);
    let text_width = (region.width - style.text_indent).max(diameter);
    for (index, item) in items.iter().enumerate() {
        let y = region.y + pitch * index as f64;
        let circle = AutoShape {
            geometry: Geometry::Oval,
            fill: Some(style.circle_color),
            line: None,
            text: number_frame(offset + index + 1, style),
        };
        slide.add_auto_shape(ShapeRole::ListItem, Rect::from_inches(region.x, y, diameter, diameter), circle);

        let (paragraph, _) = text::body_paragraph(item, style, None);
        let frame = TextFrame { paragraphs: vec![paragraph], anchor: VerticalAnchor::Middle, ..Default::default() };
        let rect = Rect::from_inches(region.x + style.text_indent, y, text_width, diameter);
        slide.add_text_box(ShapeRole::ListItem, rect, frame);
    }
}

fn number_frame(number: usize, style: &ResolvedStyle) -> TextFrame {
    let font = Font {
        name: Some(style.body_font.clone()),
        size: Some(scale_font_size(style.circle_diameter * POINTS_PER_INCH, CIRCLE_FONT_RATE)),
        bold: Some(true),
        italic: None,
        color: Some(style.circle_text_color),
    };
    let paragraph = Paragraph {
        runs: vec![Run::new(number.to_string(), font)],
        alignment: Some(Alignment::Center),
        ..Default::default()
    };
    TextFrame {
        paragraphs: vec![paragraph],
        anchor: VerticalAnchor::Middle,
        wrap: false,
        insets: Some(Insets::default()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pptx::{Presentation, ShapeKind};
    use rstest::rstest;

    const REGION: Region = Region { x: 1.0, y: 2.0, width: 8.0, height: 5.0 };

    fn items(count: usize) -> Vec<String> {
        (1..=count).map(|index| format!("item {index}")).collect()
    }

    #[rstest]
    #[case::bullet(BulletType::Bullet, Some(Bullet::Char(BULLET)))]
    #[case::none(BulletType::None, Some(Bullet::None))]
    fn paragraphs(#[case] bullet_type: BulletType, #[case] expected: Option<Bullet>) {
        let mut presentation = Presentation::new();
        let slide = presentation.add_slide(1, "title_content").expect("add failed");
        let style = ResolvedStyle { bullet_type, ..Default::default() };
        push_list(slide, REGION, &items(3), 0, &style);

        assert_eq!(slide.shape_count(), 1);
        let frame = slide.shapes()[0].text_frame().expect("no text");
        assert_eq!(frame.paragraphs.len(), 3);
        for paragraph in &frame.paragraphs {
            assert_eq!(paragraph.bullet, expected);
            assert_eq!(paragraph.line_spacing, Some(1.3));
        }
    }

    #[test]
    fn numbered_circles() {
        let mut presentation = Presentation::new();
        let slide = presentation.add_slide(1, "title_content").expect("add failed");
        let style = ResolvedStyle { bullet_type: BulletType::CircleNumber, ..Default::default() };
        push_list(slide, REGION, &items(2), 3, &style);

        // A circle and a text box per item.
        assert_eq!(slide.shape_count(), 4);
        let numbers: Vec<_> = slide
            .shapes()
            .iter()
            .filter_map(|shape| match shape.kind() {
                ShapeKind::AutoShape(circle) => Some(circle.text.text()),
                _ => None,
            })
            .collect();
        assert_eq!(numbers, &["4", "5"]);

        let ShapeKind::AutoShape(circle) = slide.shapes()[0].kind() else { panic!("not a circle") };
        assert_eq!(circle.geometry, Geometry::Oval);
        assert_eq!(circle.fill, Some(style.circle_color));
        assert_eq!(circle.text.paragraphs[0].runs[0].font.size, Some(14.4));

        let first = slide.shapes()[0].rect();
        let second = slide.shapes()[2].rect();
        assert_eq!(second.y.0 - first.y.0, Rect::from_inches(0.0, 0.5, 0.0, 0.0).y.0);
        assert_eq!(slide.shapes()[1].text().as_deref(), Some("item 1"));
    }

    #[test]
    fn empty_list() {
        let mut presentation = Presentation::new();
        let slide = presentation.add_slide(1, "title_content").expect("add failed");
        push_list(slide, REGION, &[], 0, &ResolvedStyle::default());
        assert_eq!(slide.shape_count(), 0);
    }
}
