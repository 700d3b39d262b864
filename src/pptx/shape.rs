use super::{Alignment, Emu, Rgb, VerticalAnchor};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A shape's position and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: Emu,
    pub y: Emu,
    pub width: Emu,
    pub height: Emu,
}

impl Rect {
    pub fn new(x: Emu, y: Emu, width: Emu, height: Emu) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_inches(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Emu::from_inches(x), Emu::from_inches(y), Emu::from_inches(width), Emu::from_inches(height))
    }
}

/// What a shape is used for on its slide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeRole {
    Title,
    Subtitle,
    Body,
    /// Part of a list drawn with shapes, like a numbered circle or its text.
    ListItem,
    Other,
}

impl ShapeRole {
    pub(crate) fn name_prefix(&self, kind: &ShapeKind) -> &'static str {
        match (self, kind) {
            (Self::Title, _) => "Title",
            (Self::Subtitle, _) => "Subtitle",
            (Self::Body, _) => "Body",
            (Self::ListItem, _) => "Item",
            (Self::Other, ShapeKind::TextBox(_)) => "TextBox",
            (Self::Other, ShapeKind::AutoShape(_)) => "Shape",
            (Self::Other, ShapeKind::Table(_)) => "Table",
        }
    }

    /// Infer a shape's role from the name it was written with.
    pub(crate) fn from_name(name: &str) -> Self {
        let prefix = name.split(' ').next().unwrap_or_default();
        match prefix {
            "Title" => Self::Title,
            "Subtitle" => Self::Subtitle,
            "Body" => Self::Body,
            "Item" => Self::ListItem,
            _ => Self::Other,
        }
    }
}

/// A shape on a slide.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) role: ShapeRole,
    pub(crate) rect: Rect,
    pub(crate) kind: ShapeKind,
}

impl Shape {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> ShapeRole {
        self.role
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn text_frame(&self) -> Option<&TextFrame> {
        match &self.kind {
            ShapeKind::TextBox(text) => Some(text),
            ShapeKind::AutoShape(shape) => Some(&shape.text),
            ShapeKind::Table(_) => None,
        }
    }

    pub fn text_frame_mut(&mut self) -> Option<&mut TextFrame> {
        match &mut self.kind {
            ShapeKind::TextBox(text) => Some(text),
            ShapeKind::AutoShape(shape) => Some(&mut shape.text),
            ShapeKind::Table(_) => None,
        }
    }

    /// The shape's plain text, paragraphs separated by new lines.
    pub fn text(&self) -> Option<String> {
        self.text_frame().map(TextFrame::text)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
    TextBox(TextFrame),
    AutoShape(AutoShape),
    Table(Table),
}

/// A preset geometry shape with an optional text body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AutoShape {
    pub geometry: Geometry,
    pub fill: Option<Rgb>,
    pub line: Option<LineStyle>,
    pub text: TextFrame,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub color: Rgb,
    pub width: f64,
}

/// A preset shape geometry.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Geometry {
    #[default]
    Rectangle,
    RoundedRectangle,
    Oval,
    Diamond,
    Triangle,
    RightTriangle,
    Pentagon,
    Hexagon,
    Octagon,
    Star,
    RightArrow,
    Chevron,
    Cloud,
    Heart,
    FlowchartProcess,
    FlowchartDecision,
}

impl Geometry {
    /// The preset geometry name used in the package.
    pub(crate) fn preset(&self) -> &'static str {
        match self {
            Self::Rectangle => "rect",
            Self::RoundedRectangle => "roundRect",
            Self::Oval => "ellipse",
            Self::Diamond => "diamond",
            Self::Triangle => "triangle",
            Self::RightTriangle => "rtTriangle",
            Self::Pentagon => "pentagon",
            Self::Hexagon => "hexagon",
            Self::Octagon => "octagon",
            Self::Star => "star5",
            Self::RightArrow => "rightArrow",
            Self::Chevron => "chevron",
            Self::Cloud => "cloud",
            Self::Heart => "heart",
            Self::FlowchartProcess => "flowChartProcess",
            Self::FlowchartDecision => "flowChartDecision",
        }
    }

    pub(crate) fn from_preset(preset: &str) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|geometry| geometry.preset() == preset)
    }
}

/// Text inside a shape.
#[derive(Clone, Debug, PartialEq)]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
    pub anchor: VerticalAnchor,
    pub wrap: bool,
    pub insets: Option<Insets>,
}

impl TextFrame {
    pub fn from_text(text: &str) -> Self {
        Self { paragraphs: vec![Paragraph::from_text(text)], ..Default::default() }
    }

    pub fn text(&self) -> String {
        self.paragraphs.iter().map(Paragraph::text).collect::<Vec<_>>().join("\n")
    }
}

impl Default for TextFrame {
    fn default() -> Self {
        Self { paragraphs: Vec::new(), anchor: VerticalAnchor::Top, wrap: true, insets: None }
    }
}

/// Inner margins of a text frame or table cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Insets {
    pub left: Emu,
    pub right: Emu,
    pub top: Emu,
    pub bottom: Emu,
}

impl Insets {
    pub fn from_points(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self {
            left: Emu::from_points(left),
            right: Emu::from_points(right),
            top: Emu::from_points(top),
            bottom: Emu::from_points(bottom),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub alignment: Option<Alignment>,
    pub level: u8,
    pub bullet: Option<Bullet>,
    /// Line spacing as a multiple of single spacing.
    pub line_spacing: Option<f64>,
}

impl Paragraph {
    pub fn from_text(text: &str) -> Self {
        Self { runs: vec![Run::new(text, Font::default())], ..Default::default() }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Bullet {
    /// A bullet character.
    Char(char),
    /// No bullet at all, even if the layout defines one.
    None,
}

/// A run of text sharing the same font.
///
/// New lines inside the text are written as line breaks within the paragraph.
#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    pub text: String,
    pub font: Font,
}

impl Run {
    pub fn new(text: impl Into<String>, font: Font) -> Self {
        Self { text: text.into(), font }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Font {
    pub name: Option<String>,
    /// The size, in points.
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<Rgb>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<Emu>,
    pub rows: Vec<TableRow>,
    pub border: Option<LineStyle>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|row| row.cells.get(column))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRow {
    pub height: Emu,
    pub cells: Vec<TableCell>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableCell {
    pub text: TextFrame,
    pub fill: Option<Rgb>,
    pub margins: Option<Insets>,
    pub anchor: VerticalAnchor,
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    #[test]
    fn presets_are_unique() {
        for geometry in Geometry::iter() {
            assert_eq!(Geometry::from_preset(geometry.preset()), Some(geometry));
        }
    }

    #[rstest]
    #[case::rounded("\"rounded_rectangle\"", Geometry::RoundedRectangle)]
    #[case::oval("\"oval\"", Geometry::Oval)]
    #[case::flowchart("\"flowchart_process\"", Geometry::FlowchartProcess)]
    fn parse_geometry(#[case] input: &str, #[case] expected: Geometry) {
        let geometry: Geometry = serde_json::from_str(input).expect("parse failed");
        assert_eq!(geometry, expected);
    }

    #[rstest]
    #[case::title("Title 1", ShapeRole::Title)]
    #[case::subtitle("Subtitle 2", ShapeRole::Subtitle)]
    #[case::body("Body 4", ShapeRole::Body)]
    #[case::list_item("Item 5", ShapeRole::ListItem)]
    #[case::other("Shape 3", ShapeRole::Other)]
    #[case::empty("", ShapeRole::Other)]
    fn role_from_name(#[case] name: &str, #[case] expected: ShapeRole) {
        assert_eq!(ShapeRole::from_name(name), expected);
    }

    #[test]
    fn frame_text() {
        let mut frame = TextFrame::from_text("one");
        let runs = vec![Run::new("tw", Font::default()), Run::new("o", Font::default())];
        frame.paragraphs.push(Paragraph { runs, ..Default::default() });
        assert_eq!(frame.text(), "one\ntwo");
    }
}
