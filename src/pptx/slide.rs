use super::{
    shape::{AutoShape, Shape, ShapeKind, ShapeRole, Table, TextFrame},
    Rect, Rgb,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A slide.
#[derive(Clone, Debug)]
pub struct Slide {
    pub(crate) id: u32,
    pub(crate) layout_index: usize,
    pub(crate) name: String,
    pub(crate) background: Option<Rgb>,
    pub(crate) transition: Option<Transition>,
    pub(crate) shapes: Vec<Shape>,
}

impl Slide {
    pub(crate) fn new(id: u32, layout_index: usize, name: String) -> Self {
        Self { id, layout_index, name, background: None, transition: None, shapes: Vec::new() }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// The index of the master layout this slide is based on.
    pub fn layout_index(&self) -> usize {
        self.layout_index
    }

    /// The slide's name, which is the design layout it was built from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn background(&self) -> Option<Rgb> {
        self.background
    }

    pub fn set_background(&mut self, color: Rgb) {
        self.background = Some(color);
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    pub fn set_transition(&mut self, transition: Transition) {
        self.transition = Some(transition);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Add a text box.
    pub fn add_text_box(&mut self, role: ShapeRole, rect: Rect, text: TextFrame) -> &mut Shape {
        self.push_shape(role, rect, ShapeKind::TextBox(text))
    }

    /// Add a preset geometry shape.
    pub fn add_auto_shape(&mut self, role: ShapeRole, rect: Rect, shape: AutoShape) -> &mut Shape {
        self.push_shape(role, rect, ShapeKind::AutoShape(shape))
    }

    /// Add a table.
    pub fn add_table(&mut self, rect: Rect, table: Table) -> &mut Shape {
        self.push_shape(ShapeRole::Other, rect, ShapeKind::Table(table))
    }

    /// The slide's title, if it has one.
    pub fn title(&self) -> Option<String> {
        self.shapes.iter().find(|shape| shape.role == ShapeRole::Title).and_then(Shape::text)
    }

    /// The text frame of the first shape with the given role.
    pub fn text_frame_mut(&mut self, role: ShapeRole) -> Option<&mut TextFrame> {
        self.shapes.iter_mut().find(|shape| shape.role == role).and_then(Shape::text_frame_mut)
    }

    /// Remove every shape with the given role, returning how many were removed.
    pub fn remove_shapes(&mut self, role: ShapeRole) -> usize {
        let count = self.shapes.len();
        self.shapes.retain(|shape| shape.role != role);
        count - self.shapes.len()
    }

    fn push_shape(&mut self, role: ShapeRole, rect: Rect, kind: ShapeKind) -> &mut Shape {
        // Id 1 is the slide's shape tree.
        let id = self.shapes.iter().map(|shape| shape.id).max().unwrap_or(1) + 1;
        let name = format!("{} {}", role.name_prefix(&kind), id - 1);
        self.shapes.push(Shape { id, name, role, rect, kind });
        let index = self.shapes.len() - 1;
        &mut self.shapes[index]
    }

    pub(crate) fn push_parsed_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }
}

/// A slide transition.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub speed: TransitionSpeed,
    pub advance_after_ms: Option<u32>,
}

/// The transition effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    None,
    Cut,
    #[default]
    Fade,
    Push,
    Wipe,
    Split,
    Cover,
    Dissolve,
}

impl TransitionKind {
    /// The element name used for this transition, if any.
    pub(crate) fn element(&self) -> Option<&'static str> {
        let name = match self {
            Self::None => return None,
            Self::Cut => "cut",
            Self::Fade => "fade",
            Self::Push => "push",
            Self::Wipe => "wipe",
            Self::Split => "split",
            Self::Cover => "cover",
            Self::Dissolve => "dissolve",
        };
        Some(name)
    }

    pub(crate) fn from_element(name: &[u8]) -> Option<Self> {
        let kind = match name {
            b"cut" => Self::Cut,
            b"fade" => Self::Fade,
            b"push" => Self::Push,
            b"wipe" => Self::Wipe,
            b"split" => Self::Split,
            b"cover" => Self::Cover,
            b"dissolve" => Self::Dissolve,
            _ => return None,
        };
        Some(kind)
    }
}

/// How fast a transition plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransitionSpeed {
    Slow,
    #[default]
    Med,
    Fast,
}

impl TransitionSpeed {
    pub(crate) fn as_ooxml(&self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Med => "med",
            Self::Fast => "fast",
        }
    }

    pub(crate) fn from_ooxml(value: &str) -> Self {
        match value {
            "slow" => Self::Slow,
            "fast" => Self::Fast,
            _ => Self::Med,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pptx::{Emu, Paragraph};

    fn rect() -> Rect {
        Rect::new(Emu(0), Emu(0), Emu(100), Emu(100))
    }

    #[test]
    fn shape_ids_and_names() {
        let mut slide = Slide::new(256, 1, "title_content".into());
        let title = slide.add_text_box(ShapeRole::Title, rect(), TextFrame::from_text("hi"));
        assert_eq!(title.id, 2);
        assert_eq!(title.name, "Title 1");
        let body = slide.add_text_box(ShapeRole::Body, rect(), TextFrame::default());
        assert_eq!(body.id, 3);
        assert_eq!(body.name, "Body 2");
    }

    #[test]
    fn title_lookup() {
        let mut slide = Slide::new(256, 1, "title_content".into());
        assert_eq!(slide.title(), None);
        slide.add_text_box(ShapeRole::Body, rect(), TextFrame::from_text("body"));
        slide.add_text_box(ShapeRole::Title, rect(), TextFrame::from_text("title"));
        assert_eq!(slide.title().as_deref(), Some("title"));
    }

    #[test]
    fn body_lookup() {
        let mut slide = Slide::new(256, 1, "title_content".into());
        slide.add_text_box(ShapeRole::Body, rect(), TextFrame::default());
        let body = slide.text_frame_mut(ShapeRole::Body).expect("no body");
        body.paragraphs.push(Paragraph::from_text("line"));
        assert_eq!(slide.shapes()[0].text().as_deref(), Some("line"));
    }

    #[test]
    fn remove_by_role() {
        let mut slide = Slide::new(256, 1, "two_column".into());
        slide.add_text_box(ShapeRole::Title, rect(), TextFrame::from_text("title"));
        slide.add_text_box(ShapeRole::Body, rect(), TextFrame::from_text("left"));
        slide.add_text_box(ShapeRole::Body, rect(), TextFrame::from_text("right"));
        assert_eq!(slide.remove_shapes(ShapeRole::Body), 2);
        assert_eq!(slide.remove_shapes(ShapeRole::Body), 0);

        // Removed shapes free their ids.
        let body = slide.add_text_box(ShapeRole::Body, rect(), TextFrame::default());
        assert_eq!(body.id, 3);
        assert_eq!(slide.shape_count(), 2);
    }
}
