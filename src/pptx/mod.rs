//! An in-memory presentation document model that can be saved as and opened from `.pptx` files.
//!
//! The model only covers what slides are built from here: text boxes, preset auto shapes and
//! tables, plus slide backgrounds and transitions.

pub(crate) mod reader;
pub(crate) mod shape;
pub(crate) mod slide;
pub(crate) mod template;
pub(crate) mod writer;

pub use shape::{
    AutoShape, Bullet, Font, Geometry, Insets, LineStyle, Paragraph, Rect, Run, Shape, ShapeKind, ShapeRole, Table,
    TableCell, TableRow, TextFrame,
};
pub use slide::{Slide, Transition, TransitionKind, TransitionSpeed};

use hex::FromHex;
use schemars::{gen::SchemaGenerator, schema::Schema, JsonSchema};
use serde::{Deserialize, Serialize};
use std::{
    fmt, io,
    path::{Path, PathBuf},
    str::FromStr,
};

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// English Metric Units per point.
pub const EMU_PER_POINT: i64 = 12_700;

/// A length in English Metric Units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Emu(pub i64);

impl Emu {
    pub fn from_inches(inches: f64) -> Self {
        Self((inches * EMU_PER_INCH as f64).round() as i64)
    }

    pub fn from_points(points: f64) -> Self {
        Self((points * EMU_PER_POINT as f64).round() as i64)
    }

    pub fn as_inches(&self) -> f64 {
        self.0 as f64 / EMU_PER_INCH as f64
    }

    pub fn as_points(&self) -> f64 {
        self.0 as f64 / EMU_PER_POINT as f64
    }
}

/// An RGB color.
///
/// Deserializes from either an `[r, g, b]` triplet or a hex string, with or without a leading
/// `#`. Always serializes as a hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRgb", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let values = <[u8; 3]>::from_hex(input.trim_start_matches('#'))?;
        Ok(Self::new(values[0], values[1], values[2]))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper([self.r, self.g, self.b]))
    }
}

#[derive(Deserialize, JsonSchema)]
#[serde(untagged)]
enum RawRgb {
    /// An `[r, g, b]` triplet.
    Triplet([u8; 3]),

    /// A hex encoded color, like `E6F0FF` or `#E6F0FF`.
    Hex(String),
}

impl TryFrom<RawRgb> for Rgb {
    type Error = ParseColorError;

    fn try_from(raw: RawRgb) -> Result<Self, Self::Error> {
        match raw {
            RawRgb::Triplet([r, g, b]) => Ok(Self::new(r, g, b)),
            RawRgb::Hex(input) => input.parse(),
        }
    }
}

impl JsonSchema for Rgb {
    fn schema_name() -> String {
        "Rgb".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        RawRgb::json_schema(generator)
    }
}

#[derive(thiserror::Error, Debug)]
#[error("invalid hex color: {0}")]
pub struct ParseColorError(#[from] hex::FromHexError);

/// Horizontal text alignment.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, strum::EnumString, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub(crate) fn as_ooxml(&self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
            Self::Justify => "just",
        }
    }

    pub(crate) fn from_ooxml(value: &str) -> Option<Self> {
        let alignment = match value {
            "l" => Self::Left,
            "ctr" => Self::Center,
            "r" => Self::Right,
            "just" => Self::Justify,
            _ => return None,
        };
        Some(alignment)
    }
}

/// Vertical text anchoring inside a text frame or table cell.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, strum::EnumString, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VerticalAnchor {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VerticalAnchor {
    pub(crate) fn as_ooxml(&self) -> &'static str {
        match self {
            Self::Top => "t",
            Self::Middle => "ctr",
            Self::Bottom => "b",
        }
    }

    pub(crate) fn from_ooxml(value: &str) -> Option<Self> {
        let anchor = match value {
            "t" => Self::Top,
            "ctr" => Self::Middle,
            "b" => Self::Bottom,
            _ => return None,
        };
        Some(anchor)
    }
}

/// The document's core properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub keywords: Option<String>,
    pub comments: Option<String>,
}

/// A presentation.
#[derive(Clone, Debug)]
pub struct Presentation {
    slides: Vec<Slide>,
    width: Emu,
    height: Emu,
    properties: CoreProperties,
    next_slide_id: u32,
}

impl Presentation {
    /// The identifier of the first slide, as required by the package format.
    const FIRST_SLIDE_ID: u32 = 256;

    /// Create an empty 10" x 7.5" presentation.
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            width: Emu::from_inches(10.0),
            height: Emu::from_inches(7.5),
            properties: Default::default(),
            next_slide_id: Self::FIRST_SLIDE_ID,
        }
    }

    /// Open an existing `.pptx` file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PptxError> {
        reader::read_presentation(path.as_ref())
    }

    /// Save this presentation as a `.pptx` file.
    ///
    /// The file is written next to its destination first and then renamed into place, so a failed
    /// save never leaves a partial file behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf, PptxError> {
        writer::save_presentation(self, path.as_ref())
    }

    /// Append a new empty slide that uses the given master layout.
    pub fn add_slide(&mut self, layout_index: usize, name: impl Into<String>) -> Result<&mut Slide, PptxError> {
        let count = template::LAYOUTS.len();
        if layout_index >= count {
            return Err(PptxError::LayoutIndex { index: layout_index, count });
        }
        let slide = Slide::new(self.next_slide_id, layout_index, name.into());
        self.next_slide_id += 1;
        self.slides.push(slide);
        let index = self.slides.len() - 1;
        Ok(&mut self.slides[index])
    }

    pub(crate) fn push_slide(&mut self, mut slide: Slide) {
        slide.id = self.next_slide_id;
        self.next_slide_id += 1;
        self.slides.push(slide);
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slide(&self, index: usize) -> Result<&Slide, PptxError> {
        let count = self.slides.len();
        self.slides.get(index).ok_or(PptxError::SlideIndex { index, count })
    }

    pub fn slide_mut(&mut self, index: usize) -> Result<&mut Slide, PptxError> {
        let count = self.slides.len();
        self.slides.get_mut(index).ok_or(PptxError::SlideIndex { index, count })
    }

    pub fn width(&self) -> Emu {
        self.width
    }

    pub fn height(&self) -> Emu {
        self.height
    }

    pub fn set_size(&mut self, width: Emu, height: Emu) {
        self.width = width;
        self.height = height;
    }

    pub fn properties(&self) -> &CoreProperties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut CoreProperties {
        &mut self.properties
    }
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new()
    }
}

/// An error when reading or writing a presentation.
#[derive(thiserror::Error, Debug)]
pub enum PptxError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("invalid package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid xml in {part}: {reason}")]
    Xml { part: String, reason: String },

    #[error("package part not found: {0}")]
    MissingPart(String),

    #[error("layout index {index} is out of range, there are {count} layouts")]
    LayoutIndex { index: usize, count: usize },

    #[error("slide index {index} is out of range, presentation has {count} slides")]
    SlideIndex { index: usize, count: usize },

    #[error("could not persist '{path}': {error}")]
    Persist { path: PathBuf, error: io::Error },
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::triplet("[230, 240, 255]")]
    #[case::hex("\"E6F0FF\"")]
    #[case::hex_lowercase("\"e6f0ff\"")]
    #[case::hex_with_hash("\"#E6F0FF\"")]
    fn parse_colors(#[case] input: &str) {
        let color: Rgb = serde_json::from_str(input).expect("parse failed");
        assert_eq!(color, Rgb::new(230, 240, 255));
        assert_eq!(color.to_string(), "E6F0FF");
    }

    #[rstest]
    #[case::short("\"E6F0\"")]
    #[case::not_hex("\"ZZZZZZ\"")]
    #[case::overflow("[256, 0, 0]")]
    #[case::too_few("[1, 2]")]
    fn invalid_colors(#[case] input: &str) {
        serde_json::from_str::<Rgb>(input).expect_err("parse succeeded");
    }

    #[test]
    fn colors_serialize_as_hex() {
        let color = Rgb::new(1, 2, 255);
        assert_eq!(serde_json::to_string(&color).unwrap(), r#""0102FF""#);
    }

    #[test]
    fn emu_conversions() {
        assert_eq!(Emu::from_inches(1.0), Emu(EMU_PER_INCH));
        assert_eq!(Emu::from_points(1.5), Emu(19_050));
        assert_eq!(Emu(EMU_PER_INCH * 2).as_inches(), 2.0);
    }

    #[test]
    fn slide_ids_increase() {
        let mut presentation = Presentation::new();
        let first = presentation.add_slide(0, "a").expect("add failed").id();
        let second = presentation.add_slide(1, "b").expect("add failed").id();
        assert_eq!(first, 256);
        assert_eq!(second, 257);
        assert_eq!(presentation.slide_count(), 2);
    }

    #[test]
    fn slide_index_out_of_range() {
        let mut presentation = Presentation::new();
        presentation.add_slide(1, "only").expect("add failed");
        let error = presentation.slide_mut(3).expect_err("lookup succeeded");
        assert!(matches!(error, PptxError::SlideIndex { index: 3, count: 1 }));
    }

    #[test]
    fn layout_index_out_of_range() {
        let mut presentation = Presentation::new();
        let error = presentation.add_slide(42, "nope").expect_err("add succeeded");
        assert!(matches!(error, PptxError::LayoutIndex { index: 42, .. }));
        assert_eq!(presentation.slide_count(), 0);
    }
}
