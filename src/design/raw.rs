use super::{registry::LoadThemeError, LoadDesignError};
use crate::pptx::{Alignment, Geometry, Rgb, TransitionKind, TransitionSpeed, VerticalAnchor};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{collections::BTreeMap, fs, path::Path};

/// A design system configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DesignConfig {
    /// The global text settings, applied on top of the built-in defaults.
    #[serde(default)]
    pub slide_text_settings: StyleOverride,

    /// The slide layouts, by name.
    #[serde(default)]
    pub slide_layouts: BTreeMap<String, SlideLayout>,

    /// Style overrides that individual slides can opt into, by key.
    #[serde(default)]
    pub slide_overrides: BTreeMap<String, StyleOverride>,

    /// The table styles, by name.
    #[serde(default)]
    pub table_styles: BTreeMap<String, TableStyleOverride>,

    /// The shape styles, by name.
    #[serde(default)]
    pub shape_styles: BTreeMap<String, ShapeStyleOverride>,

    /// Color themes, by name.
    #[serde(default)]
    pub themes: BTreeMap<String, Theme>,

    /// The slide transitions.
    #[serde(default)]
    pub animation_settings: AnimationSettings,
}

impl DesignConfig {
    /// Load a design configuration from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadDesignError> {
        let contents = fs::read_to_string(&path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

/// A partial slide style. Any attribute that's not set is taken from the layer below.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct StyleOverride {
    #[serde(default)]
    pub background_color: Option<Rgb>,

    #[serde(default)]
    pub title_font: Option<String>,

    /// The title font size, in points.
    #[serde(default)]
    pub title_font_size: Option<f64>,

    #[serde(default)]
    pub title_bold: Option<bool>,

    #[serde(default)]
    pub title_alignment: Option<Alignment>,

    #[serde(default)]
    pub body_font: Option<String>,

    /// The body font size, in points.
    #[serde(default)]
    pub body_font_size: Option<f64>,

    /// The color used for titles.
    #[serde(default)]
    pub primary_color: Option<Rgb>,

    /// The color used for body text.
    #[serde(default)]
    pub secondary_color: Option<Rgb>,

    #[serde(default)]
    pub bullet_type: Option<BulletType>,

    /// The fill color of numbered circles.
    #[serde(default)]
    pub circle_color: Option<Rgb>,

    /// The color of the number inside numbered circles.
    #[serde(default)]
    pub circle_text_color: Option<Rgb>,

    /// The line spacing, as a multiple of single spacing.
    #[serde(default)]
    pub line_spacing: Option<f64>,

    /// The body text alignment.
    #[serde(default)]
    pub alignment: Option<Alignment>,

    /// The index of the master layout slides are based on.
    #[serde(default, alias = "default_layout_index")]
    pub layout_index: Option<usize>,

    /// The diameter of numbered circles, in inches.
    #[serde(default)]
    pub circle_diameter: Option<f64>,

    /// How far text is indented from numbered circles, in inches.
    #[serde(default)]
    pub text_indent: Option<f64>,

    /// The vertical distance between numbered items, in inches.
    #[serde(default)]
    pub vertical_spacing: Option<f64>,

    /// Texts longer than this many characters get a smaller font.
    #[serde(default)]
    pub auto_font_resize_threshold: Option<usize>,

    /// The factor applied to the font size of long texts.
    #[serde(default)]
    pub font_resize_rate: Option<f64>,

    #[serde(default)]
    pub text_adaptive_rules: Option<TextAdaptiveRules>,

    /// Bullet lists with more items than this are split into two columns.
    #[serde(default)]
    pub two_column_threshold: Option<usize>,

    /// The name of the table style to use.
    #[serde(default)]
    pub table_style: Option<String>,

    /// The name of the shape style to use.
    #[serde(default)]
    pub shape_style: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TextAdaptiveRules {
    /// Texts longer than this many characters are broken in two lines.
    #[serde(default)]
    pub wrap_text_threshold: Option<usize>,
}

/// How list items are marked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BulletType {
    /// A bullet character.
    #[default]
    Bullet,

    /// A numbered circle next to each item.
    CircleNumber,

    /// Plain paragraphs.
    None,
}

/// A slide layout.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(try_from = "Map<String, Value>")]
pub struct SlideLayout {
    /// The style for slides using this layout.
    #[serde(flatten)]
    pub style: StyleOverride,

    /// The elements slides using this layout contain.
    #[serde(default)]
    pub elements: Option<Vec<LayoutElement>>,
}

// Flattening the style would let unknown keys through, so they're checked against it by hand.
impl TryFrom<Map<String, Value>> for SlideLayout {
    type Error = serde_json::Error;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        let elements: Option<Option<Vec<LayoutElement>>> =
            map.shift_remove("elements").map(serde_json::from_value).transpose()?;
        let style = serde_json::from_value(Value::Object(map))?;
        Ok(Self { style, elements: elements.flatten() })
    }
}

/// An element in a slide layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LayoutElement {
    Title,
    Subtitle,
    Body,
    LeftColumn,
    RightColumn,
    Shape,
}

/// A partial table style.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TableStyleOverride {
    #[serde(default)]
    pub header_font_size: Option<f64>,

    #[serde(default)]
    pub header_font_bold: Option<bool>,

    #[serde(default)]
    pub header_bg_color: Option<Rgb>,

    #[serde(default)]
    pub header_text_color: Option<Rgb>,

    /// The font size of body cells. Uses the slide's body font size if unset.
    #[serde(default, alias = "font_size")]
    pub body_font_size: Option<f64>,

    #[serde(default)]
    pub body_bg_color: Option<Rgb>,

    #[serde(default)]
    pub text_color: Option<Rgb>,

    /// The font for every cell. Uses the slide's body font if unset.
    #[serde(default)]
    pub font_name: Option<String>,

    #[serde(default)]
    pub border_color: Option<Rgb>,

    /// The border width, in points.
    #[serde(default)]
    pub border_width: Option<f64>,

    #[serde(default)]
    pub text_alignment: Option<Alignment>,

    #[serde(default)]
    pub vertical_alignment: Option<VerticalAnchor>,

    #[serde(default)]
    pub line_spacing: Option<f64>,

    /// The share of the table width each column takes.
    #[serde(default)]
    pub column_width_ratio: Option<Vec<f64>>,

    #[serde(default)]
    pub padding_top: Option<f64>,

    #[serde(default)]
    pub padding_bottom: Option<f64>,

    #[serde(default)]
    pub padding_left: Option<f64>,

    #[serde(default)]
    pub padding_right: Option<f64>,

    #[serde(default)]
    pub auto_wrap_text: Option<bool>,

    /// The labels in the header row.
    #[serde(default)]
    pub header_labels: Option<Vec<String>>,
}

/// A partial shape style.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ShapeStyleOverride {
    #[serde(default)]
    pub shape_type: Option<Geometry>,

    #[serde(default)]
    pub fill_color: Option<Rgb>,

    #[serde(default)]
    pub line_color: Option<Rgb>,

    /// The outline width, in points.
    #[serde(default)]
    pub line_width: Option<f64>,

    /// The text color. Uses the slide's secondary color if unset.
    #[serde(default)]
    pub text_color: Option<Rgb>,

    /// The font size. Uses the slide's body font size if unset.
    #[serde(default)]
    pub font_size: Option<f64>,
}

/// A color theme.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Theme {
    /// The theme this theme extends from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<Rgb>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<Rgb>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Rgb>,

    /// The color used for numbered circles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<Rgb>,
}

impl Theme {
    pub(crate) fn from_slice(name: &str, contents: &[u8]) -> Result<Self, LoadThemeError> {
        serde_json::from_slice(contents).map_err(|e| LoadThemeError::Corrupted(name.into(), e.to_string()))
    }
}

/// The slide transition settings.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AnimationSettings {
    /// Whether slides get a transition at all.
    #[serde(default)]
    pub enabled: Option<bool>,

    #[serde(default)]
    pub transition: Option<TransitionKind>,

    #[serde(default)]
    pub speed: Option<TransitionSpeed>,

    /// Advance to the next slide automatically after this many milliseconds.
    #[serde(default)]
    pub advance_after_ms: Option<u32>,
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_config() {
        let config: DesignConfig = serde_json::from_str("{}").expect("parse failed");
        assert!(config.slide_layouts.is_empty());
        assert_eq!(config.slide_text_settings, StyleOverride::default());
    }

    #[test]
    fn unknown_section() {
        serde_json::from_str::<DesignConfig>(r#"{"slide_footers": {}}"#).expect_err("parse succeeded");
    }

    #[test]
    fn layout_index_alias() {
        let style: StyleOverride = serde_json::from_str(r#"{"default_layout_index": 3}"#).expect("parse failed");
        assert_eq!(style.layout_index, Some(3));
    }

    #[test]
    fn layout_style_is_flattened() {
        let input =
            r#"{"body_font_size": 18, "alignment": "left", "elements": ["title", "left_column", "right_column"]}"#;
        let layout: SlideLayout = serde_json::from_str(input).expect("parse failed");
        assert_eq!(layout.style.body_font_size, Some(18.0));
        assert_eq!(layout.style.alignment, Some(Alignment::Left));
        assert_eq!(
            layout.elements,
            Some(vec![LayoutElement::Title, LayoutElement::LeftColumn, LayoutElement::RightColumn])
        );
    }

    #[rstest]
    #[case::style(r#"{"slide_layouts": {"title_content": {"body_font_sise": 99}}}"#)]
    #[case::element(r#"{"slide_layouts": {"title_content": {"elements": ["footer"]}}}"#)]
    #[case::override_style(r#"{"slide_overrides": {"x": {"body_font_sise": 99}}}"#)]
    fn unknown_fields(#[case] input: &str) {
        let error = serde_json::from_str::<DesignConfig>(input).expect_err("parse succeeded");
        assert!(error.to_string().contains("unknown"), "{error}");
    }

    #[test]
    fn layout_without_elements() {
        let input = r#"{"elements": null, "title_bold": false}"#;
        let layout: SlideLayout = serde_json::from_str(input).expect("parse failed");
        assert_eq!(layout.elements, None);
        assert_eq!(layout.style.title_bold, Some(false));

        let layout: SlideLayout = serde_json::from_str(r#"{"default_layout_index": 2}"#).expect("parse failed");
        assert_eq!(layout.style.layout_index, Some(2));
    }

    #[test]
    fn table_style() {
        let input = r#"{
            "header_bg_color": "E6F0FF",
            "font_size": 18,
            "vertical_alignment": "middle",
            "column_width_ratio": [0.3, 0.7]
        }"#;
        let style: TableStyleOverride = serde_json::from_str(input).expect("parse failed");
        assert_eq!(style.header_bg_color, Some(Rgb::new(230, 240, 255)));
        assert_eq!(style.body_font_size, Some(18.0));
        assert_eq!(style.vertical_alignment, Some(VerticalAnchor::Middle));
    }

    #[test]
    fn schema() {
        let schema = schemars::schema_for!(DesignConfig);
        let schema = serde_json::to_value(schema).expect("serialize failed");
        assert!(schema["properties"]["slide_text_settings"].is_object());
    }
}
