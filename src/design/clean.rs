use super::{
    raw::{BulletType, LayoutElement, ShapeStyleOverride, StyleOverride, TableStyleOverride, Theme},
    DesignSystem,
};
use crate::pptx::{Alignment, Geometry, Rgb, Transition, VerticalAnchor};

const DEFAULT_FONT: &str = "Pretendard";
const DEFAULT_STYLE_NAME: &str = "default";

/// The layouts that exist regardless of the design configuration.
const BUILTIN_LAYOUTS: &[BuiltinLayout] = &[
    BuiltinLayout {
        name: "basic_title",
        layout_index: Some(0),
        elements: &[LayoutElement::Title, LayoutElement::Subtitle],
    },
    BuiltinLayout { name: "title_content", layout_index: None, elements: &[LayoutElement::Title, LayoutElement::Body] },
    BuiltinLayout {
        name: "two_column",
        layout_index: None,
        elements: &[LayoutElement::Title, LayoutElement::LeftColumn, LayoutElement::RightColumn],
    },
    BuiltinLayout {
        name: "text_shape_mix",
        layout_index: None,
        elements: &[LayoutElement::Title, LayoutElement::Shape, LayoutElement::Body],
    },
];

// Layouts only defined in the configuration contain these.
const DEFAULT_ELEMENTS: &[LayoutElement] = &[LayoutElement::Title, LayoutElement::Body];

struct BuiltinLayout {
    name: &'static str,
    layout_index: Option<usize>,
    elements: &'static [LayoutElement],
}

/// A fully resolved slide style.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedStyle {
    pub background_color: Rgb,
    pub title_font: String,
    pub title_font_size: f64,
    pub title_bold: bool,
    pub title_alignment: Alignment,
    pub body_font: String,
    pub body_font_size: f64,
    pub primary_color: Rgb,
    pub secondary_color: Rgb,
    pub bullet_type: BulletType,
    pub circle_color: Rgb,
    pub circle_text_color: Rgb,
    pub line_spacing: f64,
    pub alignment: Alignment,
    pub layout_index: usize,
    pub circle_diameter: f64,
    pub text_indent: f64,
    pub vertical_spacing: f64,
    pub auto_font_resize_threshold: usize,
    pub font_resize_rate: f64,
    pub wrap_text_threshold: usize,
    pub two_column_threshold: usize,
    pub table_style: String,
    pub shape_style: String,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            background_color: Rgb::WHITE,
            title_font: DEFAULT_FONT.into(),
            title_font_size: 36.0,
            title_bold: true,
            title_alignment: Alignment::Center,
            body_font: DEFAULT_FONT.into(),
            body_font_size: 20.0,
            primary_color: Rgb::BLACK,
            secondary_color: Rgb::new(50, 50, 50),
            bullet_type: BulletType::Bullet,
            circle_color: Rgb::new(0, 102, 255),
            circle_text_color: Rgb::WHITE,
            line_spacing: 1.3,
            alignment: Alignment::Center,
            layout_index: 1,
            circle_diameter: 0.4,
            text_indent: 0.8,
            vertical_spacing: 0.5,
            auto_font_resize_threshold: 100,
            font_resize_rate: 0.9,
            wrap_text_threshold: 200,
            two_column_threshold: 8,
            table_style: DEFAULT_STYLE_NAME.into(),
            shape_style: DEFAULT_STYLE_NAME.into(),
        }
    }
}

impl ResolvedStyle {
    /// Overlay a partial style on top of this one.
    pub(crate) fn apply(&mut self, layer: &StyleOverride) {
        let StyleOverride {
            background_color,
            title_font,
            title_font_size,
            title_bold,
            title_alignment,
            body_font,
            body_font_size,
            primary_color,
            secondary_color,
            bullet_type,
            circle_color,
            circle_text_color,
            line_spacing,
            alignment,
            layout_index,
            circle_diameter,
            text_indent,
            vertical_spacing,
            auto_font_resize_threshold,
            font_resize_rate,
            text_adaptive_rules,
            two_column_threshold,
            table_style,
            shape_style,
        } = layer;
        self.background_color = background_color.unwrap_or(self.background_color);
        if let Some(font) = title_font {
            self.title_font = font.clone();
        }
        self.title_font_size = title_font_size.unwrap_or(self.title_font_size);
        self.title_bold = title_bold.unwrap_or(self.title_bold);
        self.title_alignment = title_alignment.unwrap_or(self.title_alignment);
        if let Some(font) = body_font {
            self.body_font = font.clone();
        }
        self.body_font_size = body_font_size.unwrap_or(self.body_font_size);
        self.primary_color = primary_color.unwrap_or(self.primary_color);
        self.secondary_color = secondary_color.unwrap_or(self.secondary_color);
        self.bullet_type = bullet_type.unwrap_or(self.bullet_type);
        self.circle_color = circle_color.unwrap_or(self.circle_color);
        self.circle_text_color = circle_text_color.unwrap_or(self.circle_text_color);
        self.line_spacing = line_spacing.unwrap_or(self.line_spacing);
        self.alignment = alignment.unwrap_or(self.alignment);
        self.layout_index = layout_index.unwrap_or(self.layout_index);
        self.circle_diameter = circle_diameter.unwrap_or(self.circle_diameter);
        self.text_indent = text_indent.unwrap_or(self.text_indent);
        self.vertical_spacing = vertical_spacing.unwrap_or(self.vertical_spacing);
        self.auto_font_resize_threshold = auto_font_resize_threshold.unwrap_or(self.auto_font_resize_threshold);
        self.font_resize_rate = font_resize_rate.unwrap_or(self.font_resize_rate);
        if let Some(rules) = text_adaptive_rules {
            self.wrap_text_threshold = rules.wrap_text_threshold.unwrap_or(self.wrap_text_threshold);
        }
        self.two_column_threshold = two_column_threshold.unwrap_or(self.two_column_threshold);
        if let Some(name) = table_style {
            self.table_style = name.clone();
        }
        if let Some(name) = shape_style {
            self.shape_style = name.clone();
        }
    }

    /// Overlay a theme's colors on top of this style.
    pub(crate) fn apply_theme(&mut self, theme: &Theme) {
        self.primary_color = theme.primary_color.unwrap_or(self.primary_color);
        self.secondary_color = theme.secondary_color.unwrap_or(self.secondary_color);
        self.background_color = theme.background_color.unwrap_or(self.background_color);
        self.circle_color = theme.accent_color.unwrap_or(self.circle_color);
    }
}

/// A layout along with the style slides using it get.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutTemplate {
    pub name: String,
    pub elements: Vec<LayoutElement>,
    pub style: ResolvedStyle,
}

impl LayoutTemplate {
    pub fn has(&self, element: LayoutElement) -> bool {
        self.elements.contains(&element)
    }
}

/// A fully resolved table style.
#[derive(Clone, Debug, PartialEq)]
pub struct TableStyle {
    pub header_font_size: f64,
    pub header_font_bold: bool,
    pub header_bg_color: Rgb,
    pub header_text_color: Rgb,
    pub body_font_size: Option<f64>,
    pub body_bg_color: Rgb,
    pub text_color: Rgb,
    pub font_name: Option<String>,
    pub border_color: Rgb,
    pub border_width: f64,
    pub text_alignment: Alignment,
    pub vertical_alignment: VerticalAnchor,
    pub line_spacing: Option<f64>,
    pub column_width_ratio: Vec<f64>,
    pub padding_top: f64,
    pub padding_bottom: f64,
    pub padding_left: f64,
    pub padding_right: f64,
    pub auto_wrap_text: bool,
    pub header_labels: Vec<String>,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_font_size: 18.0,
            header_font_bold: true,
            header_bg_color: Rgb::new(230, 240, 255),
            header_text_color: Rgb::BLACK,
            body_font_size: None,
            body_bg_color: Rgb::WHITE,
            text_color: Rgb::BLACK,
            font_name: None,
            border_color: Rgb::new(200, 200, 200),
            border_width: 1.0,
            text_alignment: Alignment::Center,
            vertical_alignment: VerticalAnchor::Middle,
            line_spacing: None,
            column_width_ratio: vec![0.3, 0.7],
            padding_top: 5.0,
            padding_bottom: 5.0,
            padding_left: 10.0,
            padding_right: 10.0,
            auto_wrap_text: true,
            header_labels: vec!["용어".into(), "개념".into()],
        }
    }
}

impl TableStyle {
    fn apply(&mut self, layer: &TableStyleOverride) {
        self.header_font_size = layer.header_font_size.unwrap_or(self.header_font_size);
        self.header_font_bold = layer.header_font_bold.unwrap_or(self.header_font_bold);
        self.header_bg_color = layer.header_bg_color.unwrap_or(self.header_bg_color);
        self.header_text_color = layer.header_text_color.unwrap_or(self.header_text_color);
        self.body_font_size = layer.body_font_size.or(self.body_font_size);
        self.body_bg_color = layer.body_bg_color.unwrap_or(self.body_bg_color);
        self.text_color = layer.text_color.unwrap_or(self.text_color);
        self.font_name = layer.font_name.clone().or(self.font_name.take());
        self.border_color = layer.border_color.unwrap_or(self.border_color);
        self.border_width = layer.border_width.unwrap_or(self.border_width);
        self.text_alignment = layer.text_alignment.unwrap_or(self.text_alignment);
        self.vertical_alignment = layer.vertical_alignment.unwrap_or(self.vertical_alignment);
        self.line_spacing = layer.line_spacing.or(self.line_spacing);
        if let Some(ratio) = &layer.column_width_ratio {
            self.column_width_ratio = ratio.clone();
        }
        self.padding_top = layer.padding_top.unwrap_or(self.padding_top);
        self.padding_bottom = layer.padding_bottom.unwrap_or(self.padding_bottom);
        self.padding_left = layer.padding_left.unwrap_or(self.padding_left);
        self.padding_right = layer.padding_right.unwrap_or(self.padding_right);
        self.auto_wrap_text = layer.auto_wrap_text.unwrap_or(self.auto_wrap_text);
        if let Some(labels) = &layer.header_labels {
            self.header_labels = labels.clone();
        }
    }
}

/// A fully resolved shape style.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeStyle {
    pub shape_type: Geometry,
    pub fill_color: Rgb,
    pub line_color: Rgb,
    pub line_width: f64,
    pub text_color: Option<Rgb>,
    pub font_size: Option<f64>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            shape_type: Geometry::RoundedRectangle,
            fill_color: Rgb::new(230, 240, 255),
            line_color: Rgb::new(0, 102, 255),
            line_width: 1.0,
            text_color: None,
            font_size: None,
        }
    }
}

impl ShapeStyle {
    fn apply(&mut self, layer: &ShapeStyleOverride) {
        self.shape_type = layer.shape_type.unwrap_or(self.shape_type);
        self.fill_color = layer.fill_color.unwrap_or(self.fill_color);
        self.line_color = layer.line_color.unwrap_or(self.line_color);
        self.line_width = layer.line_width.unwrap_or(self.line_width);
        self.text_color = layer.text_color.or(self.text_color);
        self.font_size = layer.font_size.or(self.font_size);
    }
}

/// Resolves styles out of a design system.
///
/// Layers are applied in this order, later ones winning attribute by attribute: the built-in
/// defaults, the global text settings, the selected theme's colors, the layout and finally the
/// slide override.
#[derive(Clone, Debug)]
pub struct StyleResolver<'a> {
    design: &'a DesignSystem,
    theme: Option<Theme>,
}

impl<'a> StyleResolver<'a> {
    pub fn new(design: &'a DesignSystem) -> Self {
        Self { design, theme: None }
    }

    /// Use the colors in the given theme.
    pub fn with_theme(mut self, name: &str) -> Result<Self, StyleError> {
        let theme = self
            .design
            .themes()
            .load_by_name(name)
            .map_err(|e| StyleError::Theme(e.to_string()))?
            .ok_or_else(|| StyleError::UnknownTheme(name.into()))?;
        self.theme = Some(theme);
        Ok(self)
    }

    /// Resolve the style for a layout and an optional slide override.
    pub fn resolve(&self, layout: &str, override_key: Option<&str>) -> Result<ResolvedStyle, StyleError> {
        let config = self.design.config();
        let builtin = BUILTIN_LAYOUTS.iter().find(|builtin| builtin.name == layout);
        let entry = config.slide_layouts.get(layout);
        if builtin.is_none() && entry.is_none() {
            return Err(StyleError::UnknownLayout(layout.into()));
        }

        let mut style = ResolvedStyle::default();
        style.apply(&config.slide_text_settings);
        if let Some(theme) = &self.theme {
            style.apply_theme(theme);
        }
        if let Some(index) = builtin.and_then(|builtin| builtin.layout_index) {
            style.layout_index = index;
        }
        if let Some(entry) = entry {
            style.apply(&entry.style);
        }
        if let Some(key) = override_key {
            let layer = config.slide_overrides.get(key).ok_or_else(|| StyleError::UnknownOverride(key.into()))?;
            style.apply(layer);
        }
        Ok(style)
    }

    pub fn has_override(&self, key: &str) -> bool {
        self.design.config().slide_overrides.contains_key(key)
    }

    /// Resolve a layout's elements and style.
    pub fn layout(&self, name: &str, override_key: Option<&str>) -> Result<LayoutTemplate, StyleError> {
        let style = self.resolve(name, override_key)?;
        let configured = self.design.config().slide_layouts.get(name).and_then(|entry| entry.elements.clone());
        let elements = match configured {
            Some(elements) => elements,
            None => BUILTIN_LAYOUTS
                .iter()
                .find(|builtin| builtin.name == name)
                .map(|builtin| builtin.elements)
                .unwrap_or(DEFAULT_ELEMENTS)
                .to_vec(),
        };
        Ok(LayoutTemplate { name: name.into(), elements, style })
    }

    /// Resolve a table style by name.
    pub fn table_style(&self, name: &str) -> Result<TableStyle, StyleError> {
        let styles = &self.design.config().table_styles;
        let mut style = TableStyle::default();
        if let Some(base) = styles.get(DEFAULT_STYLE_NAME) {
            style.apply(base);
        }
        if name != DEFAULT_STYLE_NAME {
            let layer = styles.get(name).ok_or_else(|| StyleError::UnknownTableStyle(name.into()))?;
            style.apply(layer);
        }
        Ok(style)
    }

    /// Resolve a shape style by name.
    pub fn shape_style(&self, name: &str) -> Result<ShapeStyle, StyleError> {
        let styles = &self.design.config().shape_styles;
        let mut style = ShapeStyle::default();
        if let Some(base) = styles.get(DEFAULT_STYLE_NAME) {
            style.apply(base);
        }
        if name != DEFAULT_STYLE_NAME {
            let layer = styles.get(name).ok_or_else(|| StyleError::UnknownShapeStyle(name.into()))?;
            style.apply(layer);
        }
        Ok(style)
    }

    /// The transition every slide gets, if animations are enabled.
    pub fn transition(&self) -> Option<Transition> {
        let settings = &self.design.config().animation_settings;
        if !settings.enabled.unwrap_or(false) {
            return None;
        }
        Some(Transition {
            kind: settings.transition.unwrap_or_default(),
            speed: settings.speed.unwrap_or_default(),
            advance_after_ms: settings.advance_after_ms,
        })
    }
}

/// An error resolving a style.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    #[error("layout '{0}' does not exist")]
    UnknownLayout(String),

    #[error("slide override '{0}' does not exist")]
    UnknownOverride(String),

    #[error("table style '{0}' does not exist")]
    UnknownTableStyle(String),

    #[error("shape style '{0}' does not exist")]
    UnknownShapeStyle(String),

    #[error("theme '{0}' does not exist")]
    UnknownTheme(String),

    #[error("invalid theme: {0}")]
    Theme(String),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::design::{
        raw::{AnimationSettings, DesignConfig, SlideLayout, TextAdaptiveRules},
        DesignSystem,
    };
    use crate::pptx::{TransitionKind, TransitionSpeed};
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn design(config: DesignConfig) -> DesignSystem {
        DesignSystem::new(config).expect("invalid design")
    }

    fn layered_config() -> DesignConfig {
        DesignConfig {
            slide_text_settings: StyleOverride {
                body_font_size: Some(22.0),
                alignment: Some(Alignment::Left),
                background_color: Some(Rgb::new(1, 1, 1)),
                text_adaptive_rules: Some(TextAdaptiveRules { wrap_text_threshold: Some(150) }),
                ..Default::default()
            },
            slide_layouts: BTreeMap::from([(
                "title_content".into(),
                SlideLayout {
                    style: StyleOverride { body_font_size: Some(24.0), ..Default::default() },
                    elements: None,
                },
            )]),
            slide_overrides: BTreeMap::from([(
                "table_slide".into(),
                StyleOverride {
                    body_font_size: Some(16.0),
                    background_color: Some(Rgb::new(245, 245, 245)),
                    text_adaptive_rules: Some(TextAdaptiveRules { wrap_text_threshold: None }),
                    ..Default::default()
                },
            )]),
            ..Default::default()
        }
    }

    #[test]
    fn missing_sections_use_defaults() {
        let design = design(DesignConfig::default());
        let resolver = StyleResolver::new(&design);
        for layout in ["basic_title", "title_content", "two_column", "text_shape_mix"] {
            let style = resolver.resolve(layout, None).expect("resolve failed");
            let expected_index = if layout == "basic_title" { 0 } else { 1 };
            assert_eq!(style, ResolvedStyle { layout_index: expected_index, ..Default::default() });
        }
        assert_eq!(resolver.table_style("default").expect("no table style"), TableStyle::default());
        assert_eq!(resolver.shape_style("default").expect("no shape style"), ShapeStyle::default());
        assert_eq!(resolver.transition(), None);
    }

    #[test]
    fn layers_apply_in_order() {
        let design = design(layered_config());
        let resolver = StyleResolver::new(&design);

        let style = resolver.resolve("two_column", None).expect("resolve failed");
        assert_eq!(style.body_font_size, 22.0);
        assert_eq!(style.alignment, Alignment::Left);

        let style = resolver.resolve("title_content", None).expect("resolve failed");
        assert_eq!(style.body_font_size, 24.0);
        assert_eq!(style.background_color, Rgb::new(1, 1, 1));

        let style = resolver.resolve("title_content", Some("table_slide")).expect("resolve failed");
        assert_eq!(style.body_font_size, 16.0);
        assert_eq!(style.background_color, Rgb::new(245, 245, 245));
        assert_eq!(style.alignment, Alignment::Left);
        // Nested rules merge key by key, so an empty one keeps the threshold below it.
        assert_eq!(style.wrap_text_threshold, 150);
    }

    #[test]
    fn resolution_is_idempotent() {
        let design = design(layered_config());
        let resolver = StyleResolver::new(&design);
        let first = resolver.resolve("title_content", Some("table_slide")).expect("resolve failed");
        let second = resolver.resolve("title_content", Some("table_slide")).expect("resolve failed");
        assert_eq!(first, second);
    }

    #[rstest]
    #[case::layout("nope", None, StyleError::UnknownLayout("nope".into()))]
    #[case::override_key("title_content", Some("nope"), StyleError::UnknownOverride("nope".into()))]
    fn unknown_names(#[case] layout: &str, #[case] key: Option<&str>, #[case] expected: StyleError) {
        let design = design(layered_config());
        let error = StyleResolver::new(&design).resolve(layout, key).expect_err("resolve succeeded");
        assert_eq!(error, expected);
    }

    #[test]
    fn unknown_styles() {
        let design = design(DesignConfig::default());
        let resolver = StyleResolver::new(&design);
        assert_eq!(resolver.table_style("fancy"), Err(StyleError::UnknownTableStyle("fancy".into())));
        assert_eq!(resolver.shape_style("fancy"), Err(StyleError::UnknownShapeStyle("fancy".into())));
        assert!(matches!(resolver.with_theme("fancy"), Err(StyleError::UnknownTheme(_))));
    }

    #[test]
    fn custom_layout() {
        let layout = SlideLayout {
            style: StyleOverride { layout_index: Some(4), ..Default::default() },
            elements: Some(vec![LayoutElement::Title, LayoutElement::Shape]),
        };
        let config = DesignConfig { slide_layouts: BTreeMap::from([("quote".into(), layout)]), ..Default::default() };
        let design = design(config);
        let template = StyleResolver::new(&design).layout("quote", None).expect("resolve failed");
        assert_eq!(template.elements, &[LayoutElement::Title, LayoutElement::Shape]);
        assert_eq!(template.style.layout_index, 4);
        assert!(!template.has(LayoutElement::Body));
    }

    #[test]
    fn theme_colors() {
        let config = DesignConfig {
            slide_text_settings: StyleOverride { primary_color: Some(Rgb::new(9, 9, 9)), ..Default::default() },
            ..Default::default()
        };
        let design = design(config);
        let resolver = StyleResolver::new(&design).with_theme("dark").expect("no dark theme");
        let dark = design.themes().load_by_name("dark").expect("load failed").expect("no dark theme");
        let style = resolver.resolve("title_content", None).expect("resolve failed");
        assert_eq!(Some(style.primary_color), dark.primary_color);
        assert_eq!(Some(style.background_color), dark.background_color);
        assert_eq!(style.body_font_size, 20.0);
    }

    #[test]
    fn named_styles_extend_default() {
        let config = DesignConfig {
            table_styles: BTreeMap::from([
                ("default".into(), TableStyleOverride { header_font_size: Some(20.0), ..Default::default() }),
                ("compact".into(), TableStyleOverride { padding_top: Some(1.0), ..Default::default() }),
            ]),
            ..Default::default()
        };
        let design = design(config);
        let style = StyleResolver::new(&design).table_style("compact").expect("no table style");
        assert_eq!(style.header_font_size, 20.0);
        assert_eq!(style.padding_top, 1.0);
        assert_eq!(style.padding_bottom, 5.0);
    }

    #[test]
    fn transitions() {
        let animation_settings =
            AnimationSettings { enabled: Some(true), speed: Some(TransitionSpeed::Fast), ..Default::default() };
        let design = design(DesignConfig { animation_settings, ..Default::default() });
        let transition = StyleResolver::new(&design).transition().expect("no transition");
        assert_eq!(transition.kind, TransitionKind::Fade);
        assert_eq!(transition.speed, TransitionSpeed::Fast);
    }
}
