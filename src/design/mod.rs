//! The design system: fonts, colors, layouts, table and shape styles, themes and transitions.
//!
//! The configuration is loaded once and never mutated afterwards. Styles are resolved out of it
//! through a [StyleResolver].

pub(crate) mod clean;
pub(crate) mod fit;
pub(crate) mod raw;
pub(crate) mod registry;

pub use clean::{LayoutTemplate, ResolvedStyle, ShapeStyle, StyleError, StyleResolver, TableStyle};
pub use fit::{fit_text, FittedText};
pub use raw::{
    AnimationSettings, BulletType, DesignConfig, LayoutElement, ShapeStyleOverride, SlideLayout, StyleOverride,
    TableStyleOverride, TextAdaptiveRules, Theme,
};
pub use registry::{LoadThemeError, ThemeRegistry};

use std::{io, path::Path};
use tracing::debug;

/// A loaded design system.
#[derive(Clone, Debug, Default)]
pub struct DesignSystem {
    config: DesignConfig,
    themes: ThemeRegistry,
}

impl DesignSystem {
    /// Build a design system out of a configuration.
    pub fn new(config: DesignConfig) -> Result<Self, LoadDesignError> {
        let themes = ThemeRegistry::new(&config.themes)?;
        debug!(
            layouts = config.slide_layouts.len(),
            overrides = config.slide_overrides.len(),
            themes = config.themes.len(),
            "design system loaded"
        );
        Ok(Self { config, themes })
    }

    /// Load a design system from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadDesignError> {
        let config = DesignConfig::from_path(path)?;
        Self::new(config)
    }

    pub fn config(&self) -> &DesignConfig {
        &self.config
    }

    pub fn themes(&self) -> &ThemeRegistry {
        &self.themes
    }

    /// A style resolver that doesn't use any theme.
    pub fn resolver(&self) -> StyleResolver<'_> {
        StyleResolver::new(self)
    }
}

/// An error loading a design system.
#[derive(thiserror::Error, Debug)]
pub enum LoadDesignError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("invalid design configuration: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error(transparent)]
    Themes(#[from] LoadThemeError),
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn load_sample() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/design_system.json");
        let design = DesignSystem::load(path).expect("loading sample failed");
        let resolver = design.resolver();
        resolver.resolve("title_content", Some("table_slide")).expect("no table override");
        resolver.table_style("default").expect("no default table style");
    }

    #[test]
    fn load_invalid() {
        let dir = tempfile::tempdir().expect("no temp dir");
        let path = dir.path().join("design.json");
        fs::write(&path, r#"{"slide_text_settings": {"body_font_size": "big"}}"#).expect("write failed");
        let result = DesignSystem::load(&path);
        assert!(matches!(result, Err(LoadDesignError::Invalid(_))));
    }

    #[test]
    fn load_missing() {
        let result = DesignSystem::load("/tmp/slidewright/does/not/exist.json");
        assert!(matches!(result, Err(LoadDesignError::Io(_))));
    }
}
