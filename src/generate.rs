//! One-shot generation of a presentation file out of a content file.

use crate::{
    builder::{BuildError, SlideBuilder},
    content::{ContentError, SlideContent},
    design::{DesignSystem, StyleError},
    pptx::PptxError,
};
use std::path::{Path, PathBuf};
use tracing::info;

const GENERATED_SUFFIX: &str = "_generated.pptx";

/// Generates presentations using a design system.
#[derive(Clone, Debug)]
pub struct Generator<'a> {
    design: &'a DesignSystem,
    theme: Option<String>,
    output_dir: PathBuf,
}

impl<'a> Generator<'a> {
    /// Construct a generator that writes files without an explicit path into `output_dir`.
    pub fn new<P: Into<PathBuf>>(design: &'a DesignSystem, output_dir: P) -> Self {
        Self { design, theme: None, output_dir: output_dir.into() }
    }

    /// Use a theme's colors in generated presentations.
    pub fn with_theme(mut self, theme: Option<String>) -> Self {
        self.theme = theme;
        self
    }

    /// Generate a presentation out of a content file and return the path it was written to.
    pub fn generate(&self, content_path: &Path, output_path: Option<&Path>) -> Result<PathBuf, GenerateError> {
        let content = SlideContent::from_path(content_path)?;
        let mut resolver = self.design.resolver();
        if let Some(theme) = &self.theme {
            resolver = resolver.with_theme(theme)?;
        }
        let presentation = SlideBuilder::new(resolver).build(&content)?;
        let output_path = self.output_path(content_path, output_path);
        let path = presentation.save(&output_path)?;
        info!(path = %path.display(), slides = presentation.slide_count(), "presentation generated");
        Ok(path)
    }

    /// The path a presentation generated out of the given content file is written to.
    ///
    /// An explicit path is used as is. Otherwise this is `<output dir>/<content file stem>_generated.pptx`.
    pub fn output_path(&self, content_path: &Path, output_path: Option<&Path>) -> PathBuf {
        if let Some(path) = output_path {
            return path.into();
        }
        let stem = content_path.file_stem().map(|stem| stem.to_string_lossy()).unwrap_or_default();
        self.output_dir.join(format!("{stem}{GENERATED_SUFFIX}"))
    }
}

/// An error generating a presentation.
#[derive(thiserror::Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("saving presentation: {0}")]
    Pptx(#[from] PptxError),
}
