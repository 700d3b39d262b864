//! slidewright: styled `.pptx` generation driven by a design system.
//!
//! Content files are turned into slides by the [SlideBuilder], using the fonts, colors and layouts
//! a [DesignSystem] resolves for every element. The same operations are exposed as MCP tools by
//! the [SlideRouter].

pub mod builder;
pub mod content;
pub mod design;
pub mod generate;
pub mod pptx;
pub mod server;

pub use crate::{
    builder::{BuildError, SlideBuilder},
    content::{ContentError, SlideContent},
    design::{DesignConfig, DesignSystem, LoadDesignError, StyleError, StyleResolver},
    generate::{GenerateError, Generator},
    pptx::{Presentation, PptxError},
    server::{serve_stdio, serve_tcp, ServerState, SlideRouter, ToolCallError},
};
