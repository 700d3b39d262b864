use super::{ServerState, ToolCallError};
use crate::{
    builder::{SlideBuilder, TITLE_CONTENT},
    design::DesignSystem,
    generate::Generator,
    pptx::Presentation,
};
use mcp_spec::tool::Tool;
use schemars::{schema_for, JsonSchema};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use strum::IntoEnumIterator;
use tracing::{debug, info};

/// The tools this server exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum ToolName {
    CreatePresentation,
    OpenPresentation,
    SavePresentation,
    AddSlideToPresentation,
    SetSlideTitle,
    AddContentToSlide,
    AddBulletPointsToSlide,
    GenerateFromTemplate,
}

impl ToolName {
    fn description(&self) -> &'static str {
        match self {
            Self::CreatePresentation => "Create a new empty presentation, optionally using a theme's colors.",
            Self::OpenPresentation => "Open an existing .pptx file.",
            Self::SavePresentation => {
                "Save an open presentation. Relative paths are resolved against the output directory."
            }
            Self::AddSlideToPresentation => "Add a slide using one of the design's layouts, optionally with a title.",
            Self::SetSlideTitle => "Set or replace the title of a slide.",
            Self::AddContentToSlide => "Set the body text of a slide. Long texts are shrunk and wrapped to fit.",
            Self::AddBulletPointsToSlide => "Set the body of a slide to a list of bullet points.",
            Self::GenerateFromTemplate => "Generate a whole presentation out of a content file and a design file.",
        }
    }

    fn input_schema(&self) -> Value {
        let schema = match self {
            Self::CreatePresentation => schema_for!(CreatePresentationArgs),
            Self::OpenPresentation => schema_for!(OpenPresentationArgs),
            Self::SavePresentation => schema_for!(SavePresentationArgs),
            Self::AddSlideToPresentation => schema_for!(AddSlideArgs),
            Self::SetSlideTitle => schema_for!(SetTitleArgs),
            Self::AddContentToSlide => schema_for!(AddContentArgs),
            Self::AddBulletPointsToSlide => schema_for!(AddBulletPointsArgs),
            Self::GenerateFromTemplate => schema_for!(GenerateArgs),
        };
        serde_json::to_value(schema).unwrap_or_default()
    }

    fn tool(&self) -> Tool {
        Tool::new(self.to_string(), self.description(), self.input_schema())
    }
}

/// The definitions of every tool.
pub(crate) fn tools() -> Vec<Tool> {
    ToolName::iter().map(|name| name.tool()).collect()
}

#[derive(Deserialize, JsonSchema)]
struct CreatePresentationArgs {
    /// The theme whose colors the presentation's slides use.
    #[serde(default)]
    theme: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
struct OpenPresentationArgs {
    /// The path to the .pptx file.
    file_path: PathBuf,
}

#[derive(Deserialize, JsonSchema)]
struct SavePresentationArgs {
    presentation_id: String,

    /// Where to save the presentation. Defaults to `<presentation_id>.pptx` in the output directory.
    #[serde(default)]
    file_path: Option<PathBuf>,
}

#[derive(Deserialize, JsonSchema)]
struct AddSlideArgs {
    presentation_id: String,

    /// The layout to use. Defaults to `title_content`.
    #[serde(default)]
    layout: Option<String>,

    #[serde(default)]
    title: Option<String>,

    /// The slide override to apply on top of the layout's style.
    #[serde(default, rename = "override")]
    override_key: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
struct SetTitleArgs {
    presentation_id: String,
    slide_index: usize,
    title: String,

    /// The slide override to apply on top of the layout's style.
    #[serde(default, rename = "override")]
    override_key: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
struct AddContentArgs {
    presentation_id: String,
    slide_index: usize,
    content: String,

    /// The slide override to apply on top of the layout's style.
    #[serde(default, rename = "override")]
    override_key: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
struct AddBulletPointsArgs {
    presentation_id: String,
    slide_index: usize,
    bullet_points: Vec<String>,

    /// The slide override to apply on top of the layout's style.
    #[serde(default, rename = "override")]
    override_key: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
struct GenerateArgs {
    /// The path to the content JSON file.
    content_path: PathBuf,

    /// The path to a design JSON file. Defaults to the server's design.
    #[serde(default)]
    design_path: Option<PathBuf>,

    /// Where to write the presentation. Defaults to `<content file name>_generated.pptx` in the output directory.
    #[serde(default)]
    output_path: Option<PathBuf>,

    #[serde(default)]
    theme: Option<String>,
}

fn parse<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolCallError> {
    // Clients may omit arguments entirely.
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments).map_err(ToolCallError::InvalidArguments)
}

impl ServerState {
    /// Execute a tool call.
    pub(crate) fn call(&self, tool: ToolName, arguments: Value) -> Result<Value, ToolCallError> {
        match tool {
            ToolName::CreatePresentation => self.create_presentation(parse(arguments)?),
            ToolName::OpenPresentation => self.open_presentation(parse(arguments)?),
            ToolName::SavePresentation => self.save_presentation(parse(arguments)?),
            ToolName::AddSlideToPresentation => self.add_slide(parse(arguments)?),
            ToolName::SetSlideTitle => self.set_title(parse(arguments)?),
            ToolName::AddContentToSlide => self.add_content(parse(arguments)?),
            ToolName::AddBulletPointsToSlide => self.add_bullet_points(parse(arguments)?),
            ToolName::GenerateFromTemplate => self.generate(parse(arguments)?),
        }
    }

    fn create_presentation(&self, args: CreatePresentationArgs) -> Result<Value, ToolCallError> {
        let CreatePresentationArgs { theme } = args;
        // Unknown themes fail here rather than when the first slide is added.
        self.resolver(theme.as_deref())?;
        let mut store = self.store();
        let id = store.insert(Presentation::new(), theme);
        debug!(open = store.len(), "presentation stored");
        Ok(json!({
            "success": true,
            "presentation_id": id,
            "message": format!("created presentation {id}"),
        }))
    }

    fn open_presentation(&self, args: OpenPresentationArgs) -> Result<Value, ToolCallError> {
        let presentation = Presentation::open(&args.file_path)?;
        let slide_count = presentation.slide_count();
        let mut store = self.store();
        let id = store.insert(presentation, None);
        debug!(open = store.len(), "presentation stored");
        Ok(json!({
            "success": true,
            "presentation_id": id,
            "slide_count": slide_count,
            "message": format!("opened {} as {id}", args.file_path.display()),
        }))
    }

    fn save_presentation(&self, args: SavePresentationArgs) -> Result<Value, ToolCallError> {
        let SavePresentationArgs { presentation_id, file_path } = args;
        let mut store = self.store();
        let session = store.get_mut(&presentation_id)?;
        let path = match file_path {
            Some(path) => self.resolve_output(path),
            None => self.output_dir.join(format!("{presentation_id}.pptx")),
        };
        let path = session.presentation.save(&path)?;
        info!(presentation = %presentation_id, path = %path.display(), "presentation saved");
        Ok(json!({
            "success": true,
            "file_path": path.display().to_string(),
            "message": format!("saved {presentation_id} to {}", path.display()),
        }))
    }

    fn add_slide(&self, args: AddSlideArgs) -> Result<Value, ToolCallError> {
        let AddSlideArgs { presentation_id, layout, title, override_key } = args;
        let layout = layout.unwrap_or_else(|| TITLE_CONTENT.into());
        let mut store = self.store();
        let session = store.get_mut(&presentation_id)?;
        let builder = SlideBuilder::new(self.resolver(session.theme.as_deref())?);
        let slide_index =
            builder.add_slide(&mut session.presentation, &layout, title.as_deref(), override_key.as_deref())?;
        Ok(json!({
            "success": true,
            "slide_index": slide_index,
            "layout": layout,
            "message": format!("added slide {slide_index} using layout {layout}"),
        }))
    }

    fn set_title(&self, args: SetTitleArgs) -> Result<Value, ToolCallError> {
        let SetTitleArgs { presentation_id, slide_index, title, override_key } = args;
        let mut store = self.store();
        let session = store.get_mut(&presentation_id)?;
        let builder = SlideBuilder::new(self.resolver(session.theme.as_deref())?);
        builder.set_title(&mut session.presentation, slide_index, &title, override_key.as_deref())?;
        Ok(json!({
            "success": true,
            "message": format!("set the title of slide {slide_index}"),
        }))
    }

    fn add_content(&self, args: AddContentArgs) -> Result<Value, ToolCallError> {
        let AddContentArgs { presentation_id, slide_index, content, override_key } = args;
        let mut store = self.store();
        let session = store.get_mut(&presentation_id)?;
        let builder = SlideBuilder::new(self.resolver(session.theme.as_deref())?);
        let fitted = builder.add_content(&mut session.presentation, slide_index, &content, override_key.as_deref())?;
        Ok(json!({
            "success": true,
            "font_size": fitted.font_size,
            "wrapped": fitted.wrapped,
            "message": format!("set the content of slide {slide_index}"),
        }))
    }

    fn add_bullet_points(&self, args: AddBulletPointsArgs) -> Result<Value, ToolCallError> {
        let AddBulletPointsArgs { presentation_id, slide_index, bullet_points, override_key } = args;
        let mut store = self.store();
        let session = store.get_mut(&presentation_id)?;
        let builder = SlideBuilder::new(self.resolver(session.theme.as_deref())?);
        let count =
            builder.add_bullets(&mut session.presentation, slide_index, &bullet_points, override_key.as_deref())?;
        Ok(json!({
            "success": true,
            "count": count,
            "message": format!("added {count} bullet points to slide {slide_index}"),
        }))
    }

    fn generate(&self, args: GenerateArgs) -> Result<Value, ToolCallError> {
        let GenerateArgs { content_path, design_path, output_path, theme } = args;
        let loaded = design_path.map(DesignSystem::load).transpose()?;
        let design = loaded.as_ref().unwrap_or(&self.design);
        let output_path = output_path.map(|path| self.resolve_output(path));
        let generator = Generator::new(design, &self.output_dir).with_theme(theme);
        let path = generator.generate(&content_path, output_path.as_deref())?;
        Ok(json!({
            "success": true,
            "output_path": path.display().to_string(),
            "message": format!("generated {}", path.display()),
        }))
    }
}
