//! Builds styled slides out of content.

mod list;
mod table;
mod text;


use crate::{
    content::{SlideContent, Term, Topic, TopicNode},
    design::{FittedText, LayoutElement, LayoutTemplate, StyleError, StyleResolver},
    pptx::{Presentation, PptxError, Rect, ShapeRole, Slide, Transition},
};
use tracing::{debug, info, warn};

pub(crate) const BASIC_TITLE: &str = "basic_title";
pub(crate) const TITLE_CONTENT: &str = "title_content";
pub(crate) const TWO_COLUMN: &str = "two_column";
pub(crate) const TEXT_SHAPE_MIX: &str = "text_shape_mix";

/// The override applied to table slides, when it's defined.
const TABLE_OVERRIDE: &str = "table_slide";

const GENERATED_COMMENT: &str = "Automatically generated presentation";

/// An area of a slide, in inches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Region {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

impl Region {
    const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub(crate) fn rect(&self) -> Rect {
        Rect::from_inches(self.x, self.y, self.width, self.height)
    }
}

const TITLE: Region = Region::new(0.5, 0.4, 9.0, 1.2);
const COVER_TITLE: Region = Region::new(0.5, 2.4, 9.0, 1.5);
const SUBTITLE: Region = Region::new(1.0, 4.2, 8.0, 1.2);
const BODY: Region = Region::new(0.75, 1.8, 8.5, 5.0);
const LEFT_COLUMN: Region = Region::new(0.5, 1.8, 4.4, 5.0);
const RIGHT_COLUMN: Region = Region::new(5.1, 1.8, 4.4, 5.0);
const SHAPE: Region = Region::new(0.75, 1.9, 8.5, 4.6);
const TABLE: Region = Region::new(1.0, 2.0, 8.0, 4.5);

/// Builds slides by resolving the style of every element they contain.
pub struct SlideBuilder<'a> {
    resolver: StyleResolver<'a>,
    transition: Option<Transition>,
}

impl<'a> SlideBuilder<'a> {
    pub fn new(resolver: StyleResolver<'a>) -> Self {
        let transition = resolver.transition();
        Self { resolver, transition }
    }

    /// Build a presentation out of some content.
    ///
    /// This creates a title slide followed by the slides for every topic, in order.
    pub fn build(&self, content: &SlideContent) -> Result<Presentation, BuildError> {
        let mut presentation = Presentation::new();
        let properties = presentation.properties_mut();
        properties.title = Some(content.title.clone());
        properties.author = content.author.clone();
        properties.subject = content.subject.clone();
        properties.keywords = content.keywords.clone();
        properties.comments = Some(content.comments.clone().unwrap_or_else(|| GENERATED_COMMENT.into()));

        self.push_cover(&mut presentation, &content.title, content.subtitle_text())?;
        for topic in &content.topics {
            self.push_topic(&mut presentation, topic)?;
        }
        info!(slides = presentation.slide_count(), "presentation built");
        Ok(presentation)
    }

    /// Add an empty slide that uses a layout, optionally with a title. Returns the slide's index.
    pub fn add_slide(
        &self,
        presentation: &mut Presentation,
        layout: &str,
        title: Option<&str>,
        override_key: Option<&str>,
    ) -> Result<usize, BuildError> {
        let template = self.resolver.layout(layout, override_key)?;
        let slide = self.new_slide(presentation, &template)?;
        if let Some(title) = title {
            let region = if layout == BASIC_TITLE { COVER_TITLE } else { TITLE };
            push_title(slide, &template, region, title);
        }
        Ok(presentation.slide_count() - 1)
    }

    /// Set or replace a slide's title.
    pub fn set_title(
        &self,
        presentation: &mut Presentation,
        slide_index: usize,
        title: &str,
        override_key: Option<&str>,
    ) -> Result<(), BuildError> {
        let slide = presentation.slide_mut(slide_index)?;
        let layout = slide_layout(slide);
        let template = self.resolver.layout(&layout, override_key)?;
        let frame = text::title_frame(title, &template.style);
        match slide.text_frame_mut(ShapeRole::Title) {
            Some(current) => *current = frame,
            None => {
                let region = if layout == BASIC_TITLE { COVER_TITLE } else { TITLE };
                slide.add_text_box(ShapeRole::Title, region.rect(), frame);
            }
        }
        Ok(())
    }

    /// Set the body text of a slide, fitting it to the slide's style.
    ///
    /// This replaces everything in the slide's body, including both columns of a two column slide.
    pub fn add_content(
        &self,
        presentation: &mut Presentation,
        slide_index: usize,
        content: &str,
        override_key: Option<&str>,
    ) -> Result<FittedText, BuildError> {
        let slide = presentation.slide_mut(slide_index)?;
        let layout = slide_layout(slide);
        let template = self.resolver.layout(&layout, override_key)?;
        let (frame, fitted) = text::body_frame(content, &template.style);
        clear_body(slide);
        slide.add_text_box(ShapeRole::Body, BODY.rect(), frame);
        Ok(fitted)
    }

    /// Set a slide's body to a list of items. Returns the number of items added.
    ///
    /// Layouts with two columns get the items split between them.
    pub fn add_bullets(
        &self,
        presentation: &mut Presentation,
        slide_index: usize,
        items: &[String],
        override_key: Option<&str>,
    ) -> Result<usize, BuildError> {
        let slide = presentation.slide_mut(slide_index)?;
        let layout = slide_layout(slide);
        let template = self.resolver.layout(&layout, override_key)?;
        clear_body(slide);
        push_items(slide, &template, items);
        Ok(items.len())
    }

    fn push_cover(
        &self,
        presentation: &mut Presentation,
        title: &str,
        subtitle: Option<&str>,
    ) -> Result<(), BuildError> {
        let template = self.resolver.layout(BASIC_TITLE, None)?;
        let slide = self.new_slide(presentation, &template)?;
        push_title(slide, &template, COVER_TITLE, title);
        if let Some(subtitle) = subtitle.filter(|_| template.has(LayoutElement::Subtitle)) {
            let frame = text::subtitle_frame(subtitle, &template.style);
            slide.add_text_box(ShapeRole::Subtitle, SUBTITLE.rect(), frame);
        }
        Ok(())
    }

    fn push_topic(&self, presentation: &mut Presentation, topic: &Topic) -> Result<(), BuildError> {
        debug!(topic = %topic.key, "building topic");
        match &topic.node {
            TopicNode::Bullets(items) => self.push_bullets(presentation, &topic.title, items),
            TopicNode::Text(text) => self.push_text(presentation, &topic.title, text),
            TopicNode::Terms(terms) => self.push_terms(presentation, &topic.title, terms),
            TopicNode::Section(children) => {
                let template = self.resolver.layout(BASIC_TITLE, None)?;
                let slide = self.new_slide(presentation, &template)?;
                push_title(slide, &template, COVER_TITLE, &topic.title);
                for child in children {
                    self.push_topic(presentation, child)?;
                }
                Ok(())
            }
        }
    }

    fn push_bullets(&self, presentation: &mut Presentation, title: &str, items: &[String]) -> Result<(), BuildError> {
        let threshold = self.resolver.resolve(TITLE_CONTENT, None)?.two_column_threshold;
        let layout = if items.len() > threshold { TWO_COLUMN } else { TITLE_CONTENT };
        let template = self.resolver.layout(layout, None)?;
        let slide = self.new_slide(presentation, &template)?;
        push_title(slide, &template, TITLE, title);

        if has_columns(&template) || template.has(LayoutElement::Body) {
            push_items(slide, &template, items);
        } else {
            warn!(layout = %template.name, "layout has no body, dropping list items");
        }
        Ok(())
    }

    fn push_text(&self, presentation: &mut Presentation, title: &str, text: &str) -> Result<(), BuildError> {
        let template = self.resolver.layout(TEXT_SHAPE_MIX, None)?;
        let shape_style = self.resolver.shape_style(&template.style.shape_style)?;
        let slide = self.new_slide(presentation, &template)?;
        push_title(slide, &template, TITLE, title);
        if template.has(LayoutElement::Shape) {
            text::push_text_shape(slide, SHAPE, text, &template.style, &shape_style);
        } else if template.has(LayoutElement::Body) {
            let (frame, _) = text::body_frame(text, &template.style);
            slide.add_text_box(ShapeRole::Body, BODY.rect(), frame);
        } else {
            warn!(layout = %template.name, "layout has no body, dropping text");
        }
        Ok(())
    }

    fn push_terms(&self, presentation: &mut Presentation, title: &str, terms: &[Term]) -> Result<(), BuildError> {
        let override_key = self.resolver.has_override(TABLE_OVERRIDE).then_some(TABLE_OVERRIDE);
        let template = self.resolver.layout(TITLE_CONTENT, override_key)?;
        let table_style = self.resolver.table_style(&template.style.table_style)?;
        let slide = self.new_slide(presentation, &template)?;
        push_title(slide, &template, TITLE, title);
        let table = table::term_table(terms, TABLE, &template.style, &table_style);
        slide.add_table(TABLE.rect(), table);
        Ok(())
    }

    fn new_slide<'p>(
        &self,
        presentation: &'p mut Presentation,
        template: &LayoutTemplate,
    ) -> Result<&'p mut Slide, BuildError> {
        let slide = presentation.add_slide(template.style.layout_index, template.name.clone())?;
        slide.set_background(template.style.background_color);
        if let Some(transition) = &self.transition {
            slide.set_transition(transition.clone());
        }
        Ok(slide)
    }
}

// Lists drawn with shapes are part of the body too.
fn clear_body(slide: &mut Slide) {
    slide.remove_shapes(ShapeRole::Body);
    slide.remove_shapes(ShapeRole::ListItem);
}

fn has_columns(template: &LayoutTemplate) -> bool {
    template.has(LayoutElement::LeftColumn) && template.has(LayoutElement::RightColumn)
}

fn push_items(slide: &mut Slide, template: &LayoutTemplate, items: &[String]) {
    let style = &template.style;
    if has_columns(template) {
        let (left, right) = items.split_at(items.len().div_ceil(2));
        list::push_list(slide, LEFT_COLUMN, left, 0, style);
        list::push_list(slide, RIGHT_COLUMN, right, left.len(), style);
    } else {
        list::push_list(slide, BODY, items, 0, style);
    }
}

fn push_title(slide: &mut Slide, template: &LayoutTemplate, region: Region, title: &str) {
    if template.has(LayoutElement::Title) {
        slide.add_text_box(ShapeRole::Title, region.rect(), text::title_frame(title, &template.style));
    }
}

// Slides not built here have no layout name.
fn slide_layout(slide: &Slide) -> String {
    match slide.name() {
        "" => TITLE_CONTENT.into(),
        name => name.into(),
    }
}

/// An error building slides.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Pptx(#[from] PptxError),
}
