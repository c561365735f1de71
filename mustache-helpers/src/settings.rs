//! Engine-wide configuration, fixed once built

use std::fmt;

use crate::{
    parser::{Parser, ParserPipelineBuilder, token::{Tags, Token}},
    renderer::{TokenRenderer, stock},
    value::ValueKind,
};

/// Immutable configuration shared by every render
pub struct RendererSettings {
    parser: Parser,
    token_renderers: Vec<Box<dyn TokenRenderer>>,
    section_exclusions: Vec<ValueKind>,
    default_tags: Tags,
}

impl RendererSettings {
    pub fn builder() -> RendererSettingsBuilder {
        RendererSettingsBuilder::new()
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// Delimiters a template starts with
    pub fn default_tags(&self) -> &Tags {
        &self.default_tags
    }

    /// Whether sections render values of `kind` once instead of iterating them
    pub fn is_excluded_from_sections(&self, kind: ValueKind) -> bool {
        self.section_exclusions.contains(&kind)
    }

    /// The first token renderer accepting `token`
    pub fn renderer_for(&self, token: &Token) -> Option<&dyn TokenRenderer> {
        self.token_renderers
            .iter()
            .find(|renderer| renderer.accepts(token))
            .map(|renderer| &**renderer)
    }
}

impl fmt::Debug for RendererSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererSettings")
            .field("parsers", &self.parser.names())
            .field("token_renderers", &self.token_renderers.len())
            .field("section_exclusions", &self.section_exclusions)
            .field("default_tags", &self.default_tags)
            .finish()
    }
}

impl Default for RendererSettings {
    fn default() -> Self {
        RendererSettingsBuilder::new().build()
    }
}

/// Builds [`RendererSettings`] starting from the stock tags and renderers
pub struct RendererSettingsBuilder {
    pipeline: ParserPipelineBuilder,
    token_renderers: Vec<Box<dyn TokenRenderer>>,
    section_exclusions: Vec<ValueKind>,
    default_tags: Tags,
}

impl RendererSettingsBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            pipeline: ParserPipelineBuilder::new(),
            token_renderers: Vec::new(),
            section_exclusions: Vec::new(),
            default_tags: Tags::default(),
        };
        stock::add_builtins(&mut builder);
        builder
    }

    /// Edits the ordered list of tag parsers
    pub fn configure_parser_pipeline(
        &mut self,
        configure: impl FnOnce(&mut ParserPipelineBuilder),
    ) -> &mut Self {
        configure(&mut self.pipeline);
        self
    }

    /// Appends a token renderer; earlier renderers take precedence
    pub fn add_token_renderer(&mut self, renderer: impl TokenRenderer + 'static) -> &mut Self {
        self.token_renderers.push(Box::new(renderer));
        self
    }

    pub fn exclude_from_sections(&mut self, kind: ValueKind) -> &mut Self {
        if !self.section_exclusions.contains(&kind) {
            self.section_exclusions.push(kind);
        }
        self
    }

    pub fn set_default_tags(&mut self, tags: Tags) -> &mut Self {
        self.default_tags = tags;
        self
    }

    pub fn build(self) -> RendererSettings {
        RendererSettings {
            parser: self.pipeline.build(),
            token_renderers: self.token_renderers,
            section_exclusions: self.section_exclusions,
            default_tags: self.default_tags,
        }
    }
}

impl Default for RendererSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
