use crate::{
    context::{Context, RenderSettings},
    locale::Locale,
    value::Value,
};

/// What a helper sees of the render in progress
///
/// Section helpers additionally get the unparsed body of their section.
#[derive(Debug, Clone, Copy)]
pub struct HelperContext<'a> {
    context: &'a Context<'a>,
    content: Option<&'a str>,
}

impl<'a> HelperContext<'a> {
    pub fn new(context: &'a Context<'a>) -> Self {
        Self {
            context,
            content: None,
        }
    }

    pub fn with_content(context: &'a Context<'a>, content: &'a str) -> Self {
        Self {
            context,
            content: Some(content),
        }
    }

    /// Resolves a path against the scope the helper was called in
    pub fn lookup(&self, path: &str) -> Value {
        self.context.lookup(path)
    }

    pub fn render_settings(&self) -> &'a RenderSettings {
        self.context.render_settings()
    }

    pub fn locale(&self) -> &'a Locale {
        self.context.locale()
    }

    /// The raw section body, for section helpers
    pub fn content(&self) -> Option<&'a str> {
        self.content
    }
}
