//! Entry point tying the parser, the renderers and the settings together

use tokio::io::AsyncWrite;

use crate::{
    context::{Context, RenderSettings},
    error::Result,
    parser::token::Token,
    renderer::{AsyncRenderer, Renderer},
    settings::{RendererSettings, RendererSettingsBuilder},
    value::Value,
};

/// A parsed template, ready to be rendered any number of times
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

/// A configured template engine
///
/// ```rust
/// use mustache_helpers::{HelperExtensions, HelperRegistry, Mustache, helper};
///
/// let helpers = HelperRegistry::builder()
///     .register("Shout", helper!(|_, text: String| text.to_uppercase()))
///     .build()
///     .unwrap();
/// let mustache = Mustache::builder()
///     .configure(|settings| {
///         settings.add_helpers(helpers);
///     })
///     .build();
///
/// let out = mustache
///     .render("{{Shout name}}", serde_json::json!({ "name": "King" }))
///     .unwrap();
/// assert_eq!(out, "KING");
/// ```
#[derive(Debug, Default)]
pub struct Mustache {
    settings: RendererSettings,
}

impl Mustache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MustacheBuilder {
        MustacheBuilder::default()
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// Parses a template with the default delimiters
    pub fn compile(&self, template: &str) -> Result<Template> {
        let tokens = self
            .settings
            .parser()
            .parse(template, self.settings.default_tags())?;
        Ok(Template { tokens })
    }

    pub fn render(&self, template: &str, view: impl Into<Value>) -> Result<String> {
        self.render_with(template, view, &RenderSettings::default())
    }

    pub fn render_with(
        &self,
        template: &str,
        view: impl Into<Value>,
        render_settings: &RenderSettings,
    ) -> Result<String> {
        let template = self.compile(template)?;
        self.render_template(&template, view, render_settings)
    }

    pub fn render_template(
        &self,
        template: &Template,
        view: impl Into<Value>,
        render_settings: &RenderSettings,
    ) -> Result<String> {
        let context = Context::new(view.into(), &self.settings, render_settings);
        let mut renderer = Renderer::new();
        renderer.render(&template.tokens, &context)?;
        Ok(renderer.into_output())
    }

    /// Renders into an asynchronous writer, producing the same output as [`Mustache::render_with`]
    pub async fn render_async<W>(
        &self,
        template: &str,
        view: impl Into<Value>,
        render_settings: &RenderSettings,
        output: &mut W,
    ) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let template = self.compile(template)?;
        let context = Context::new(view.into(), &self.settings, render_settings);
        let mut renderer = AsyncRenderer::new(output);
        renderer.render(&template.tokens, &context).await?;
        renderer.flush().await
    }
}

/// Builds a [`Mustache`] from the stock settings
#[derive(Default)]
pub struct MustacheBuilder {
    settings: RendererSettingsBuilder,
}

impl MustacheBuilder {
    pub fn configure(mut self, configure: impl FnOnce(&mut RendererSettingsBuilder)) -> Self {
        configure(&mut self.settings);
        self
    }

    pub fn build(self) -> Mustache {
        Mustache {
            settings: self.settings.build(),
        }
    }
}
