//! Token rendering
//!
//! Each token is handed to the first [`TokenRenderer`] in the settings that
//! accepts it. Rendering comes in two flavours sharing the same renderers:
//! [`Renderer`] collects output in a `String`, [`AsyncRenderer`] streams it to
//! a tokio writer. Both visit tokens in document order.

pub mod stock;

use std::{future::Future, pin::Pin};

use log::{debug, trace};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{
    context::Context,
    error::Result,
    parser::token::{Block, BlockToken, CallToken, Token},
    value::{SharedEnumerator, Value, ValueKind},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Writes one kind of token
pub trait TokenRenderer: Send + Sync {
    fn accepts(&self, token: &Token) -> bool;

    fn write(&self, renderer: &mut Renderer, token: &Token, context: &Context<'_>) -> Result<()>;

    fn write_async<'a>(
        &'a self,
        renderer: &'a mut AsyncRenderer<'_>,
        token: &'a Token,
        context: &'a Context<'_>,
    ) -> BoxFuture<'a, Result<()>>;
}

/// Renders into an owned string
#[derive(Debug, Default)]
pub struct Renderer {
    output: String,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub fn render(&mut self, tokens: &[Token], context: &Context<'_>) -> Result<()> {
        for token in tokens {
            match context.renderer_settings().renderer_for(token) {
                Some(renderer) => renderer.write(self, token, context)?,
                None => debug!("no renderer accepts {:?}", token),
            }
        }
        Ok(())
    }

    pub fn into_output(self) -> String {
        self.output
    }
}

/// Renders into an asynchronous writer
pub struct AsyncRenderer<'w> {
    output: &'w mut (dyn AsyncWrite + Unpin + Send),
}

impl<'w> AsyncRenderer<'w> {
    pub fn new(output: &'w mut (dyn AsyncWrite + Unpin + Send)) -> Self {
        Self { output }
    }

    pub async fn write(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        Ok(())
    }

    pub fn render<'a>(
        &'a mut self,
        tokens: &'a [Token],
        context: &'a Context<'_>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            for token in tokens {
                match context.renderer_settings().renderer_for(token) {
                    Some(renderer) => renderer.write_async(self, token, context).await?,
                    None => debug!("no renderer accepts {:?}", token),
                }
            }
            Ok(())
        })
    }

    pub async fn flush(&mut self) -> Result<()> {
        self.output.flush().await?;
        Ok(())
    }
}

/// How a section renders its children for a given value
#[derive(Debug)]
pub(crate) enum SectionPlan {
    Skip,
    /// Parse the text with the section's delimiters and render it in place
    Reparse(String),
    Each(Vec<Value>),
    /// Render once per value, resetting the enumerator afterwards
    Drain(SharedEnumerator),
    Once(Value),
}

impl SectionPlan {
    pub(crate) fn new(value: Value, context: &Context<'_>, reparse_strings: bool) -> Self {
        if !value.is_truthy() {
            return SectionPlan::Skip;
        }
        let settings = context.renderer_settings();
        match value {
            Value::Str(text) if reparse_strings => SectionPlan::Reparse(text),
            Value::List(values) if !settings.is_excluded_from_sections(ValueKind::List) => {
                SectionPlan::Each(values)
            }
            Value::Iter(values) if !settings.is_excluded_from_sections(ValueKind::Iter) => {
                SectionPlan::Drain(values)
            }
            value => SectionPlan::Once(value),
        }
    }

    fn reparse(text: &str, block: &Block, context: &Context<'_>) -> Result<Vec<Token>> {
        trace!("re-parsing section {} output", block.identifier());
        Ok(context
            .renderer_settings()
            .parser()
            .parse(text, block.tags())?)
    }

    pub(crate) fn render(
        self,
        renderer: &mut Renderer,
        block: &Block,
        context: &Context<'_>,
    ) -> Result<()> {
        match self {
            SectionPlan::Skip => Ok(()),
            SectionPlan::Reparse(text) => {
                let tokens = Self::reparse(&text, block, context)?;
                renderer.render(&tokens, context)
            }
            SectionPlan::Each(values) => {
                for value in values {
                    renderer.render(block.children(), &context.push(value))?;
                }
                Ok(())
            }
            SectionPlan::Drain(values) => {
                let mut result = Ok(());
                while let Some(value) = values.next_value() {
                    result = renderer.render(block.children(), &context.push(value));
                    if result.is_err() {
                        break;
                    }
                }
                values.reset();
                result
            }
            SectionPlan::Once(value) => renderer.render(block.children(), &context.push(value)),
        }
    }

    pub(crate) async fn render_async(
        self,
        renderer: &mut AsyncRenderer<'_>,
        block: &Block,
        context: &Context<'_>,
    ) -> Result<()> {
        match self {
            SectionPlan::Skip => Ok(()),
            SectionPlan::Reparse(text) => {
                let tokens = Self::reparse(&text, block, context)?;
                renderer.render(&tokens, context).await
            }
            SectionPlan::Each(values) => {
                for value in values {
                    let scope = context.push(value);
                    renderer.render(block.children(), &scope).await?;
                }
                Ok(())
            }
            SectionPlan::Drain(values) => {
                let mut result = Ok(());
                while let Some(value) = values.next_value() {
                    let scope = context.push(value);
                    result = renderer.render(block.children(), &scope).await;
                    if result.is_err() {
                        break;
                    }
                }
                values.reset();
                result
            }
            SectionPlan::Once(value) => {
                let scope = context.push(value);
                renderer.render(block.children(), &scope).await
            }
        }
    }
}
