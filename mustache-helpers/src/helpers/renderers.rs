//! Token renderers for helper calls and helper sections

use super::{context::HelperContext, executor::HelperExecutor, registry::HelperRegistry};
use crate::{
    context::Context,
    error::Result,
    parser::token::{Block, BlockKind, BlockToken, HelperCall, Token},
    renderer::{AsyncRenderer, BoxFuture, Renderer, SectionPlan, TokenRenderer},
    value::Value,
};

/// Writes the value returned by an inline helper
///
/// Strings are written verbatim, other non-null values in their locale
/// format. Nothing is written when the helper did not run.
pub struct HelperTagRenderer {
    executor: HelperExecutor,
}

impl HelperTagRenderer {
    pub fn new(registry: HelperRegistry) -> Self {
        Self {
            executor: HelperExecutor::new(registry),
        }
    }

    fn call<'t>(&self, token: &'t Token) -> Option<&'t HelperCall> {
        match token {
            Token::HelperCall(call) if self.executor.registry().contains(&call.name) => Some(call),
            _ => None,
        }
    }

    fn output(&self, call: &HelperCall, context: &Context<'_>) -> Option<String> {
        match self.executor.try_execute(call, &HelperContext::new(context))? {
            Value::Str(text) => Some(text),
            Value::Null => None,
            value => Some(value.format(context.locale())),
        }
    }
}

impl TokenRenderer for HelperTagRenderer {
    fn accepts(&self, token: &Token) -> bool {
        self.call(token).is_some()
    }

    fn write(&self, renderer: &mut Renderer, token: &Token, context: &Context<'_>) -> Result<()> {
        if let Some(text) = self.call(token).and_then(|call| self.output(call, context)) {
            renderer.write(&text);
        }
        Ok(())
    }

    fn write_async<'a>(
        &'a self,
        renderer: &'a mut AsyncRenderer<'_>,
        token: &'a Token,
        context: &'a Context<'_>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if let Some(text) = self.call(token).and_then(|call| self.output(call, context)) {
                renderer.write(&text).await?;
            }
            Ok(())
        })
    }
}

/// Renders a helper section according to the value its helper returns
///
/// A returned string is parsed as a template with the section's delimiters.
/// Sequences and enumerators render the body once per item, any other truthy
/// value renders it once with the value pushed onto the scope.
pub struct HelperSectionRenderer {
    executor: HelperExecutor,
}

impl HelperSectionRenderer {
    pub fn new(registry: HelperRegistry) -> Self {
        Self {
            executor: HelperExecutor::new(registry),
        }
    }

    fn block<'t>(&self, token: &'t Token) -> Option<&'t Block> {
        helper_block(&self.executor, token, BlockKind::HelperSection)
    }

    fn plan(&self, block: &Block, context: &Context<'_>) -> SectionPlan {
        let helper_context = HelperContext::with_content(context, block.raw_body());
        match self.executor.try_execute(block, &helper_context) {
            Some(value) => SectionPlan::new(value, context, true),
            None => SectionPlan::Skip,
        }
    }
}

impl TokenRenderer for HelperSectionRenderer {
    fn accepts(&self, token: &Token) -> bool {
        self.block(token).is_some()
    }

    fn write(&self, renderer: &mut Renderer, token: &Token, context: &Context<'_>) -> Result<()> {
        match self.block(token) {
            Some(block) => self.plan(block, context).render(renderer, block, context),
            None => Ok(()),
        }
    }

    fn write_async<'a>(
        &'a self,
        renderer: &'a mut AsyncRenderer<'_>,
        token: &'a Token,
        context: &'a Context<'_>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            match self.block(token) {
                Some(block) => {
                    self.plan(block, context)
                        .render_async(renderer, block, context)
                        .await
                }
                None => Ok(()),
            }
        })
    }
}

/// Renders the body in the current scope when the helper fails or returns a
/// value that is not truthy
pub struct HelperInvertedSectionRenderer {
    executor: HelperExecutor,
}

impl HelperInvertedSectionRenderer {
    pub fn new(registry: HelperRegistry) -> Self {
        Self {
            executor: HelperExecutor::new(registry),
        }
    }

    fn visible<'t>(&self, token: &'t Token, context: &Context<'_>) -> Option<&'t Block> {
        let block = helper_block(&self.executor, token, BlockKind::InvertedHelperSection)?;
        let helper_context = HelperContext::with_content(context, block.raw_body());
        match self.executor.try_execute(block, &helper_context) {
            Some(value) if value.is_truthy() => None,
            _ => Some(block),
        }
    }
}

impl TokenRenderer for HelperInvertedSectionRenderer {
    fn accepts(&self, token: &Token) -> bool {
        helper_block(&self.executor, token, BlockKind::InvertedHelperSection).is_some()
    }

    fn write(&self, renderer: &mut Renderer, token: &Token, context: &Context<'_>) -> Result<()> {
        match self.visible(token, context) {
            Some(block) => renderer.render(block.children(), context),
            None => Ok(()),
        }
    }

    fn write_async<'a>(
        &'a self,
        renderer: &'a mut AsyncRenderer<'_>,
        token: &'a Token,
        context: &'a Context<'_>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            match self.visible(token, context) {
                Some(block) => renderer.render(block.children(), context).await,
                None => Ok(()),
            }
        })
    }
}

fn helper_block<'t>(executor: &HelperExecutor, token: &'t Token, kind: BlockKind) -> Option<&'t Block> {
    match token {
        Token::Block(block) if block.kind == kind && executor.registry().contains(&block.name) => {
            Some(block)
        }
        _ => None,
    }
}
