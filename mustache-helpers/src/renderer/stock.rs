//! Renderers for plain text, interpolations and plain sections

use std::{borrow::Cow, sync::LazyLock};

use regex::{Captures, Regex};

use super::{AsyncRenderer, BoxFuture, Renderer, SectionPlan, TokenRenderer};
use crate::{
    context::Context,
    error::Result,
    parser::token::{Block, BlockKind, BlockToken, Token},
    settings::RendererSettingsBuilder,
};

static HTML_SPECIAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[&<>"']"#).unwrap());

/// Escapes the characters HTML treats specially
pub fn escape_html(text: &str) -> Cow<'_, str> {
    HTML_SPECIAL.replace_all(text, |captures: &Captures| {
        match &captures[0] {
            "&" => "&amp;",
            "<" => "&lt;",
            ">" => "&gt;",
            "\"" => "&quot;",
            _ => "&#39;",
        }
    })
}

struct Text;

impl TokenRenderer for Text {
    fn accepts(&self, token: &Token) -> bool {
        matches!(token, Token::Text(_))
    }

    fn write(&self, renderer: &mut Renderer, token: &Token, _: &Context<'_>) -> Result<()> {
        if let Token::Text(text) = token {
            renderer.write(text);
        }
        Ok(())
    }

    fn write_async<'a>(
        &'a self,
        renderer: &'a mut AsyncRenderer<'_>,
        token: &'a Token,
        _: &'a Context<'_>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if let Token::Text(text) = token {
                renderer.write(text).await?;
            }
            Ok(())
        })
    }
}

struct Interpolation;

impl Interpolation {
    fn text(token: &Token, context: &Context<'_>) -> Option<String> {
        let Token::Interpolation(interpolation) = token else {
            return None;
        };
        let text = context.lookup(&interpolation.path).format(context.locale());
        Some(if interpolation.escaped {
            escape_html(&text).into_owned()
        } else {
            text
        })
    }
}

impl TokenRenderer for Interpolation {
    fn accepts(&self, token: &Token) -> bool {
        matches!(token, Token::Interpolation(_))
    }

    fn write(&self, renderer: &mut Renderer, token: &Token, context: &Context<'_>) -> Result<()> {
        if let Some(text) = Self::text(token, context) {
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
            if let Some(text) = Self::text(token, context) {
                renderer.write(&text).await?;
            }
            Ok(())
        })
    }
}

fn block_of(token: &Token, kind: BlockKind) -> Option<&Block> {
    match token {
        Token::Block(block) if block.kind() == kind => Some(block),
        _ => None,
    }
}

/// `{{#name}}`: iterates sequences and enumerators, renders other truthy values once
struct Section;

impl TokenRenderer for Section {
    fn accepts(&self, token: &Token) -> bool {
        block_of(token, BlockKind::Section).is_some()
    }

    fn write(&self, renderer: &mut Renderer, token: &Token, context: &Context<'_>) -> Result<()> {
        match block_of(token, BlockKind::Section) {
            Some(block) => SectionPlan::new(context.lookup(&block.name), context, false)
                .render(renderer, block, context),
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
            match block_of(token, BlockKind::Section) {
                Some(block) => {
                    SectionPlan::new(context.lookup(&block.name), context, false)
                        .render_async(renderer, block, context)
                        .await
                }
                None => Ok(()),
            }
        })
    }
}

/// `{{^name}}`: renders its children in place when the value is not truthy
struct InvertedSection;

impl InvertedSection {
    fn visible<'t>(token: &'t Token, context: &Context<'_>) -> Option<&'t Block> {
        block_of(token, BlockKind::InvertedSection)
            .filter(|block| !context.lookup(&block.name).is_truthy())
    }
}

impl TokenRenderer for InvertedSection {
    fn accepts(&self, token: &Token) -> bool {
        block_of(token, BlockKind::InvertedSection).is_some()
    }

    fn write(&self, renderer: &mut Renderer, token: &Token, context: &Context<'_>) -> Result<()> {
        match Self::visible(token, context) {
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
            match Self::visible(token, context) {
                Some(block) => renderer.render(block.children(), context).await,
                None => Ok(()),
            }
        })
    }
}

/// Adds the stock token renderers
pub fn add_builtins(builder: &mut RendererSettingsBuilder) {
    builder
        .add_token_renderer(Text)
        .add_token_renderer(Interpolation)
        .add_token_renderer(Section)
        .add_token_renderer(InvertedSection);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert!(matches!(escape_html("plain"), Cow::Borrowed("plain")));
    }
}
