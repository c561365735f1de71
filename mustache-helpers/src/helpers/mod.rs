//! Helper support
//!
//! Helpers are named Rust functions callable from templates:
//!
//! ```text
//! {{FormatCurrency Price}}
//! {{#IfEquals Status 'active'}}...{{/IfEquals}}
//! {{^IfEquals Status 'active'}}...{{/IfEquals}}
//! ```
//!
//! Inline helpers and section helpers live in separate registries, installed
//! on the renderer settings with [`HelperExtensions`]. A name only registered
//! as one kind of helper is an ordinary variable in the other position.

pub mod arguments;
pub mod context;
pub mod executor;
pub mod parsers;
pub mod registry;
pub mod renderers;

use crate::{parser::stock, settings::RendererSettingsBuilder};
use parsers::{HelperSectionParser, HelperTagParser};
use registry::HelperRegistry;
use renderers::{HelperInvertedSectionRenderer, HelperSectionRenderer, HelperTagRenderer};

/// Installs helper registries on [`RendererSettingsBuilder`]
pub trait HelperExtensions {
    /// Enables `{{name args...}}` for the given helpers
    fn add_helpers(&mut self, helpers: HelperRegistry) -> &mut Self;

    /// Enables `{{#name args...}}` and `{{^name args...}}` for the given helpers
    fn add_section_helpers(&mut self, helpers: HelperRegistry) -> &mut Self;
}

impl HelperExtensions for RendererSettingsBuilder {
    fn add_helpers(&mut self, helpers: HelperRegistry) -> &mut Self {
        let parser = HelperTagParser::new(helpers.clone());
        self.configure_parser_pipeline(|pipeline| {
            pipeline.add_before(stock::INTERPOLATION, parser);
        })
        .add_token_renderer(HelperTagRenderer::new(helpers))
    }

    fn add_section_helpers(&mut self, helpers: HelperRegistry) -> &mut Self {
        let section = HelperSectionParser::new(helpers.clone());
        let inverted = HelperSectionParser::inverted(helpers.clone());
        self.configure_parser_pipeline(|pipeline| {
            pipeline
                .add_before(stock::SECTION, section)
                .add_before(stock::INVERTED_SECTION, inverted);
        })
        .add_token_renderer(HelperSectionRenderer::new(helpers.clone()))
        .add_token_renderer(HelperInvertedSectionRenderer::new(helpers))
    }
}
