//! Mustache templates with registered helper tags
//!
//! Helpers are Rust functions called from templates in three positions:
//!
//! ```text
//! {{FormatCurrency Price}}                      inline
//! {{#IfEquals Status 'active'}}..{{/IfEquals}}  section
//! {{^IfEquals Status 'active'}}..{{/IfEquals}}  inverted section
//! ```
//!
//! Arguments are either quoted literals or paths looked up in the current
//! scope, and are converted to the types the helper declares before it runs.
//! See [`helpers`] for the details.

extern crate self as mustache_helpers;

pub mod context;
pub mod error;
pub mod helpers;
pub mod locale;
pub mod mustache;
pub mod parser;
pub mod renderer;
pub mod settings;
pub mod value;

pub use context::{Context, RenderSettings};
pub use error::{Error, ParseError, RegistryError, Result};
pub use helpers::{
    HelperExtensions,
    arguments::Argument,
    context::HelperContext,
    registry::{FromValue, HelperRef, HelperRegistry, HelpersBuilder, ParamKind, ParamType},
};
pub use locale::Locale;
pub use mustache::{Mustache, MustacheBuilder, Template};
pub use parser::token::{Tags, Token};
pub use settings::{RendererSettings, RendererSettingsBuilder};
pub use value::{Enumerator, SharedEnumerator, Value, ValueKind};

pub use mustache_helpers_macros::helper;
