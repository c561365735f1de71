//! Render scopes
//!
//! A [`Context`] is one frame of the scope stack. Pushing a value creates a child
//! frame that borrows its parent, so frames live exactly as long as the section
//! that pushed them.

use crate::{
    locale::Locale,
    settings::RendererSettings,
    value::Value,
};

/// Per-render options
#[derive(Debug, Clone, Default)]
pub struct RenderSettings {
    /// Culture used to format numbers and to convert helper arguments
    pub locale: Locale,
}

impl RenderSettings {
    pub fn with_locale(locale: Locale) -> Self {
        Self { locale }
    }
}

/// A scope frame
#[derive(Debug, Clone)]
pub struct Context<'a> {
    view: Value,
    parent: Option<&'a Context<'a>>,
    renderer_settings: &'a RendererSettings,
    render_settings: &'a RenderSettings,
}

impl<'a> Context<'a> {
    /// Creates a root scope
    pub fn new(
        view: Value,
        renderer_settings: &'a RendererSettings,
        render_settings: &'a RenderSettings,
    ) -> Self {
        Self {
            view,
            parent: None,
            renderer_settings,
            render_settings,
        }
    }

    /// Creates a child scope with `view` as its frame
    pub fn push(&self, view: Value) -> Context<'_> {
        Context {
            view,
            parent: Some(self),
            renderer_settings: self.renderer_settings,
            render_settings: self.render_settings,
        }
    }

    pub fn renderer_settings(&self) -> &'a RendererSettings {
        self.renderer_settings
    }

    pub fn render_settings(&self) -> &'a RenderSettings {
        self.render_settings
    }

    pub fn locale(&self) -> &'a Locale {
        &self.render_settings.locale
    }

    /// Resolves a dotted path against the scope stack
    ///
    /// `.` is the current frame. The first segment is searched for from the
    /// innermost frame outwards, only map frames hold keys, so any other frame
    /// (a pushed `true`, a number) is passed through. Remaining segments descend
    /// from the value found. Missing paths resolve to [`Value::Null`].
    pub fn lookup(&self, path: &str) -> Value {
        let path = path.trim();
        if path == "." {
            return self.view.clone();
        }
        let mut segments = path.split('.');
        let first = match segments.next() {
            Some(first) if !first.is_empty() => first,
            _ => return Value::Null,
        };
        let mut current = match self.find(first) {
            Some(value) => value,
            None => return Value::Null,
        };
        for segment in segments {
            current = match current {
                Value::Map(map) => match map.get(segment) {
                    Some(value) => value,
                    None => return Value::Null,
                },
                Value::List(values) => match segment.parse::<usize>().ok().and_then(|i| values.get(i)) {
                    Some(value) => value,
                    None => return Value::Null,
                },
                _ => return Value::Null,
            };
        }
        current.clone()
    }

    fn find(&self, key: &str) -> Option<&Value> {
        let mut scope = Some(self);
        while let Some(context) = scope {
            if let Some(value) = context.view.get(key) {
                return Some(value);
            }
            scope = context.parent;
        }
        None
    }

    pub fn is_truthy(&self, value: &Value) -> bool {
        value.is_truthy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lookup_in(view: serde_json::Value, pushed: serde_json::Value, path: &str) -> Value {
        let settings = RendererSettings::default();
        let render_settings = RenderSettings::default();
        let root = Context::new(view.into(), &settings, &render_settings);
        let child = root.push(pushed.into());
        child.lookup(path)
    }

    #[test]
    fn inner_frame_wins() {
        let value = lookup_in(json!({ "Count": 10 }), json!({ "Count": 20 }), "Count");
        assert_eq!(value, Value::Int(20));
    }

    #[test]
    fn falls_back_to_parent() {
        let value = lookup_in(json!({ "Count": 10 }), json!({ "Count2": 20 }), "Count");
        assert_eq!(value, Value::Int(10));
    }

    #[test]
    fn non_map_frames_are_transparent() {
        let value = lookup_in(json!({ "Count": 10 }), json!(true), "Count");
        assert_eq!(value, Value::Int(10));
        let dot = lookup_in(json!({ "Count": 10 }), json!(true), ".");
        assert_eq!(dot, Value::Bool(true));
    }

    #[test]
    fn dotted_paths_descend() {
        let view = json!({ "person": { "name": "King", "tags": ["a", "b"] } });
        assert_eq!(lookup_in(view.clone(), json!(null), "person.name"), Value::from("King"));
        assert_eq!(lookup_in(view.clone(), json!(null), "person.tags.1"), Value::from("b"));
        assert_eq!(lookup_in(view, json!(null), "person.missing"), Value::Null);
    }

    #[test]
    fn numeric_looking_paths_do_not_resolve() {
        assert_eq!(lookup_in(json!({}), json!(null), "10.21"), Value::Null);
    }
}
