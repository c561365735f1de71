//! Helper invocation
//!
//! Resolves a call's arguments against the scope, coerces them to the types
//! the helper declares and calls it. Every way a call can fail at this stage
//! (unknown name, wrong number of arguments, an argument that cannot be
//! converted) is silent: the helper simply does not run and the reason is
//! logged at debug level.

use log::debug;

use super::{
    context::HelperContext,
    registry::{HelperRegistry, ParamKind, ParamType},
};
use crate::{locale::Locale, parser::token::CallToken, value::Value};

/// Converts a resolved argument to the declared parameter type
///
/// `raw` is the argument as written in the template. A null against a
/// required type is retried with `raw`, which lets unresolved barewords such
/// as `5` or `10.21` act as literals.
pub(crate) fn convert(value: Value, raw: &str, target: ParamType, locale: &Locale) -> Option<Value> {
    let value = match value {
        Value::Null if target.is_required() => Value::Str(raw.to_string()),
        Value::Null => return None,
        value => value,
    };
    if target.accepts(value.kind()) {
        return Some(value);
    }
    change_type(&value, target, locale)
}

fn change_type(value: &Value, target: ParamType, locale: &Locale) -> Option<Value> {
    match (target, value) {
        (ParamType::Str, Value::Bool(_) | Value::Int(_) | Value::Float(_)) => {
            Some(Value::Str(value.format(locale)))
        }
        (ParamType::Int, Value::Float(value)) => {
            let rounded = value.round_ties_even();
            (rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64)
                .then_some(Value::Int(rounded as i64))
        }
        (ParamType::Int, Value::Bool(value)) => Some(Value::Int(i64::from(*value))),
        (ParamType::Int, Value::Str(text)) => locale.parse_int(text).map(Value::Int),
        (ParamType::Float, Value::Int(value)) => Some(Value::Float(*value as f64)),
        (ParamType::Float, Value::Bool(value)) => Some(Value::Float(f64::from(u8::from(*value)))),
        (ParamType::Float, Value::Str(text)) => locale.parse_float(text).map(Value::Float),
        (ParamType::Bool, Value::Int(value)) => Some(Value::Bool(*value != 0)),
        (ParamType::Bool, Value::Float(value)) => Some(Value::Bool(*value != 0.0)),
        (ParamType::Bool, Value::Str(text)) => {
            let text = text.trim();
            if text.eq_ignore_ascii_case("true") {
                Some(Value::Bool(true))
            } else if text.eq_ignore_ascii_case("false") {
                Some(Value::Bool(false))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Runs helpers from one registry
#[derive(Debug, Clone)]
pub struct HelperExecutor {
    registry: HelperRegistry,
}

impl HelperExecutor {
    pub fn new(registry: HelperRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HelperRegistry {
        &self.registry
    }

    /// Calls the helper named by `call`
    ///
    /// Returns `None` when the helper did not run, otherwise the value it
    /// returned, which may itself be null.
    pub fn try_execute(&self, call: &impl CallToken, context: &HelperContext<'_>) -> Option<Value> {
        let name = call.identifier();
        let Some(helper) = self.registry.get(name) else {
            debug!("no helper named {}", name);
            return None;
        };
        let args = call.arguments();
        if helper.arity() != args.len() {
            debug!(
                "helper {} expects {} arguments, got {}",
                name,
                helper.arity(),
                args.len()
            );
            return None;
        }

        let mut values = Vec::with_capacity(args.len());
        for (arg, kind) in args.iter().zip(&helper.params()[1..]) {
            let resolved = if arg.is_lookup {
                context.lookup(&arg.value)
            } else {
                Value::Str(arg.value.clone())
            };
            let target = match kind {
                ParamKind::Typed(target) => *target,
                ParamKind::Context => ParamType::Any,
            };
            match convert(resolved, &arg.value, target, context.locale()) {
                Some(value) => values.push(value),
                None => {
                    debug!(
                        "helper {} argument '{}' cannot be passed as {:?}",
                        name, arg.value, target
                    );
                    return None;
                }
            }
        }
        Some(helper.call(context, &values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::{Context, RenderSettings},
        helpers::arguments::Argument,
        parser::token::{HelperCall, Span},
        settings::RendererSettings,
    };
    use serde_json::json;

    #[test]
    fn converts_by_locale() {
        let text = Value::from("1,21");
        assert_eq!(
            convert(text.clone(), "", ParamType::Float, &Locale::RU_RU),
            Some(Value::Float(1.21))
        );
        assert_eq!(
            convert(text, "", ParamType::Float, &Locale::EN_GB),
            Some(Value::Float(121.0))
        );
        assert_eq!(
            convert(Value::from("1.21"), "", ParamType::Float, &Locale::RU_RU),
            None
        );
        assert_eq!(
            convert(Value::Float(1.21), "", ParamType::Str, &Locale::RU_RU),
            Some(Value::from("1,21"))
        );
    }

    #[test]
    fn null_falls_back_to_raw_text_for_required_types() {
        assert_eq!(
            convert(Value::Null, "5", ParamType::Int, &Locale::INVARIANT),
            Some(Value::Int(5))
        );
        assert_eq!(convert(Value::Null, "x", ParamType::Str, &Locale::INVARIANT), None);
        assert_eq!(convert(Value::Null, "x", ParamType::Any, &Locale::INVARIANT), None);
        assert_eq!(convert(Value::Null, "x", ParamType::Int, &Locale::INVARIANT), None);
    }

    #[test]
    fn rounds_floats_to_even() {
        assert_eq!(
            convert(Value::Float(2.5), "", ParamType::Int, &Locale::INVARIANT),
            Some(Value::Int(2))
        );
        assert_eq!(
            convert(Value::Float(f64::NAN), "", ParamType::Int, &Locale::INVARIANT),
            None
        );
    }

    #[test]
    fn keeps_assignable_values() {
        let list = Value::from(vec![1, 2]);
        assert_eq!(
            convert(list.clone(), "", ParamType::Any, &Locale::INVARIANT),
            Some(list.clone())
        );
        assert_eq!(convert(list, "", ParamType::Str, &Locale::INVARIANT), None);
    }

    fn call(name: &str, args: Vec<Argument>) -> HelperCall {
        HelperCall {
            name: name.to_string(),
            args,
            tag: Span::default(),
            content: Span::default(),
        }
    }

    #[test]
    fn executes_with_resolved_arguments() {
        let registry = HelperRegistry::builder()
            .register_fn("Multiply", [ParamType::Int, ParamType::Int], |_, args| {
                match (&args[0], &args[1]) {
                    (Value::Int(a), Value::Int(b)) => Value::Int(a * b),
                    _ => Value::Null,
                }
            })
            .build()
            .unwrap();
        let executor = HelperExecutor::new(registry);
        let settings = RendererSettings::default();
        let render_settings = RenderSettings::default();
        let scope = Context::new(json!({ "Count": 10 }).into(), &settings, &render_settings);
        let context = HelperContext::new(&scope);

        let result = executor.try_execute(
            &call("multiply", vec![Argument::lookup("Count"), Argument::lookup("3")]),
            &context,
        );
        assert_eq!(result, Some(Value::Int(30)));

        let short = executor.try_execute(&call("Multiply", vec![Argument::lookup("Count")]), &context);
        assert_eq!(short, None);

        let bad = executor.try_execute(
            &call("Multiply", vec![Argument::literal("x"), Argument::lookup("Count")]),
            &context,
        );
        assert_eq!(bad, None);

        assert_eq!(executor.try_execute(&call("Missing", vec![]), &context), None);
    }
}
