//! Helper registration
//!
//! A [`HelperRef`] pairs a type-erased callable with the list of parameter
//! kinds it declares. The first kind is always [`ParamKind::Context`]; the
//! remaining ones describe the positional template arguments, and the engine
//! coerces each argument to its declared type before the call.
//!
//! Registries are built once with [`HelpersBuilder`] and never change
//! afterwards, so they can be shared freely between threads.

use std::{collections::HashMap, fmt, sync::Arc};

use super::context::HelperContext;
use crate::{
    error::RegistryError,
    value::{Map, Value, ValueKind},
};

/// The type a helper parameter is coerced to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Any non-null value, passed through unchanged
    Any,
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
}

impl ParamType {
    /// Value types for which null is not a valid argument
    ///
    /// A null lookup against one of these is retried with the raw argument
    /// text, so `{{Multiply 5 5}}` passes the numbers through.
    pub fn is_required(self) -> bool {
        matches!(self, ParamType::Bool | ParamType::Int | ParamType::Float)
    }

    /// Whether a value of `kind` can be passed without conversion
    pub fn accepts(self, kind: ValueKind) -> bool {
        match self {
            ParamType::Any => kind != ValueKind::Null,
            ParamType::Bool => kind == ValueKind::Bool,
            ParamType::Int => kind == ValueKind::Int,
            ParamType::Float => kind == ValueKind::Float,
            ParamType::Str => kind == ValueKind::Str,
            ParamType::List => kind == ValueKind::List,
            ParamType::Map => kind == ValueKind::Map,
        }
    }
}

/// One entry of a helper's parameter list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// The helper context, always first and never supplied by the template
    Context,
    Typed(ParamType),
}

/// Rust types a coerced argument can be extracted as
pub trait FromValue: Sized {
    const TYPE: ParamType;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    const TYPE: ParamType = ParamType::Any;

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    const TYPE: ParamType = ParamType::Bool;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const TYPE: ParamType = ParamType::Int;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }
}

macro_rules! from_int_value {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                const TYPE: ParamType = ParamType::Int;

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Int(value) => <$ty>::try_from(*value).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_int_value!(i32, u32, u64, usize);

impl FromValue for f64 {
    const TYPE: ParamType = ParamType::Float;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(value) => Some(*value),
            Value::Int(value) => Some(*value as f64),
            _ => None,
        }
    }
}

impl FromValue for String {
    const TYPE: ParamType = ParamType::Str;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for Vec<Value> {
    const TYPE: ParamType = ParamType::List;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(values) => Some(values.clone()),
            _ => None,
        }
    }
}

impl FromValue for Map {
    const TYPE: ParamType = ParamType::Map;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(map) => Some(map.clone()),
            _ => None,
        }
    }
}

type Callable = dyn Fn(&HelperContext<'_>, &[Value]) -> Value + Send + Sync;

/// A registered helper: a callable plus its declared parameter kinds
///
/// Two refs are equal when they share the same callable and declare the same
/// parameters.
#[derive(Clone)]
pub struct HelperRef {
    params: Arc<[ParamKind]>,
    callable: Arc<Callable>,
}

impl HelperRef {
    /// Wraps a callable taking the context and already coerced arguments
    ///
    /// `types` lists the template parameters only; the context parameter is
    /// prepended.
    pub fn new<F>(types: impl IntoIterator<Item = ParamType>, callable: F) -> Self
    where
        F: Fn(&HelperContext<'_>, &[Value]) -> Value + Send + Sync + 'static,
    {
        let params = std::iter::once(ParamKind::Context)
            .chain(types.into_iter().map(ParamKind::Typed))
            .collect();
        Self {
            params,
            callable: Arc::new(callable),
        }
    }

    pub fn params(&self) -> &[ParamKind] {
        &self.params
    }

    /// Number of template arguments the helper expects
    pub fn arity(&self) -> usize {
        self.params.len() - 1
    }

    pub fn call(&self, context: &HelperContext<'_>, args: &[Value]) -> Value {
        (self.callable)(context, args)
    }
}

impl PartialEq for HelperRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.callable), Arc::as_ptr(&other.callable))
            && self.params == other.params
    }
}

impl fmt::Debug for HelperRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperRef")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Immutable, case-insensitive map of helper names to helpers
#[derive(Debug, Clone, Default)]
pub struct HelperRegistry {
    helpers: Arc<HashMap<String, HelperRef>>,
}

impl HelperRegistry {
    pub fn builder() -> HelpersBuilder {
        HelpersBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&HelperRef> {
        self.helpers.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }
}

/// Collects helpers; the last registration of a name wins
#[derive(Debug, Default)]
pub struct HelpersBuilder {
    helpers: HashMap<String, HelperRef>,
    error: Option<RegistryError>,
}

impl HelpersBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a helper under a trimmed name
    ///
    /// A blank name is reported by [`HelpersBuilder::build`].
    pub fn register(mut self, name: &str, helper: HelperRef) -> Self {
        let name = name.trim();
        if name.is_empty() {
            self.error.get_or_insert(RegistryError::EmptyName);
        } else {
            self.helpers.insert(name.to_lowercase(), helper);
        }
        self
    }

    /// Registers a closure over raw coerced arguments
    pub fn register_fn<F>(self, name: &str, types: impl IntoIterator<Item = ParamType>, callable: F) -> Self
    where
        F: Fn(&HelperContext<'_>, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.register(name, HelperRef::new(types, callable))
    }

    pub fn build(self) -> Result<HelperRegistry, RegistryError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(HelperRegistry {
                helpers: Arc::new(self.helpers),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: i64) -> HelperRef {
        HelperRef::new([], move |_, _| Value::Int(value))
    }

    #[test]
    fn names_are_case_insensitive_and_trimmed() {
        let registry = HelperRegistry::builder()
            .register("  FormatCurrency ", constant(1))
            .build()
            .unwrap();
        assert!(registry.contains("formatcurrency"));
        assert!(registry.contains("FORMATCURRENCY"));
        assert!(!registry.contains("Format"));
    }

    #[test]
    fn last_registration_wins() {
        let second = constant(2);
        let registry = HelperRegistry::builder()
            .register("Value", constant(1))
            .register("value", second.clone())
            .build()
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("VALUE"), Some(&second));
    }

    #[test]
    fn blank_names_fail() {
        let result = HelperRegistry::builder().register("   ", constant(1)).build();
        assert_eq!(result.unwrap_err(), RegistryError::EmptyName);
    }

    #[test]
    fn context_parameter_comes_first() {
        let helper = HelperRef::new([ParamType::Int, ParamType::Str], |_, _| Value::Null);
        assert_eq!(
            helper.params(),
            &[
                ParamKind::Context,
                ParamKind::Typed(ParamType::Int),
                ParamKind::Typed(ParamType::Str)
            ]
        );
        assert_eq!(helper.arity(), 2);
    }

    #[test]
    fn equality_follows_callable_identity() {
        let helper = constant(1);
        assert_eq!(helper, helper.clone());
        assert_ne!(constant(1), constant(1));
    }

    #[test]
    fn extracts_rust_types() {
        assert_eq!(i32::from_value(&Value::Int(5)), Some(5));
        assert_eq!(i32::from_value(&Value::Int(i64::MAX)), None);
        assert_eq!(f64::from_value(&Value::Int(2)), Some(2.0));
        assert_eq!(String::from_value(&Value::Int(2)), None);
    }
}
