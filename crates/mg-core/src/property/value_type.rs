//! Value-type descriptors.
//!
//! A [`ValueType`] describes the domain of one property: how raw values are
//! validated and coerced, what the default is, and (optionally) how the
//! value is transformed on the wire.
//!
//! Composite descriptors wrap other descriptors, so a property such as
//! "a list of ranges, or nothing" is spelled
//! `ValueType::nullable(ValueType::list(ValueType::instance("Range")))`.
//!
//! # Examples
//!
//! ```
//! use mg_core::{ValueType, Value};
//!
//! let alpha = ValueType::interval(ValueType::float(), 0.0, 1.0).with_default(1.0);
//! assert_eq!(alpha.validate(&Value::from(0)).unwrap(), Value::Float(0.0));
//! assert!(alpha.validate(&Value::from(1.5)).is_err());
//! assert_eq!(alpha.to_string(), "Interval(Float, 0.0, 1.0)");
//! ```

use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// Validation function for custom leaf types.
///
/// Returns the (possibly coerced) value, or a human-readable reason.
pub type Validator = Rc<dyn Fn(&Value) -> Result<Value, String>>;

/// Zero-argument default generator.
pub type Generator = Rc<dyn Fn() -> Value>;

/// Custom wire transform for a value.
pub type WireFn = Rc<dyn Fn(&Value) -> serde_json::Value>;

/// The string accepted by [`ValueType::auto`] in place of a real value.
pub const AUTO: &str = "auto";

/// The default of a stored property.
#[derive(Clone)]
pub enum DefaultValue {
    /// A constant, validated at declaration time and returned on every read.
    Constant(Value),
    /// A generator, invoked once per instance on first read and cached there.
    Generated(Generator),
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Generated(_) => f.write_str("Generated(..)"),
        }
    }
}

#[derive(Clone)]
enum Kind {
    Any,
    Bool,
    Int,
    Float,
    String,
    Nullable(ValueType),
    List(ValueType),
    Tuple(Vec<ValueType>),
    Dict(ValueType, ValueType),
    Either(Vec<ValueType>),
    Enum(Vec<String>),
    Instance(String),
    Spec(ValueType),
    Auto(ValueType),
    Interval(ValueType, f64, f64),
    Custom(String, Validator),
}

/// Describes the accepted domain, default, and wire form of a property.
///
/// Cloning is cheap: the domain is shared behind an [`Rc`].
#[derive(Clone)]
pub struct ValueType {
    kind: Rc<Kind>,
    default: Option<DefaultValue>,
    wire: Option<WireFn>,
}

impl ValueType {
    fn of(kind: Kind) -> Self {
        Self {
            kind: Rc::new(kind),
            default: None,
            wire: None,
        }
    }

    /// Accepts any defined value, including `null`.
    #[must_use]
    pub fn any() -> Self {
        Self::of(Kind::Any)
    }

    /// Accepts booleans.
    #[must_use]
    pub fn bool() -> Self {
        Self::of(Kind::Bool)
    }

    /// Accepts integers.
    #[must_use]
    pub fn int() -> Self {
        Self::of(Kind::Int)
    }

    /// Accepts floats; integers are widened.
    #[must_use]
    pub fn float() -> Self {
        Self::of(Kind::Float)
    }

    /// Accepts strings.
    #[must_use]
    pub fn string() -> Self {
        Self::of(Kind::String)
    }

    /// Accepts `null` or whatever `inner` accepts.
    #[must_use]
    pub fn nullable(inner: Self) -> Self {
        Self::of(Kind::Nullable(inner))
    }

    /// Accepts lists whose every item `inner` accepts.
    #[must_use]
    pub fn list(inner: Self) -> Self {
        Self::of(Kind::List(inner))
    }

    /// Accepts lists of exactly `items.len()` elements, each checked by the
    /// descriptor at the same position.
    #[must_use]
    pub fn tuple(items: impl IntoIterator<Item = Self>) -> Self {
        Self::of(Kind::Tuple(items.into_iter().collect()))
    }

    /// Accepts dicts whose keys `key` accepts and whose values `value` accepts.
    #[must_use]
    pub fn dict(key: Self, value: Self) -> Self {
        Self::of(Kind::Dict(key, value))
    }

    /// Tries each alternative in order; the first that accepts wins.
    #[must_use]
    pub fn either(alternatives: impl IntoIterator<Item = Self>) -> Self {
        Self::of(Kind::Either(alternatives.into_iter().collect()))
    }

    /// Accepts exactly one of the given strings.
    #[must_use]
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of(Kind::Enum(values.into_iter().map(Into::into).collect()))
    }

    /// Accepts model instances of `type_name` or any of its descendants.
    #[must_use]
    pub fn instance(type_name: impl Into<String>) -> Self {
        Self::of(Kind::Instance(type_name.into()))
    }

    /// Accepts either a literal or a field reference.
    ///
    /// Values are stored normalized as a single-key dict: `{"value": v}` for
    /// literals `literal` accepts, `{"field": name}` for any other string.
    /// Both dict forms are also accepted directly.
    #[must_use]
    pub fn spec(literal: Self) -> Self {
        Self::of(Kind::Spec(literal))
    }

    /// Accepts the string `"auto"` or whatever `inner` accepts.
    #[must_use]
    pub fn auto(inner: Self) -> Self {
        Self::of(Kind::Auto(inner))
    }

    /// Accepts what `inner` accepts, provided it is numeric and within
    /// `[lo, hi]`.
    #[must_use]
    pub fn interval(inner: Self, lo: f64, hi: f64) -> Self {
        Self::of(Kind::Interval(inner, lo, hi))
    }

    /// A leaf type with its own validation function.
    #[must_use]
    pub fn custom(
        name: impl Into<String>,
        validate: impl Fn(&Value) -> Result<Value, String> + 'static,
    ) -> Self {
        Self::of(Kind::Custom(name.into(), Rc::new(validate)))
    }

    /// Sets a constant default.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Constant(value.into()));
        self
    }

    /// Sets a generated default, evaluated lazily once per instance.
    #[must_use]
    pub fn with_generator(mut self, generator: impl Fn() -> Value + 'static) -> Self {
        self.default = Some(DefaultValue::Generated(Rc::new(generator)));
        self
    }

    /// Removes the default.
    #[must_use]
    pub fn without_default(mut self) -> Self {
        self.default = None;
        self
    }

    /// Sets a custom wire transform, replacing generic serialization.
    #[must_use]
    pub fn with_wire(mut self, to_wire: impl Fn(&Value) -> serde_json::Value + 'static) -> Self {
        self.wire = Some(Rc::new(to_wire));
        self
    }

    /// Returns the default, if any.
    #[must_use]
    pub const fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// Returns the custom wire transform, if any.
    #[must_use]
    pub const fn wire_fn(&self) -> Option<&WireFn> {
        self.wire.as_ref()
    }

    /// Validates and coerces a raw value.
    ///
    /// Pure: the descriptor is never mutated. [`Value::Undefined`] is never
    /// valid; deleting a property is the caller's concern.
    pub fn validate(&self, raw: &Value) -> Result<Value, String> {
        if raw.is_undefined() {
            return Err(format!("expected {self}, got <Undefined>"));
        }
        match &*self.kind {
            Kind::Any => Ok(raw.clone()),
            Kind::Bool => match raw {
                Value::Bool(_) => Ok(raw.clone()),
                _ => Err(self.mismatch(raw)),
            },
            Kind::Int => match raw {
                Value::Int(_) => Ok(raw.clone()),
                _ => Err(self.mismatch(raw)),
            },
            Kind::Float => match raw {
                Value::Int(_) | Value::Float(_) => {
                    raw.as_f64().map(Value::Float).ok_or_else(|| self.mismatch(raw))
                }
                _ => Err(self.mismatch(raw)),
            },
            Kind::String => match raw {
                Value::String(_) => Ok(raw.clone()),
                _ => Err(self.mismatch(raw)),
            },
            Kind::Nullable(inner) => {
                if raw.is_null() {
                    Ok(Value::Null)
                } else {
                    inner.validate(raw).map_err(|_| self.mismatch(raw))
                }
            }
            Kind::List(inner) => {
                let Value::List(items) = raw else {
                    return Err(self.mismatch(raw));
                };
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| inner.validate(item).map_err(|e| format!("item {i}: {e}")))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }
            Kind::Tuple(slots) => match raw {
                Value::List(items) if items.len() == slots.len() => slots
                    .iter()
                    .zip(items)
                    .enumerate()
                    .map(|(i, (slot, item))| {
                        slot.validate(item).map_err(|e| format!("element {i}: {e}"))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List),
                _ => Err(self.mismatch(raw)),
            },
            Kind::Dict(key_type, value_type) => {
                let Value::Dict(entries) = raw else {
                    return Err(self.mismatch(raw));
                };
                entries
                    .iter()
                    .map(|(key, item)| {
                        let key = match key_type.validate(&Value::String(key.clone()))? {
                            Value::String(key) => key,
                            other => return Err(format!("key {other} is not a string")),
                        };
                        let item = value_type
                            .validate(item)
                            .map_err(|e| format!("value of {key:?}: {e}"))?;
                        Ok((key, item))
                    })
                    .collect::<Result<_, String>>()
                    .map(Value::Dict)
            }
            Kind::Either(alternatives) => alternatives
                .iter()
                .find_map(|alternative| alternative.validate(raw).ok())
                .ok_or_else(|| self.mismatch(raw)),
            Kind::Enum(allowed) => match raw {
                Value::String(s) if allowed.iter().any(|a| a == s) => Ok(raw.clone()),
                _ => Err(self.mismatch(raw)),
            },
            Kind::Instance(type_name) => match raw {
                Value::Model(model) if model.is_instance_of(type_name) => Ok(raw.clone()),
                Value::Model(model) => Err(format!(
                    "expected an instance of {type_name}, got {}",
                    model.type_name()
                )),
                _ => Err(self.mismatch(raw)),
            },
            Kind::Spec(literal) => self.validate_spec(literal, raw),
            Kind::Auto(inner) => match raw {
                Value::String(s) if s == AUTO => Ok(raw.clone()),
                _ => inner.validate(raw).map_err(|_| self.mismatch(raw)),
            },
            Kind::Interval(inner, lo, hi) => {
                let value = inner.validate(raw)?;
                match value.as_f64() {
                    Some(x) if (*lo..=*hi).contains(&x) => Ok(value),
                    _ => Err(format!("{raw} is outside [{lo:?}, {hi:?}]")),
                }
            }
            Kind::Custom(_, validate) => validate(raw),
        }
    }

    fn validate_spec(&self, literal: &Self, raw: &Value) -> Result<Value, String> {
        // Normalized forms first, so validating a stored spec is a no-op.
        if let Value::Dict(entries) = raw {
            if entries.len() == 1 {
                if let Some(field) = entries.get("field") {
                    return match field {
                        Value::String(_) => Ok(raw.clone()),
                        _ => Err(format!("field name must be a string, got {field}")),
                    };
                }
                if let Some(value) = entries.get("value") {
                    let value = literal.validate(value)?;
                    return Ok(Value::dict([("value", value)]));
                }
            }
        }
        if let Ok(value) = literal.validate(raw) {
            return Ok(Value::dict([("value", value)]));
        }
        match raw {
            Value::String(field) => Ok(Value::dict([("field", field.as_str())])),
            _ => Err(self.mismatch(raw)),
        }
    }

    fn mismatch(&self, raw: &Value) -> String {
        format!("expected {self}, got {} {raw}", raw.type_label())
    }

    /// Checks that a constant default satisfies this descriptor.
    ///
    /// Model-valued constants are rejected: they would be shared by every
    /// instance, so such defaults must be generated.
    pub fn check_default(&self) -> Result<(), String> {
        match &self.default {
            Some(DefaultValue::Constant(value)) => {
                if value.contains_model() {
                    return Err("model-valued defaults must be generated".to_owned());
                }
                self.validate(value).map(|_| ())
            }
            Some(DefaultValue::Generated(_)) | None => Ok(()),
        }
    }

    /// The descriptor to use for the value itself, looking through
    /// `Nullable` when the value is present.
    pub(crate) fn effective(&self) -> &Self {
        match &*self.kind {
            Kind::Nullable(inner) | Kind::Auto(inner) | Kind::Interval(inner, _, _) => {
                inner.effective()
            }
            _ => self,
        }
    }

    /// The descriptor governing the wire form of `value`: the outermost one
    /// carrying a wire transform, looking through wrappers and into the
    /// `Either` alternative that accepts `value`.
    pub(crate) fn wire_rule(&self, value: &Value) -> &Self {
        if self.wire.is_some() {
            return self;
        }
        match &*self.kind {
            Kind::Auto(_) if value.as_str() == Some(AUTO) => self,
            Kind::Nullable(inner) | Kind::Auto(inner) | Kind::Interval(inner, _, _) => {
                inner.wire_rule(value)
            }
            Kind::Either(alternatives) => alternatives
                .iter()
                .find(|alternative| alternative.validate(value).is_ok())
                .map_or(self, |alternative| alternative.wire_rule(value)),
            _ => self,
        }
    }

    /// The descriptor governing the element at `index` of a list value.
    pub(crate) fn item_rule(&self, index: usize) -> Option<&Self> {
        match &*self.effective().kind {
            Kind::List(inner) => Some(inner),
            Kind::Tuple(slots) => slots.get(index),
            _ => None,
        }
    }

    /// The descriptor governing the entry `key` of a dict value. For a
    /// spec, only the `"value"` entry carries the literal type.
    pub(crate) fn entry_rule(&self, key: &str) -> Option<&Self> {
        match &*self.effective().kind {
            Kind::Dict(_, value) => Some(value),
            Kind::Spec(literal) if key == "value" => Some(literal),
            _ => None,
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[ValueType]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.kind {
            Kind::Any => f.write_str("Any"),
            Kind::Bool => f.write_str("Bool"),
            Kind::Int => f.write_str("Int"),
            Kind::Float => f.write_str("Float"),
            Kind::String => f.write_str("String"),
            Kind::Nullable(inner) => write!(f, "Nullable({inner})"),
            Kind::List(inner) => write!(f, "List({inner})"),
            Kind::Tuple(items) => {
                f.write_str("Tuple(")?;
                write_joined(f, items)?;
                f.write_str(")")
            }
            Kind::Dict(key, value) => write!(f, "Dict({key}, {value})"),
            Kind::Either(items) => {
                f.write_str("Either(")?;
                write_joined(f, items)?;
                f.write_str(")")
            }
            Kind::Enum(values) => {
                f.write_str("Enum(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value:?}")?;
                }
                f.write_str(")")
            }
            Kind::Instance(name) => write!(f, "Instance({name})"),
            Kind::Spec(literal) => write!(f, "Spec({literal})"),
            Kind::Auto(inner) => write!(f, "Either(Auto, {inner})"),
            Kind::Interval(inner, lo, hi) => write!(f, "Interval({inner}, {lo:?}, {hi:?})"),
            Kind::Custom(name, _) => f.write_str(name),
        }
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueType")
            .field("type", &format_args!("{self}"))
            .field("default", &self.default)
            .field("custom_wire", &self.wire.is_some())
            .finish()
    }
}
