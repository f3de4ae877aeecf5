//! Binding the flat parse results back onto declared fields.
use std::{collections::BTreeMap, fmt};

use crate::{
    registry::{Entry, Registry},
    value::FromValue,
    Args, Error, Result, Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Parsed from the command line.
    Input,
    /// A declared (or action-implied) default.
    Default,
}

/// The flat result set of one parse, keyed by binding key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    values: BTreeMap<String, (Value, Origin)>,
}

impl Namespace {
    pub fn insert_input(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), (value, Origin::Input));
    }

    pub fn insert_default(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), (value, Origin::Default));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).map(|(value, _)| value)
    }

    pub fn origin(&self, key: &str) -> Option<Origin> {
        self.values.get(key).map(|&(_, origin)| origin)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// Field values of one class after a load. A slot is `None` when its
/// binding key was absent from the results.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    class: String,
    slots: Vec<(String, Option<Value>)>,
}

impl Bound {
    pub fn class(&self) -> &str {
        &self.class
    }

    /// The typed value of `field`.
    ///
    /// Fails when the field is not declared, when its slot is unset or
    /// `None` (unless `T` is an `Option`), or when the value has another type.
    pub fn get<T: FromValue>(&self, field: &str) -> Result<T> {
        let unset = || Error::Unset { class: self.class.clone(), field: field.to_string() };
        match self.slot(field)? {
            None => T::from_unset().ok_or_else(unset),
            Some(value) => T::from_value(value).ok_or_else(|| {
                if value.is_none() {
                    unset()
                } else {
                    Error::Mismatch {
                        field: field.to_string(),
                        expected: std::any::type_name::<T>(),
                        found: value.kind(),
                    }
                }
            }),
        }
    }

    /// The raw value of `field`, `None` when unset.
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.slots.iter().find(|(name, _)| name == field).and_then(|(_, value)| value.as_ref())
    }

    pub fn is_set(&self, field: &str) -> bool {
        self.value(field).is_some()
    }

    /// Set, non-`None` values in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.slots.iter().filter_map(|(name, value)| match value {
            Some(value) if !value.is_none() => Some((name.as_str(), value)),
            _ => None,
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(name, _)| name)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.iter().map(|(_, value)| value)
    }

    fn slot(&self, field: &str) -> Result<Option<&Value>> {
        match self.slots.iter().find(|(name, _)| name == field) {
            Some((_, value)) => Ok(value.as_ref()),
            None => {
                Err(Error::UnknownField { class: self.class.clone(), field: field.to_string() })
            }
        }
    }
}

/// Fills one slot per registry entry from `ns`.
pub fn bind(registry: &Registry, ns: &Namespace) -> Bound {
    let slots = registry
        .entries()
        .iter()
        .map(|entry| {
            let key = entry.binding_key();
            let value = ns.get(&key).map(|raw| match ns.origin(&key) {
                Some(Origin::Input) => coerce(entry, raw.clone()),
                _ => raw.clone(),
            });
            tracing::trace!(class = %registry.class(), field = %entry.attr, %key, ?value, "bound");
            (entry.attr.clone(), value)
        })
        .collect();
    Bound { class: registry.class().to_string(), slots }
}

/// Wraps values into the container the field's shape asks for.
fn coerce(entry: &Entry, value: Value) -> Value {
    let Some(shape) = &entry.shape else { return value };
    if value.is_none() {
        return value;
    }
    if shape.as_list {
        match value {
            Value::List(_) => value,
            Value::Tuple(items) => Value::List(items),
            it => Value::List(vec![it]),
        }
    } else if shape.as_tuple {
        match value {
            Value::Tuple(_) => value,
            Value::List(items) => Value::Tuple(items),
            it => Value::Tuple(vec![it]),
        }
    } else {
        value
    }
}

/// A resolved class together with its bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    class: String,
    command: Option<String>,
    bound: Bound,
}

impl Instance {
    pub(crate) fn new(registry: &Registry, command: Option<&str>, bound: Bound) -> Instance {
        Instance {
            class: registry.class().to_string(),
            command: command.map(str::to_string),
            bound,
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// The subcommand name this instance was chosen under, `None` for the root.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn bound(&self) -> &Bound {
        &self.bound
    }

    pub fn get<T: FromValue>(&self, field: &str) -> Result<T> {
        self.bound.get(field)
    }

    pub fn is<A: Args>(&self) -> bool {
        self.class == A::NAME
    }

    pub fn to<A: Args>(&self) -> Result<A> {
        if !self.is::<A>() {
            return Err(Error::WrongClass { expected: A::NAME.to_string(), found: self.class.clone() });
        }
        A::from_bound(&self.bound)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class())?;
        if let Some(command) = self.command() {
            write!(f, " ({command})")?;
        }
        for (key, value) in self.bound().iter() {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

/// Everything one load produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    root: Instance,
    chain: Vec<Instance>,
}

impl Loaded {
    pub(crate) fn new(root: Instance, chain: Vec<Instance>) -> Loaded {
        Loaded { root, chain }
    }

    pub fn root(&self) -> &Instance {
        &self.root
    }

    /// Resolved subcommands, outermost first.
    pub fn chain(&self) -> &[Instance] {
        &self.chain
    }

    /// The most deeply nested chosen subcommand, if any was chosen.
    pub fn deepest(&self) -> Option<&Instance> {
        self.chain.last()
    }

    pub fn find(&self, class: &str) -> Option<&Instance> {
        iter_all(self).find(|it| it.class == class)
    }

    /// The root, converted into its declared type.
    pub fn args<A: Args>(&self) -> Result<A> {
        self.root.to()
    }

    /// The instance of `A` along the chosen path, if it was chosen.
    pub fn subcommand<A: Args>(&self) -> Result<Option<A>> {
        self.chain.iter().find(|it| it.is::<A>()).map(Instance::to::<A>).transpose()
    }
}

fn iter_all(loaded: &Loaded) -> impl Iterator<Item = &Instance> + '_ {
    std::iter::once(&loaded.root).chain(loaded.chain.iter())
}
