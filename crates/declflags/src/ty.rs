//! Declared types and the shape inferred from them.
//!
//! A declarer writes down what a field *is* (`Ty::List(Ty::Int)`, a literal
//! set, a tuple of two paths, ...). [`infer`] turns that into a [`Shape`]: how
//! many tokens the parser should take, how each token is converted, which
//! values are allowed, and whether the bound value is a list or a tuple.
use std::{collections::HashMap, fmt, path::PathBuf, sync::Arc};

use crate::{decl::Nargs, file::FileType, value::Typed, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
    /// No conversion: the raw string is kept.
    Any,
    Str,
    Int,
    Float,
    Bool,
    Path,
    File(FileType),
    /// A closed set of values.
    Literal(Vec<Value>),
    List(Box<Ty>),
    /// Fixed arity tuple.
    Tuple(Vec<Ty>),
    /// `E, ...`: a tuple of one or more `E`.
    TupleOpen(Box<Ty>),
    Optional(Box<Ty>),
    /// Reference to an alias declared on the class (or an ancestor).
    Named(String),
    Custom(Coercer),
}

impl Ty {
    pub fn of<T: Typed>() -> Ty {
        T::ty()
    }

    pub fn list(elem: Ty) -> Ty {
        Ty::List(Box::new(elem))
    }

    pub fn tuple(members: impl IntoIterator<Item = Ty>) -> Ty {
        Ty::Tuple(members.into_iter().collect())
    }

    pub fn tuple_open(elem: Ty) -> Ty {
        Ty::TupleOpen(Box::new(elem))
    }

    pub fn optional(inner: Ty) -> Ty {
        Ty::Optional(Box::new(inner))
    }

    pub fn literal<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Ty {
        Ty::Literal(values.into_iter().map(Into::into).collect())
    }

    pub fn named(name: impl Into<String>) -> Ty {
        Ty::Named(name.into())
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Ty::Optional(_))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Ty::Bool)
    }

    fn is_scalar(&self) -> bool {
        matches!(
            self,
            Ty::Str
                | Ty::Int
                | Ty::Float
                | Ty::Bool
                | Ty::Path
                | Ty::File(_)
                | Ty::Literal(_)
                | Ty::Custom(_)
        )
    }

    /// Coercer of a scalar type, `None` for containers and `Any`.
    fn coercer(&self) -> Option<Coercer> {
        let res = match self {
            Ty::Str => Coercer::Str,
            Ty::Int => Coercer::Int,
            Ty::Float => Coercer::Float,
            Ty::Bool => Coercer::Bool,
            Ty::Path => Coercer::Path,
            Ty::File(it) => Coercer::File(it.clone()),
            Ty::Literal(values) => match values.first() {
                Some(Value::Int(_)) => Coercer::Int,
                Some(Value::Float(_)) => Coercer::Float,
                Some(Value::Bool(_)) => Coercer::Bool,
                Some(Value::Path(_)) => Coercer::Path,
                _ => Coercer::Str,
            },
            Ty::Custom(it) => it.clone(),
            _ => return None,
        };
        Some(res)
    }

    fn literals(&self) -> Option<&[Value]> {
        match self {
            Ty::Literal(values) if !values.is_empty() => Some(values),
            _ => None,
        }
    }
}

/// Converts one raw token into a [`Value`].
#[derive(Clone)]
pub enum Coercer {
    Str,
    Int,
    Float,
    /// Explicit truthy/falsy spelling, never a toggle.
    Bool,
    Path,
    File(FileType),
    Custom { name: String, f: Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync> },
}

impl Coercer {
    pub fn custom<F>(name: impl Into<String>, f: F) -> Coercer
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        Coercer::Custom { name: name.into(), f: Arc::new(f) }
    }

    pub fn coerce(&self, raw: &str) -> Result<Value, String> {
        match self {
            Coercer::Str => Ok(Value::Str(raw.to_string())),
            Coercer::Int => raw
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|err| format!("invalid int value: '{raw}', {err}")),
            Coercer::Float => raw
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|err| format!("invalid float value: '{raw}', {err}")),
            Coercer::Bool => parse_bool(raw).map(Value::Bool),
            Coercer::Path => Ok(Value::Path(PathBuf::from(raw))),
            Coercer::File(file_type) => file_type.open(raw).map(Value::File),
            Coercer::Custom { f, .. } => f(raw),
        }
    }

    /// Whether `-1` and friends should be read as values, not flags.
    pub(crate) fn is_numeric(&self) -> bool {
        matches!(self, Coercer::Int | Coercer::Float)
    }
}

impl fmt::Debug for Coercer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coercer::Str => f.write_str("Str"),
            Coercer::Int => f.write_str("Int"),
            Coercer::Float => f.write_str("Float"),
            Coercer::Bool => f.write_str("Bool"),
            Coercer::Path => f.write_str("Path"),
            Coercer::File(it) => f.debug_tuple("File").field(it).finish(),
            Coercer::Custom { name, .. } => f.debug_tuple("Custom").field(name).finish(),
        }
    }
}

impl PartialEq for Coercer {
    fn eq(&self, other: &Coercer) -> bool {
        match (self, other) {
            (Coercer::File(a), Coercer::File(b)) => a == b,
            (Coercer::Custom { f: a, .. }, Coercer::Custom { f: b, .. }) => Arc::ptr_eq(a, b),
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Ok(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Ok(false),
        _ => Err(format!("invalid boolean value: '{raw}'")),
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unresolved type `{0}`")]
    Unresolved(String),
    #[error("type alias `{0}` refers to itself")]
    Cyclic(String),
}

/// Type aliases visible to one declaring level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    aliases: HashMap<String, Ty>,
}

impl Scope {
    pub fn new() -> Scope {
        Scope::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: Ty) {
        self.aliases.insert(name.into(), ty);
    }

    pub(crate) fn extend(&mut self, other: &Scope) {
        self.aliases.extend(other.aliases.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Replaces every `Named` reference, recursively.
    pub fn resolve(&self, ty: &Ty) -> Result<Ty, TypeError> {
        self.resolve_in(ty, &mut Vec::new())
    }

    fn resolve_in(&self, ty: &Ty, seen: &mut Vec<String>) -> Result<Ty, TypeError> {
        let res = match ty {
            Ty::Named(name) => {
                if seen.contains(name) {
                    return Err(TypeError::Cyclic(name.clone()));
                }
                let target =
                    self.aliases.get(name).ok_or_else(|| TypeError::Unresolved(name.clone()))?;
                seen.push(name.clone());
                let res = self.resolve_in(target, seen)?;
                seen.pop();
                res
            }
            Ty::List(elem) => Ty::List(Box::new(self.resolve_in(elem, seen)?)),
            Ty::TupleOpen(elem) => Ty::TupleOpen(Box::new(self.resolve_in(elem, seen)?)),
            Ty::Optional(inner) => Ty::Optional(Box::new(self.resolve_in(inner, seen)?)),
            Ty::Tuple(members) => Ty::Tuple(
                members.iter().map(|it| self.resolve_in(it, seen)).collect::<Result<_, _>>()?,
            ),
            it => it.clone(),
        };
        Ok(res)
    }
}

/// What inference learned about a field.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub nominal: Ty,
    pub element: Option<Ty>,
    pub choices: Option<Vec<Value>>,
    pub as_list: bool,
    pub as_tuple: bool,
    pub tuple_arity: Option<Nargs>,
    pub optional: bool,
    pub coercer: Option<Coercer>,
}

pub fn infer(ty: &Ty, scope: &Scope) -> Result<Shape, TypeError> {
    let nominal = scope.resolve(ty)?;
    let (optional, inner) = match &nominal {
        Ty::Optional(inner) => (true, inner.as_ref().clone()),
        it => (false, it.clone()),
    };

    let mut as_list = false;
    let mut as_tuple = false;
    let mut tuple_arity = None;
    let element = match &inner {
        Ty::List(elem) => {
            as_list = true;
            Some(elem.as_ref().clone())
        }
        Ty::Tuple(members) => {
            as_tuple = true;
            tuple_arity = Some(Nargs::Exactly(members.len()));
            members.iter().find(|it| it.is_scalar()).cloned()
        }
        Ty::TupleOpen(elem) => {
            as_tuple = true;
            tuple_arity = Some(Nargs::OneOrMore);
            Some(elem.as_ref().clone())
        }
        _ => None,
    };

    let choices = match &element {
        Some(elem) => elem.literals(),
        None => inner.literals(),
    }
    .map(<[Value]>::to_vec);

    let coercer = match &element {
        Some(elem) => elem.coercer(),
        None => inner.coercer(),
    };

    Ok(Shape { nominal, element, choices, as_list, as_tuple, tuple_arity, optional, coercer })
}
