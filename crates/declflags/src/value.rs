//! Parsed values and their conversion into Rust types.
use std::{fmt, path::PathBuf};

use crate::{file::Handle, ty::Ty};

/// A value produced by the parser or declared as a default/constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Path(PathBuf),
    File(Handle),
    List(Vec<Value>),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Value::Tuple(_))
    }

    /// Name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Path(_) => "path",
            Value::File(_) => "file",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(it) => Some(it.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(it) => write!(f, "{it}"),
            Value::Int(it) => write!(f, "{it}"),
            Value::Float(it) => write!(f, "{it}"),
            Value::Str(it) => f.write_str(it),
            Value::Path(it) => write!(f, "{}", it.display()),
            Value::File(it) => write!(f, "{}", it.name()),
            Value::List(items) => {
                f.write_str("[")?;
                join(f, items)?;
                f.write_str("]")
            }
            Value::Tuple(items) => {
                f.write_str("(")?;
                join(f, items)?;
                f.write_str(")")
            }
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

macro_rules! from_int {
    ($($ty:ty)*) => {$(
        impl From<$ty> for Value {
            fn from(it: $ty) -> Value {
                Value::Int(it as i64)
            }
        }
    )*};
}
from_int!(i8 i16 i32 i64 u8 u16 u32 isize);

impl From<bool> for Value {
    fn from(it: bool) -> Value {
        Value::Bool(it)
    }
}

impl From<f64> for Value {
    fn from(it: f64) -> Value {
        Value::Float(it)
    }
}

impl From<f32> for Value {
    fn from(it: f32) -> Value {
        Value::Float(it as f64)
    }
}

impl From<&str> for Value {
    fn from(it: &str) -> Value {
        Value::Str(it.to_string())
    }
}

impl From<String> for Value {
    fn from(it: String) -> Value {
        Value::Str(it)
    }
}

impl From<PathBuf> for Value {
    fn from(it: PathBuf) -> Value {
        Value::Path(it)
    }
}

impl From<Handle> for Value {
    fn from(it: Handle) -> Value {
        Value::File(it)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(it: Option<T>) -> Value {
        it.map_or(Value::None, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(it: Vec<T>) -> Value {
        Value::List(it.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(it: [T; N]) -> Value {
        Value::List(it.into_iter().map(Into::into).collect())
    }
}

macro_rules! from_tuple {
    ($($name:ident)*) => {
        impl<$($name: Into<Value>),*> From<($($name,)*)> for Value {
            #[allow(non_snake_case)]
            fn from(($($name,)*): ($($name,)*)) -> Value {
                Value::Tuple(vec![$($name.into()),*])
            }
        }
    };
}
from_tuple!(A B);
from_tuple!(A B C);
from_tuple!(A B C D);

/// Conversion out of a bound [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;

    /// What an unset slot reads as. Only `Option` has an answer.
    fn from_unset() -> Option<Self> {
        None
    }
}

/// A Rust type that also knows its declared [`Ty`].
pub trait Typed: FromValue {
    fn ty() -> Ty;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(it) => Some(it.clone()),
            _ => None,
        }
    }
}

impl Typed for String {
    fn ty() -> Ty {
        Ty::Str
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(it) => Some(*it),
            _ => None,
        }
    }
}

impl Typed for bool {
    fn ty() -> Ty {
        Ty::Bool
    }
}

macro_rules! int {
    ($($ty:ty)*) => {$(
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Int(it) => <$ty>::try_from(*it).ok(),
                    _ => None,
                }
            }
        }

        impl Typed for $ty {
            fn ty() -> Ty {
                Ty::Int
            }
        }
    )*};
}
int!(i8 i16 i32 i64 u8 u16 u32 u64 isize usize);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(it) => Some(*it),
            Value::Int(it) => Some(*it as f64),
            _ => None,
        }
    }
}

impl Typed for f64 {
    fn ty() -> Ty {
        Ty::Float
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|it| it as f32)
    }
}

impl Typed for f32 {
    fn ty() -> Ty {
        Ty::Float
    }
}

impl FromValue for PathBuf {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Path(it) => Some(it.clone()),
            Value::Str(it) => Some(PathBuf::from(it)),
            _ => None,
        }
    }
}

impl Typed for PathBuf {
    fn ty() -> Ty {
        Ty::Path
    }
}

impl FromValue for Handle {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::File(it) => Some(it.clone()),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::None => Some(None),
            it => T::from_value(it).map(Some),
        }
    }

    fn from_unset() -> Option<Self> {
        Some(None)
    }
}

impl<T: Typed> Typed for Option<T> {
    fn ty() -> Ty {
        Ty::Optional(Box::new(T::ty()))
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) | Value::Tuple(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn ty() -> Ty {
        Ty::List(Box::new(T::ty()))
    }
}

macro_rules! tuple {
    ($n:literal; $($name:ident)*) => {
        impl<$($name: FromValue),*> FromValue for ($($name,)*) {
            #[allow(non_snake_case)]
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Tuple(items) | Value::List(items) if items.len() == $n => {
                        let mut it = items.iter();
                        $(let $name = $name::from_value(it.next()?)?;)*
                        Some(($($name,)*))
                    }
                    _ => None,
                }
            }
        }

        impl<$($name: Typed),*> Typed for ($($name,)*) {
            fn ty() -> Ty {
                Ty::Tuple(vec![$($name::ty()),*])
            }
        }
    };
}
tuple!(2; A B);
tuple!(3; A B C);
tuple!(4; A B C D);
