//! Tagged dictionary values and their coercion rules.
//!
//! Every typed getter on [`Dictionary`] funnels through the `as_*` methods
//! here, so a value answers an `int` query the same way regardless of which
//! getter asked.
//!
//! Coercion rules:
//! - `Double` → integer kinds truncates toward zero; non-finite or
//!   out-of-range values are a [`StgError::TypeMismatch`].
//! - Integer kinds convert into each other with range checks.
//! - `Bool` reads as `1`/`0`; a non-zero number reads as `true`.
//! - `String` is parsed as a double and then coerced like one; for booleans
//!   `true/yes/on/1` and `false/no/off/0` are accepted, ignoring case.
//! - `Struct` and `List` never coerce to a scalar.

use std::fmt;

use num_traits::NumCast;

use super::Dictionary;
use crate::stg_error::StgError;

/// A tagged configuration value.
///
/// Through serde the integer tag is not kept: a number is read back as the
/// first kind that holds it, in the order `Int`, `UInt`, `ULong`, `Double`.
/// A `UInt(5)` therefore loads as `Int(5)`. The coercing getters read both
/// the same way.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i32),
    UInt(u32),
    ULong(u64),
    Double(f64),
    String(String),
    List(Vec<Value>),
    Struct(Dictionary),
}

impl Value {
    /// Short name of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::ULong(_) => "ulong",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Struct(_) => "struct",
        }
    }

    /// Whether the value is a scalar (neither struct nor list).
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Struct(_))
    }

    fn mismatch(&self, key: &str, expected: &'static str) -> StgError {
        let found = if self.is_scalar() {
            format!("{} `{}`", self.kind(), self)
        } else {
            self.kind().to_string()
        };
        StgError::TypeMismatch {
            key: key.to_string(),
            expected,
            found,
        }
    }

    fn as_number<T: NumCast>(&self, key: &str, expected: &'static str) -> Result<T, StgError> {
        let converted: Option<T> = match self {
            Value::Double(d) => cast_double(*d),
            Value::Int(i) => NumCast::from(*i),
            Value::UInt(u) => NumCast::from(*u),
            Value::ULong(u) => NumCast::from(*u),
            Value::Bool(b) => NumCast::from(<u8 as From<bool>>::from(*b)),
            Value::String(s) => s.trim().parse::<f64>().ok().and_then(cast_double),
            Value::List(_) | Value::Struct(_) => None,
        };
        converted.ok_or_else(|| self.mismatch(key, expected))
    }

    /// Read as `f64`. `key` only labels the error.
    pub fn as_double(&self, key: &str) -> Result<f64, StgError> {
        match self {
            Value::Double(d) => Ok(*d),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| self.mismatch(key, "double")),
            _ => self.as_number(key, "double"),
        }
    }

    /// Read as `i32`.
    pub fn as_int(&self, key: &str) -> Result<i32, StgError> {
        self.as_number(key, "int")
    }

    /// Read as `u32`.
    pub fn as_uint(&self, key: &str) -> Result<u32, StgError> {
        self.as_number(key, "uint")
    }

    /// Read as `u64`.
    pub fn as_ulong(&self, key: &str) -> Result<u64, StgError> {
        self.as_number(key, "ulong")
    }

    /// Read as `bool`.
    pub fn as_bool(&self, key: &str) -> Result<bool, StgError> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Double(d) if d.is_finite() => Ok(*d != 0.0),
            Value::Int(i) => Ok(*i != 0),
            Value::UInt(u) => Ok(*u != 0),
            Value::ULong(u) => Ok(*u != 0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(self.mismatch(key, "bool")),
            },
            _ => Err(self.mismatch(key, "bool")),
        }
    }

    /// Read as a string. Scalars render through `Display`.
    pub fn as_string(&self, key: &str) -> Result<String, StgError> {
        match self {
            Value::String(s) => Ok(s.clone()),
            v if v.is_scalar() => Ok(v.to_string()),
            v => Err(v.mismatch(key, "string")),
        }
    }

    /// Borrow the string payload without conversion.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Dictionary> {
        match self {
            Value::Struct(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Value::Struct(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    // ---------------------------------------------------------------------
    // In-place mutation
    // ---------------------------------------------------------------------

    pub fn set_double(&mut self, value: f64) {
        *self = Value::Double(value);
    }

    pub fn set_int(&mut self, value: i32) {
        *self = Value::Int(value);
    }

    pub fn set_uint(&mut self, value: u32) {
        *self = Value::UInt(value);
    }

    pub fn set_ulong(&mut self, value: u64) {
        *self = Value::ULong(value);
    }

    pub fn set_bool(&mut self, value: bool) {
        *self = Value::Bool(value);
    }

    pub fn set_string(&mut self, value: impl Into<String>) {
        *self = Value::String(value.into());
    }

    // ---------------------------------------------------------------------
    // Struct and list navigation
    // ---------------------------------------------------------------------

    /// Add (or overwrite) a member of a struct value.
    pub fn add_member(&mut self, key: impl Into<String>, value: Value) -> Result<(), StgError> {
        let key = key.into();
        match self {
            Value::Struct(d) => {
                d.add(key, value);
                Ok(())
            }
            _ => Err(StgError::NotAStruct(key)),
        }
    }

    /// Look up a member of a struct value. Non-structs have no members.
    pub fn get_member(&self, key: &str) -> Option<&Value> {
        self.as_struct().and_then(|d| d.get_opt(key))
    }

    pub fn get_member_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.as_struct_mut().and_then(|d| d.get_mut(key))
    }

    /// Append an element to a list value.
    pub fn add_element(&mut self, value: Value) -> Result<(), StgError> {
        match self {
            Value::List(items) => {
                items.push(value);
                Ok(())
            }
            other => Err(StgError::NotAList(other.kind().to_string())),
        }
    }

    /// Number of elements when iterated with [`elements`](Self::elements).
    pub fn element_count(&self) -> usize {
        match self {
            Value::List(items) => items.len(),
            _ => 1,
        }
    }

    /// First element of a list; a non-list value is its own first element.
    pub fn first_element(&self) -> Option<&Value> {
        self.elements().next()
    }

    /// Iterate elements. A non-list value yields itself exactly once, so a
    /// single entry and a one-element list read the same way.
    pub fn elements(&self) -> std::slice::Iter<'_, Value> {
        match self {
            Value::List(items) => items.iter(),
            other => std::slice::from_ref(other).iter(),
        }
    }

    pub fn element(&self, index: usize) -> Option<&Value> {
        self.elements().nth(index)
    }

    pub fn element_mut(&mut self, index: usize) -> Option<&mut Value> {
        match self {
            Value::List(items) => items.get_mut(index),
            other if index == 0 => Some(other),
            _ => None,
        }
    }
}

fn cast_double<T: NumCast>(d: f64) -> Option<T> {
    if d.is_finite() {
        NumCast::from(d.trunc())
    } else {
        None
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::UInt(u) => write!(f, "{u}"),
            Value::ULong(u) => write!(f, "{u}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Struct(d) => write!(f, "{d}"),
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i32 => Int,
    u32 => UInt,
    u64 => ULong,
    f64 => Double,
    String => String,
    Vec<Value> => List,
    Dictionary => Struct,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}
