use std::cmp::Ordering;
use std::fmt;

use crate::error::RowError;
use crate::schema::FieldType;

/// Canonical column value, one per column of a `ResultRow`.
///
/// The variant mirrors the declaring column's `FieldType`; SQL NULL is the
/// explicit `Null` variant rather than a sentinel.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The column type this value belongs to. `None` for `Null`.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(FieldType::Bool),
            Value::Int16(_) => Some(FieldType::Int16),
            Value::Int32(_) => Some(FieldType::Int32),
            Value::Int64(_) => Some(FieldType::Int64),
            Value::Float32(_) => Some(FieldType::Float32),
            Value::Float64(_) => Some(FieldType::Float64),
            Value::String(_) => Some(FieldType::String),
            Value::Bytes(_) => Some(FieldType::Bytes),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.field_type().map_or("null", FieldType::name)
    }

    /// Integer value widened to `i64`. Floats are not integers here.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int16(n) => Some(i64::from(*n)),
            Value::Int32(n) => Some(i64::from(*n)),
            Value::Int64(n) => Some(*n),
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float32(v) => Some(f64::from(*v)),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Total ordering with NULL first.
    ///
    /// - NULL equals NULL and sorts before every non-null value.
    /// - Integers of any width compare as `i64`; floats of any width compare
    ///   with IEEE total ordering, so NaN has a fixed place.
    /// - Strings compare ordinally, bytes lexicographically, `false < true`.
    ///
    /// Any other pairing (including integer vs float) is `IncomparableTypes`.
    pub fn try_cmp(&self, other: &Value) -> Result<Ordering, RowError> {
        match (self, other) {
            (Value::Null, Value::Null) => Ok(Ordering::Equal),
            (Value::Null, _) => Ok(Ordering::Less),
            (_, Value::Null) => Ok(Ordering::Greater),
            (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Ok(a.cmp(b)),
            _ => {
                if let (Some(a), Some(b)) = (self.as_i64(), other.as_i64()) {
                    return Ok(a.cmp(&b));
                }
                if let (Some(a), Some(b)) = (self.as_float(), other.as_float()) {
                    return Ok(cmp_float(a, b));
                }
                Err(RowError::IncomparableTypes {
                    left: self.type_name(),
                    right: other.type_name(),
                })
            }
        }
    }
}

/// Numeric order with `0.0 == -0.0`. NaN equals NaN and sorts after every
/// other float.
fn cmp_float(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Bytes(v) => {
                f.write_str("0x")?;
                for b in v {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Coercion of a column value into a member type.
///
/// Errors carry no column name; the row converter attaches it.
pub trait FromValue: Sized {
    /// Target type name used in error messages.
    const TYPE_NAME: &'static str;

    fn from_value(value: Value) -> Result<Self, RowError>;
}

/// NULL becomes `None`; anything else is coerced to `T`.
impl<T: FromValue> FromValue for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_value(value: Value) -> Result<Self, RowError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "value";

    fn from_value(value: Value) -> Result<Self, RowError> {
        Ok(value)
    }
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: Value) -> Result<Self, RowError> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::Null => Err(RowError::null(Self::TYPE_NAME)),
            other => Err(RowError::type_mismatch(other.type_name(), Self::TYPE_NAME)),
        }
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: Value) -> Result<Self, RowError> {
        match value {
            Value::String(v) => Ok(v),
            Value::Null => Err(RowError::null(Self::TYPE_NAME)),
            other => Err(RowError::type_mismatch(other.type_name(), Self::TYPE_NAME)),
        }
    }
}

impl FromValue for Vec<u8> {
    const TYPE_NAME: &'static str = "bytes";

    fn from_value(value: Value) -> Result<Self, RowError> {
        match value {
            Value::Bytes(v) => Ok(v),
            Value::Null => Err(RowError::null(Self::TYPE_NAME)),
            other => Err(RowError::type_mismatch(other.type_name(), Self::TYPE_NAME)),
        }
    }
}

// Integers: any integer column into any integer member, checked.
macro_rules! integer_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn from_value(value: Value) -> Result<Self, RowError> {
                    match value.as_i64() {
                        Some(n) => <$ty>::try_from(n)
                            .map_err(|_| RowError::overflow(Self::TYPE_NAME, n)),
                        None if value.is_null() => Err(RowError::null(Self::TYPE_NAME)),
                        None => Err(RowError::type_mismatch(value.type_name(), Self::TYPE_NAME)),
                    }
                }
            }
        )*
    };
}

integer_from_value!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn from_value(value: Value) -> Result<Self, RowError> {
        match value {
            Value::Float64(v) => Ok(v),
            Value::Float32(v) => Ok(f64::from(v)),
            Value::Int16(n) => Ok(f64::from(n)),
            Value::Int32(n) => Ok(f64::from(n)),
            Value::Int64(n) => Ok(n as f64),
            Value::Null => Err(RowError::null(Self::TYPE_NAME)),
            other => Err(RowError::type_mismatch(other.type_name(), Self::TYPE_NAME)),
        }
    }
}

impl FromValue for f32 {
    const TYPE_NAME: &'static str = "f32";

    fn from_value(value: Value) -> Result<Self, RowError> {
        match value {
            Value::Float32(v) => Ok(v),
            Value::Float64(v) => {
                if v.is_finite() && v.abs() > f64::from(f32::MAX) {
                    Err(RowError::overflow(Self::TYPE_NAME, v))
                } else {
                    Ok(v as f32)
                }
            }
            Value::Int16(n) => Ok(f32::from(n)),
            Value::Int32(n) => Ok(n as f32),
            Value::Int64(n) => Ok(n as f32),
            Value::Null => Err(RowError::null(Self::TYPE_NAME)),
            other => Err(RowError::type_mismatch(other.type_name(), Self::TYPE_NAME)),
        }
    }
}
