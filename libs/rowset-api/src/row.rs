use std::cmp::Ordering;
use std::ops::Index;

use crate::error::RowError;
use crate::value::Value;

/// Positional array of values. Order matches the owning result set's columns.
///
/// Values only, no names or types. Immutable once built: the only way to
/// place values after allocation is [`RowBuilder`], which hands out the
/// finished row and is consumed in the process.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ResultRow(Vec<Value>);

impl ResultRow {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }

    /// Fails with `ShapeMismatch` unless the row holds exactly `expected` values.
    pub fn check_len(&self, expected: usize) -> Result<(), RowError> {
        if self.0.len() == expected {
            Ok(())
        } else {
            Err(RowError::ShapeMismatch { expected, actual: self.0.len() })
        }
    }
}

impl Index<usize> for ResultRow {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.0[index]
    }
}

impl IntoIterator for ResultRow {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultRow {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Value> for ResultRow {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builds a synthetic row of fixed length slot by slot.
///
/// Unset slots stay NULL.
#[derive(Debug)]
pub struct RowBuilder {
    values: Vec<Value>,
}

impl RowBuilder {
    pub fn with_len(len: usize) -> Self {
        Self { values: vec![Value::Null; len] }
    }

    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<&mut Self, RowError> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(RowError::ShapeMismatch { expected: len, actual: index.saturating_add(1) })?;
        *slot = value.into();
        Ok(self)
    }

    pub fn finish(self) -> ResultRow {
        ResultRow(self.values)
    }
}

/// Three-way row comparison, column by column, NULL first.
///
/// Returns the first non-equal column ordering. Rows of different length
/// fail with `ShapeMismatch`; values of unrelated kinds with `IncomparableTypes`.
pub fn compare_rows(a: &ResultRow, b: &ResultRow) -> Result<Ordering, RowError> {
    b.check_len(a.len())?;
    for (x, y) in a.iter().zip(b.iter()) {
        match x.try_cmp(y)? {
            Ordering::Equal => continue,
            other => return Ok(other),
        }
    }
    Ok(Ordering::Equal)
}
