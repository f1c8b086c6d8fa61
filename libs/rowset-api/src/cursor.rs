use std::future::Future;
use std::pin::Pin;

use crate::error::CursorError;
use crate::row::ResultRow;
use crate::schema::{Column, FieldType};

/// Sequential handle over one statement execution.
///
/// The cursor starts positioned on the first result set, before its first
/// row. The engine drives it strictly in order:
///
/// 1. read the column layout (`field_count`, `column_name`, `column_type`)
/// 2. `advance_row()` until it returns `false`, taking `raw_values()` each time
/// 3. `advance_result_set()`; `false` means the statement has no more output
///
/// Implementations own the underlying connection resources and release them
/// on drop.
pub trait Cursor {
    /// Whether the current result set has at least one row.
    fn has_rows(&self) -> Result<bool, CursorError>;

    /// Move to the next row of the current result set.
    fn advance_row(&mut self) -> Result<bool, CursorError>;

    fn field_count(&self) -> Result<usize, CursorError>;

    fn column_name(&self, index: usize) -> Result<String, CursorError>;

    fn column_type(&self, index: usize) -> Result<FieldType, CursorError>;

    /// Values of the current row, one per column, in column order.
    fn raw_values(&self) -> Result<ResultRow, CursorError>;

    /// Move to the next result set.
    fn advance_result_set(&mut self) -> Result<bool, CursorError>;

    /// Snapshot of the current result set's column layout.
    fn columns(&self) -> Result<Vec<Column>, CursorError> {
        (0..self.field_count()?)
            .map(|i| Ok(Column::new(self.column_name(i)?, self.column_type(i)?)))
            .collect()
    }
}

impl<C: Cursor + ?Sized> Cursor for &mut C {
    fn has_rows(&self) -> Result<bool, CursorError> {
        (**self).has_rows()
    }

    fn advance_row(&mut self) -> Result<bool, CursorError> {
        (**self).advance_row()
    }

    fn field_count(&self) -> Result<usize, CursorError> {
        (**self).field_count()
    }

    fn column_name(&self, index: usize) -> Result<String, CursorError> {
        (**self).column_name(index)
    }

    fn column_type(&self, index: usize) -> Result<FieldType, CursorError> {
        (**self).column_type(index)
    }

    fn raw_values(&self) -> Result<ResultRow, CursorError> {
        (**self).raw_values()
    }

    fn advance_result_set(&mut self) -> Result<bool, CursorError> {
        (**self).advance_result_set()
    }

    fn columns(&self) -> Result<Vec<Column>, CursorError> {
        (**self).columns()
    }
}

pub type CursorFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CursorError>> + Send + 'a>>;

/// Async flavour of [`Cursor`] for async-capable drivers.
///
/// Only row and result-set advancement suspend; the column layout and the
/// current row are available synchronously once advanced to.
pub trait AsyncCursor: Send {
    fn has_rows(&self) -> Result<bool, CursorError>;

    fn advance_row(&mut self) -> CursorFuture<'_, bool>;

    fn field_count(&self) -> Result<usize, CursorError>;

    fn column_name(&self, index: usize) -> Result<String, CursorError>;

    fn column_type(&self, index: usize) -> Result<FieldType, CursorError>;

    fn raw_values(&self) -> Result<ResultRow, CursorError>;

    fn advance_result_set(&mut self) -> CursorFuture<'_, bool>;

    fn columns(&self) -> Result<Vec<Column>, CursorError> {
        (0..self.field_count()?)
            .map(|i| Ok(Column::new(self.column_name(i)?, self.column_type(i)?)))
            .collect()
    }
}
