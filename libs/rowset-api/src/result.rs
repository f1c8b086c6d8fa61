use crate::error::RowError;
use crate::row::ResultRow;
use crate::schema::Column;

/// One table produced by a statement: its columns and materialized rows.
///
/// All rows share `columns`. Built by a reader in one pass over the cursor;
/// afterwards only row order may change (see the engine's comparer).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResultSet<T> {
    pub columns: Vec<Column>,
    pub rows: Vec<T>,
}

impl<T> ResultSet<T> {
    pub fn new(columns: Vec<Column>, rows: Vec<T>) -> Self {
        Self { columns, rows }
    }
}

impl ResultSet<ResultRow> {
    /// Every row must hold one value per column.
    pub fn validate(&self) -> Result<(), RowError> {
        self.rows
            .iter()
            .try_for_each(|row| row.check_len(self.columns.len()))
    }
}
