use std::cmp::Ordering;

use rowset_api::result::ResultSet;
use rowset_api::row::{ResultRow, compare_rows};
use rowset_api::value::Value;

use crate::config::CompareConfig;
use crate::error::EngineError;

/// A row position where two result sets disagree.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RowMismatch {
    pub index: usize,
    pub left: ResultRow,
    pub right: ResultRow,
}

/// Compares two result sets row by row.
///
/// Structural differences (column or row count) abort before any row is
/// looked at. Row differences do not abort: every mismatching index is
/// reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultSetComparer {
    ignore_ordering: bool,
}

impl ResultSetComparer {
    pub fn new(ignore_ordering: bool) -> Self {
        Self { ignore_ordering }
    }

    pub fn from_config(config: &CompareConfig) -> Self {
        Self::new(config.ignore_ordering)
    }

    pub fn ignores_ordering(&self) -> bool {
        self.ignore_ordering
    }

    /// Compare `x` and `y`, calling `on_mismatch(index, x_row, y_row)` for
    /// every differing position. Returns the number of mismatches.
    ///
    /// With `ignore_ordering`, both row lists are sorted in place first
    /// (NULL first, column by column). Duplicates are kept, so repeated rows
    /// still have to line up after sorting.
    ///
    /// Every column must hold mutually comparable values across both sets,
    /// whether or not ordering is ignored. A column mixing kinds fails with
    /// `IncomparableTypes` even when the sets are identical.
    pub fn compare<F>(
        &self,
        x: &mut ResultSet<ResultRow>,
        y: &mut ResultSet<ResultRow>,
        mut on_mismatch: F,
    ) -> Result<usize, EngineError>
    where
        F: FnMut(usize, &ResultRow, &ResultRow),
    {
        check_structure(x, y)?;
        check_comparable(x, y)?;

        if self.ignore_ordering {
            sort_rows(&mut x.rows);
            sort_rows(&mut y.rows);
        }

        let mut mismatches = 0;
        for (index, (a, b)) in x.rows.iter().zip(&y.rows).enumerate() {
            if compare_rows(a, b)? != Ordering::Equal {
                mismatches += 1;
                on_mismatch(index, a, b);
            }
        }

        tracing::debug!(
            columns = x.columns.len(),
            rows = x.rows.len(),
            ignore_ordering = self.ignore_ordering,
            mismatches,
            "result sets compared"
        );
        Ok(mismatches)
    }

    /// Like [`compare`](Self::compare), collecting the mismatches.
    pub fn diff(
        &self,
        x: &mut ResultSet<ResultRow>,
        y: &mut ResultSet<ResultRow>,
    ) -> Result<Vec<RowMismatch>, EngineError> {
        let mut mismatches = Vec::new();
        self.compare(x, y, |index, left, right| {
            mismatches.push(RowMismatch {
                index,
                left: left.clone(),
                right: right.clone(),
            });
        })?;
        Ok(mismatches)
    }
}

fn check_structure(x: &ResultSet<ResultRow>, y: &ResultSet<ResultRow>) -> Result<(), EngineError> {
    if x.columns.len() != y.columns.len() {
        return Err(EngineError::StructuralMismatch {
            what: "columns",
            left: x.columns.len(),
            right: y.columns.len(),
        });
    }
    if x.rows.len() != y.rows.len() {
        return Err(EngineError::StructuralMismatch {
            what: "rows",
            left: x.rows.len(),
            right: y.rows.len(),
        });
    }
    Ok(())
}

/// Every row has one value per column, and within each column all non-null
/// values (across both sets) are mutually comparable. After this, row
/// comparison between any two rows cannot fail.
fn check_comparable(x: &ResultSet<ResultRow>, y: &ResultSet<ResultRow>) -> Result<(), EngineError> {
    x.validate()?;
    y.validate()?;

    for column in 0..x.columns.len() {
        let mut values = x
            .rows
            .iter()
            .chain(&y.rows)
            .map(|row| &row[column])
            .filter(|v| !v.is_null());
        let Some(first) = values.next() else {
            continue;
        };
        values.try_for_each(|v: &Value| first.try_cmp(v).map(drop))?;
    }
    Ok(())
}

fn sort_rows(rows: &mut [ResultRow]) {
    // Comparability was checked up front.
    rows.sort_by(|a, b| compare_rows(a, b).unwrap_or(Ordering::Equal));
}
