use std::iter::FusedIterator;

use rowset_api::converter::{FromRow, RowConverter};
use rowset_api::cursor::{AsyncCursor, Cursor};
use rowset_api::mapping::Shape;
use rowset_api::result::ResultSet;
use rowset_api::schema::Column;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Cursor sits on a result set that has not been read yet.
    First,
    /// Current result set consumed; advance before reading.
    Next,
    Done,
}

/// Single-pass reader over every result set a statement yields.
///
/// One converter is built per result set from its column snapshot and
/// applied to every row of that set. Yields sets in cursor order; after an
/// error the reader is exhausted. Dropping it early simply stops advancing
/// the cursor.
pub struct ResultSetReader<C, T> {
    cursor: C,
    shape: fn() -> Shape<T>,
    state: State,
    index: usize,
}

impl<C: Cursor, T: FromRow> ResultSetReader<C, T> {
    pub fn new(cursor: C) -> Self {
        Self::with_shape(cursor, T::shape)
    }
}

impl<C: Cursor, T> ResultSetReader<C, T> {
    /// Reader with an explicit shape provider, called once per result set.
    pub fn with_shape(cursor: C, shape: fn() -> Shape<T>) -> Self {
        Self {
            cursor,
            shape,
            state: State::First,
            index: 0,
        }
    }

    /// Number of result sets read so far.
    pub fn result_sets_read(&self) -> usize {
        self.index
    }

    fn advance(&mut self) -> Result<bool, EngineError> {
        match self.state {
            State::First => Ok(true),
            State::Next => Ok(self.cursor.advance_result_set()?),
            State::Done => Ok(false),
        }
    }
}

impl<C: Cursor, T> Iterator for ResultSetReader<C, T> {
    type Item = Result<ResultSet<T>, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(true) => {}
            Ok(false) => {
                self.state = State::Done;
                return None;
            }
            Err(e) => {
                self.state = State::Done;
                return Some(Err(e));
            }
        }

        let index = self.index;
        self.index += 1;
        let result = read_current(&mut self.cursor, (self.shape)())
            .map_err(|e| e.with_context(format!("result set {index}")));
        self.state = if result.is_ok() { State::Next } else { State::Done };
        if let Ok(set) = &result {
            tracing::debug!(
                index,
                columns = set.columns.len(),
                rows = set.rows.len(),
                "result set read"
            );
        }
        Some(result)
    }
}

impl<C: Cursor, T> FusedIterator for ResultSetReader<C, T> {}

fn read_current<C: Cursor, T>(cursor: &mut C, shape: Shape<T>) -> Result<ResultSet<T>, EngineError> {
    let columns = cursor.columns()?;
    let converter = RowConverter::build(shape, &columns);
    let mut rows = Vec::new();
    if cursor.has_rows()? {
        while cursor.advance_row()? {
            rows.push(converter.convert(cursor.raw_values()?)?);
        }
    }
    Ok(ResultSet::new(columns, rows))
}

/// Eagerly read every result set into memory.
pub fn read_result_sets<C: Cursor, T: FromRow>(cursor: C) -> Result<Vec<ResultSet<T>>, EngineError> {
    ResultSetReader::<C, T>::new(cursor).collect()
}

/// Async counterpart of [`read_result_sets`].
///
/// Awaits only on cursor advancement; result sets and rows are still read
/// strictly in order.
pub async fn read_result_sets_async<C, T>(cursor: &mut C) -> Result<Vec<ResultSet<T>>, EngineError>
where
    C: AsyncCursor + ?Sized,
    T: FromRow,
{
    let mut sets = Vec::new();
    loop {
        let index = sets.len();
        let set = read_current_async(cursor, T::shape())
            .await
            .map_err(|e| e.with_context(format!("result set {index}")))?;
        tracing::debug!(
            index,
            columns = set.columns.len(),
            rows = set.rows.len(),
            "result set read"
        );
        sets.push(set);
        if !cursor.advance_result_set().await? {
            break;
        }
    }
    Ok(sets)
}

async fn read_current_async<C, T>(cursor: &mut C, shape: Shape<T>) -> Result<ResultSet<T>, EngineError>
where
    C: AsyncCursor + ?Sized,
{
    let columns: Vec<Column> = cursor.columns()?;
    let converter = RowConverter::build(shape, &columns);
    let mut rows = Vec::new();
    if cursor.has_rows()? {
        while cursor.advance_row().await? {
            rows.push(converter.convert(cursor.raw_values()?)?);
        }
    }
    Ok(ResultSet::new(columns, rows))
}
