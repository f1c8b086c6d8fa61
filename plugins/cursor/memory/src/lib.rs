use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rowset_api::cursor::{AsyncCursor, Cursor, CursorFuture};
use rowset_api::error::CursorError;
use rowset_api::row::ResultRow;
use rowset_api::schema::{Column, FieldType};
use rowset_api::value::Value;
use rowset_engine::connection::{Session, Statement};

// ═══════════════════════════════════════════════════════════════
//  Fixtures
// ═══════════════════════════════════════════════════════════════

/// One scripted result set.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryResultSet {
    pub columns: Vec<Column>,
    pub rows: Vec<ResultRow>,
}

impl MemoryResultSet {
    pub fn new(columns: Vec<Column>, rows: Vec<ResultRow>) -> Self {
        Self { columns, rows }
    }

    /// Shorthand: `(name, type)` pairs and rows of values.
    pub fn of(columns: &[(&str, FieldType)], rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.iter().map(|(n, t)| Column::new(*n, *t)).collect(),
            rows: rows.into_iter().map(ResultRow::new).collect(),
        }
    }
}

/// JSON form of a result set: values are typed by their column.
#[derive(Debug, serde::Deserialize)]
struct FixtureSet {
    columns: Vec<Column>,
    #[serde(default)]
    rows: Vec<Vec<serde_json::Value>>,
}

/// Parse result sets from JSON:
///
/// ```json
/// [{ "columns": [{ "name": "Foo", "type": "int32" }], "rows": [[42], [null]] }]
/// ```
pub fn result_sets_from_json(json: &str) -> Result<Vec<MemoryResultSet>, CursorError> {
    let sets: Vec<FixtureSet> =
        serde_json::from_str(json).map_err(|e| CursorError::protocol(e.to_string()))?;
    sets.into_iter().map(fixture_to_set).collect()
}

fn fixture_to_set(fixture: FixtureSet) -> Result<MemoryResultSet, CursorError> {
    let rows = fixture
        .rows
        .into_iter()
        .enumerate()
        .map(|(r, raw)| {
            if raw.len() != fixture.columns.len() {
                return Err(CursorError::protocol(format!(
                    "row {r}: {} values for {} columns",
                    raw.len(),
                    fixture.columns.len()
                )));
            }
            raw.into_iter()
                .zip(&fixture.columns)
                .map(|(v, c)| json_to_value(v, c.field_type).map_err(|e| e.with_context(&c.name)))
                .collect::<Result<ResultRow, _>>()
                .map_err(|e| e.with_context(format!("row {r}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MemoryResultSet::new(fixture.columns, rows))
}

fn json_to_value(v: serde_json::Value, field_type: FieldType) -> Result<Value, CursorError> {
    use serde_json::Value as Json;

    let mismatch = |v: &Json| CursorError::protocol(format!("{v} is not a valid {field_type}"));
    match (field_type, v) {
        (_, Json::Null) => Ok(Value::Null),
        (FieldType::Bool, Json::Bool(b)) => Ok(Value::Bool(b)),
        (FieldType::Int16, Json::Number(n)) => n
            .as_i64()
            .and_then(|n| i16::try_from(n).ok())
            .map(Value::Int16)
            .ok_or_else(|| mismatch(&Json::Number(n))),
        (FieldType::Int32, Json::Number(n)) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Value::Int32)
            .ok_or_else(|| mismatch(&Json::Number(n))),
        (FieldType::Int64, Json::Number(n)) => n
            .as_i64()
            .map(Value::Int64)
            .ok_or_else(|| mismatch(&Json::Number(n))),
        (FieldType::Float32, Json::Number(n)) => n
            .as_f64()
            .map(|f| Value::Float32(f as f32))
            .ok_or_else(|| mismatch(&Json::Number(n))),
        (FieldType::Float64, Json::Number(n)) => n
            .as_f64()
            .map(Value::Float64)
            .ok_or_else(|| mismatch(&Json::Number(n))),
        (FieldType::String, Json::String(s)) => Ok(Value::String(s)),
        (FieldType::Bytes, Json::Array(items)) => items
            .iter()
            .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(Value::Bytes)
            .ok_or_else(|| mismatch(&Json::Array(items.clone()))),
        (_, other) => Err(mismatch(&other)),
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryCursor
// ═══════════════════════════════════════════════════════════════

/// Cursor over scripted result sets. Starts on the first set, before its
/// first row.
#[derive(Debug)]
pub struct MemoryCursor {
    sets: Vec<MemoryResultSet>,
    set: usize,
    row: Option<usize>,
    /// Current set's rows are drained; stays set until the next result set.
    exhausted: bool,
    /// Open-cursor counter of the owning session, decremented on drop.
    open: Option<Arc<AtomicUsize>>,
}

impl MemoryCursor {
    pub fn new(sets: Vec<MemoryResultSet>) -> Self {
        Self {
            sets,
            set: 0,
            row: None,
            exhausted: false,
            open: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CursorError> {
        Ok(Self::new(result_sets_from_json(json)?))
    }

    fn current(&self) -> Option<&MemoryResultSet> {
        self.sets.get(self.set)
    }

    fn column(&self, index: usize) -> Result<&Column, CursorError> {
        self.current()
            .and_then(|s| s.columns.get(index))
            .ok_or_else(|| CursorError::protocol(format!("column {index} out of range")))
    }

    /// Past the last result set nothing is left to read.
    fn ensure_open(&self) -> Result<(), CursorError> {
        if self.set < self.sets.len() {
            Ok(())
        } else {
            Err(CursorError::closed("cursor has no more result sets"))
        }
    }

    fn step_row(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        let len = self.current().map_or(0, |s| s.rows.len());
        let next = self.row.map_or(0, |r| r + 1);
        if next < len {
            self.row = Some(next);
            true
        } else {
            self.row = None;
            self.exhausted = true;
            false
        }
    }

    fn step_set(&mut self) -> bool {
        self.row = None;
        self.exhausted = false;
        if self.set + 1 < self.sets.len() {
            self.set += 1;
            true
        } else {
            self.set = self.sets.len();
            false
        }
    }
}

impl Drop for MemoryCursor {
    fn drop(&mut self) {
        if let Some(open) = &self.open {
            open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Cursor for MemoryCursor {
    fn has_rows(&self) -> Result<bool, CursorError> {
        Ok(self.current().is_some_and(|s| !s.rows.is_empty()))
    }

    fn advance_row(&mut self) -> Result<bool, CursorError> {
        self.ensure_open()?;
        Ok(self.step_row())
    }

    fn field_count(&self) -> Result<usize, CursorError> {
        Ok(self.current().map_or(0, |s| s.columns.len()))
    }

    fn column_name(&self, index: usize) -> Result<String, CursorError> {
        Ok(self.column(index)?.name.clone())
    }

    fn column_type(&self, index: usize) -> Result<FieldType, CursorError> {
        Ok(self.column(index)?.field_type)
    }

    fn raw_values(&self) -> Result<ResultRow, CursorError> {
        self.row
            .and_then(|r| self.current().and_then(|s| s.rows.get(r)))
            .cloned()
            .ok_or_else(|| CursorError::protocol("no current row"))
    }

    fn advance_result_set(&mut self) -> Result<bool, CursorError> {
        Ok(self.step_set())
    }
}

impl AsyncCursor for MemoryCursor {
    fn has_rows(&self) -> Result<bool, CursorError> {
        Cursor::has_rows(self)
    }

    fn advance_row(&mut self) -> CursorFuture<'_, bool> {
        Box::pin(async move {
            self.ensure_open()?;
            Ok(self.step_row())
        })
    }

    fn field_count(&self) -> Result<usize, CursorError> {
        Cursor::field_count(self)
    }

    fn column_name(&self, index: usize) -> Result<String, CursorError> {
        Cursor::column_name(self, index)
    }

    fn column_type(&self, index: usize) -> Result<FieldType, CursorError> {
        Cursor::column_type(self, index)
    }

    fn raw_values(&self) -> Result<ResultRow, CursorError> {
        Cursor::raw_values(self)
    }

    fn advance_result_set(&mut self) -> CursorFuture<'_, bool> {
        Box::pin(async move { Ok(self.step_set()) })
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemorySession
// ═══════════════════════════════════════════════════════════════

/// Session answering statements from a script keyed by command text
/// (procedure name for procedures). Records every statement it receives.
#[derive(Debug, Default)]
pub struct MemorySession {
    scripts: HashMap<String, Vec<MemoryResultSet>>,
    executed: Vec<Statement>,
    open: Arc<AtomicUsize>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the output of `command`.
    pub fn on(mut self, command: impl Into<String>, sets: Vec<MemoryResultSet>) -> Self {
        self.scripts.insert(command.into(), sets);
        self
    }

    /// Script outputs from JSON: `{ "<command>": [<result set>, ...], ... }`.
    pub fn from_json(json: &str) -> Result<Self, CursorError> {
        let scripts: HashMap<String, Vec<FixtureSet>> =
            serde_json::from_str(json).map_err(|e| CursorError::protocol(e.to_string()))?;
        let mut session = Self::new();
        for (command, sets) in scripts {
            let sets = sets
                .into_iter()
                .map(fixture_to_set)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.with_context(&command))?;
            session.scripts.insert(command, sets);
        }
        Ok(session)
    }

    /// Every statement executed or opened, in order.
    pub fn executed(&self) -> &[Statement] {
        &self.executed
    }

    /// Cursors opened and not yet dropped.
    pub fn open_cursors(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

impl Session for MemorySession {
    type Cursor<'a>
        = MemoryCursor
    where
        Self: 'a;

    fn execute(&mut self, statement: &Statement) -> Result<u64, CursorError> {
        self.executed.push(statement.clone());
        Ok(0)
    }

    fn open(&mut self, statement: &Statement) -> Result<MemoryCursor, CursorError> {
        self.executed.push(statement.clone());
        let sets = self
            .scripts
            .get(statement.command_text())
            .cloned()
            .ok_or_else(|| CursorError::statement(format!("no script for '{}'", statement.command_text())))?;
        self.open.fetch_add(1, Ordering::SeqCst);
        let mut cursor = MemoryCursor::new(sets);
        cursor.open = Some(Arc::clone(&self.open));
        Ok(cursor)
    }
}
