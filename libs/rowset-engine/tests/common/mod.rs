#![allow(dead_code)]

use rowset_api::{FieldType, FromRow, ResultRow, Value};
use rowset_cursor_memory::MemoryResultSet;
use rowset_engine::statistics::{STATISTICS_SCHEMA, statistics_columns};

#[derive(Debug, Default, PartialEq, FromRow)]
pub struct FooBar {
    #[row(rename = "Foo")]
    pub foo: i32,
    #[row(rename = "Bar")]
    pub bar: Option<String>,
}

/// Statistics block with `operators` identical plan rows.
pub fn statistics_set(operators: usize) -> MemoryResultSet {
    let row: ResultRow = STATISTICS_SCHEMA
        .iter()
        .map(|(_, field_type)| match field_type {
            FieldType::Int64 => Value::Int64(1),
            FieldType::Int32 => Value::Int32(0),
            FieldType::Float32 => Value::Float32(1.0),
            FieldType::Bool => Value::Bool(false),
            _ => Value::Null,
        })
        .collect();
    MemoryResultSet::new(statistics_columns(), vec![row; operators])
}

pub fn ints(name: &str, values: &[i32]) -> MemoryResultSet {
    MemoryResultSet::of(
        &[(name, FieldType::Int32)],
        values.iter().map(|v| vec![Value::Int32(*v)]).collect(),
    )
}
