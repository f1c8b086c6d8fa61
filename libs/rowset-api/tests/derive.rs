//! `#[derive(FromRow)]` against the row converter.

use rowset_api::{Column, FieldType, FromRow, ResultRow, RowConverter, RowError, Value};

#[derive(Debug, Default, PartialEq, FromRow)]
struct FooBarRow {
    #[row(rename = "Foo")]
    foo: i32,
    #[row(rename = "Bar")]
    bar: String,
    #[row(rename = "Score")]
    score: Option<f64>,
    #[row(skip)]
    note: String,
    // No rename: the field name is the column name.
    flag: bool,
}

fn columns(layout: &[(&str, FieldType)]) -> Vec<Column> {
    layout.iter().map(|(n, t)| Column::new(*n, *t)).collect()
}

#[test]
fn test_typed_query_supports_renamed_fields() {
    let cols = columns(&[("Foo", FieldType::Int32), ("Bar", FieldType::String)]);
    let converter = RowConverter::<FooBarRow>::for_columns(&cols);

    let row = converter
        .convert(ResultRow::new(vec![Value::Int32(42), Value::from("Hello World")]))
        .unwrap();

    assert_eq!(row.foo, 42);
    assert_eq!(row.bar, "Hello World");
    assert_eq!(row.score, None);
}

#[test]
fn test_typed_query_coerces_long_to_int() {
    let cols = columns(&[("Foo", FieldType::Int64)]);
    let converter = RowConverter::<FooBarRow>::for_columns(&cols);

    let row = converter.convert(ResultRow::new(vec![Value::Int64(13)])).unwrap();
    assert_eq!(row.foo, 13);

    let err = converter
        .convert(ResultRow::new(vec![Value::Int64(i64::MAX)]))
        .unwrap_err();
    assert!(matches!(err, RowError::CoercionOverflow { .. }));
}

#[test]
fn test_skipped_field_is_never_bound() {
    let cols = columns(&[("note", FieldType::String), ("flag", FieldType::Bool)]);
    let converter = RowConverter::<FooBarRow>::for_columns(&cols);
    assert_eq!(converter.bound_columns(), vec!["flag"]);

    let row = converter
        .convert(ResultRow::new(vec![Value::from("ignored"), Value::Bool(true)]))
        .unwrap();
    assert_eq!(row.note, "");
    assert!(row.flag);
}

#[test]
fn test_column_names_are_case_sensitive() {
    let cols = columns(&[("foo", FieldType::Int32)]);
    let converter = RowConverter::<FooBarRow>::for_columns(&cols);
    assert!(converter.bound_columns().is_empty());
    assert_eq!(
        converter.convert(ResultRow::new(vec![Value::Int32(1)])).unwrap(),
        FooBarRow::default()
    );
}

#[test]
fn test_shape_lists_registered_members() {
    let shape = FooBarRow::shape();
    assert!(shape.member("Foo").is_some());
    assert!(shape.member("Score").is_some());
    assert!(shape.member("note").is_none());
}
