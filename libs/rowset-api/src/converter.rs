use std::collections::HashMap;

use crate::error::RowError;
use crate::mapping::{AssignFn, Shape};
use crate::row::ResultRow;
use crate::schema::Column;
use crate::value::Value;

/// A type rows can be materialized into.
///
/// Implemented by `#[derive(FromRow)]` for named-field structs, and by hand
/// for positional shapes.
pub trait FromRow: Sized {
    fn shape() -> Shape<Self>;
}

/// The raw row is its own opaque shape.
impl FromRow for ResultRow {
    fn shape() -> Shape<Self> {
        Shape::Opaque(Ok)
    }
}

/// Resolved column → member link.
struct Binding<T> {
    /// Position in the row.
    index: usize,
    /// Column name (for error context).
    column: String,
    assign: AssignFn<T>,
}

enum Plan<T> {
    Opaque(fn(ResultRow) -> Result<T, RowError>),
    Named {
        init: fn() -> T,
        bindings: Vec<Binding<T>>,
    },
}

/// Row → shape converter for one column list.
///
/// Built once per result set: member lookup happens in [`RowConverter::build`],
/// [`RowConverter::convert`] only walks the resolved bindings.
pub struct RowConverter<T> {
    width: usize,
    plan: Plan<T>,
}

impl<T> RowConverter<T> {
    pub fn build(shape: Shape<T>, columns: &[Column]) -> Self {
        let plan = match shape {
            Shape::Opaque(convert) => Plan::Opaque(convert),
            Shape::Named { init, members } => {
                let by_name: HashMap<&str, AssignFn<T>> = members
                    .iter()
                    .map(|m| (m.name.as_str(), m.assign))
                    .collect();
                let mut bindings = Vec::with_capacity(columns.len().min(members.len()));
                for (index, column) in columns.iter().enumerate() {
                    match by_name.get(column.name.as_str()) {
                        Some(assign) => bindings.push(Binding {
                            index,
                            column: column.name.clone(),
                            assign: *assign,
                        }),
                        None => tracing::trace!(column = %column.name, "no matching member, skipping"),
                    }
                }
                Plan::Named { init, bindings }
            }
        };
        Self { width: columns.len(), plan }
    }

    /// Names of the columns bound to a member, in column order.
    /// Empty for opaque shapes.
    pub fn bound_columns(&self) -> Vec<&str> {
        match &self.plan {
            Plan::Opaque(_) => Vec::new(),
            Plan::Named { bindings, .. } => bindings.iter().map(|b| b.column.as_str()).collect(),
        }
    }

    /// Materialize one row. Any failing column fails the whole row.
    pub fn convert(&self, row: ResultRow) -> Result<T, RowError> {
        row.check_len(self.width)?;
        match &self.plan {
            Plan::Opaque(convert) => convert(row),
            Plan::Named { init, bindings } => {
                let mut values = row.into_values();
                let mut target = init();
                // Bindings are in column order, so a later duplicate column wins.
                for binding in bindings {
                    let value = std::mem::replace(&mut values[binding.index], Value::Null);
                    (binding.assign)(&mut target, value)
                        .map_err(|e| e.with_column(&binding.column))?;
                }
                Ok(target)
            }
        }
    }
}

impl<T: FromRow> RowConverter<T> {
    pub fn for_columns(columns: &[Column]) -> Self {
        Self::build(T::shape(), columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Member;
    use crate::schema::FieldType;
    use crate::value::FromValue;

    #[derive(Debug, Default, PartialEq)]
    struct FooBar {
        foo: i32,
        bar: String,
        baz: Option<i64>,
    }

    impl FromRow for FooBar {
        fn shape() -> Shape<Self> {
            Shape::named(vec![
                Member::new("Foo", |t: &mut FooBar, v| {
                    t.foo = FromValue::from_value(v)?;
                    Ok(())
                }),
                Member::new("Bar", |t: &mut FooBar, v| {
                    t.bar = FromValue::from_value(v)?;
                    Ok(())
                }),
                Member::new("Baz", |t: &mut FooBar, v| {
                    t.baz = FromValue::from_value(v)?;
                    Ok(())
                }),
            ])
        }
    }

    fn columns(layout: &[(&str, FieldType)]) -> Vec<Column> {
        layout.iter().map(|(n, t)| Column::new(*n, *t)).collect()
    }

    #[test]
    fn test_named_shape_binds_by_name() {
        let cols = columns(&[("Bar", FieldType::String), ("Foo", FieldType::Int32)]);
        let converter = RowConverter::<FooBar>::for_columns(&cols);
        assert_eq!(converter.bound_columns(), vec!["Bar", "Foo"]);

        let row = ResultRow::new(vec![Value::String("Hello World".into()), Value::Int32(42)]);
        let foo_bar = converter.convert(row).unwrap();
        assert_eq!(foo_bar, FooBar { foo: 42, bar: "Hello World".into(), baz: None });
    }

    #[test]
    fn test_unmatched_column_is_skipped() {
        let cols = columns(&[("Foo", FieldType::Int32), ("Extra", FieldType::Bool)]);
        let converter = RowConverter::<FooBar>::for_columns(&cols);
        let row = ResultRow::new(vec![Value::Int32(1), Value::Bool(true)]);
        assert_eq!(converter.convert(row).unwrap().foo, 1);
    }

    #[test]
    fn test_null_into_non_nullable_member() {
        let cols = columns(&[("Foo", FieldType::Int32)]);
        let converter = RowConverter::<FooBar>::for_columns(&cols);
        let err = converter.convert(ResultRow::new(vec![Value::Null])).unwrap_err();
        assert_eq!(
            err,
            RowError::NullCoercion { column: "Foo".into(), target: "i32" }
        );
    }

    #[test]
    fn test_null_into_nullable_member() {
        let cols = columns(&[("Baz", FieldType::Int64)]);
        let converter = RowConverter::<FooBar>::for_columns(&cols);
        let foo_bar = converter.convert(ResultRow::new(vec![Value::Null])).unwrap();
        assert_eq!(foo_bar.baz, None);
    }

    #[test]
    fn test_wide_integer_narrowed_or_overflow() {
        let cols = columns(&[("Foo", FieldType::Int64)]);
        let converter = RowConverter::<FooBar>::for_columns(&cols);
        assert_eq!(converter.convert(ResultRow::new(vec![Value::Int64(13)])).unwrap().foo, 13);

        let err = converter
            .convert(ResultRow::new(vec![Value::Int64(1 << 40)]))
            .unwrap_err();
        assert!(matches!(err, RowError::CoercionOverflow { ref column, .. } if column == "Foo"));
    }

    #[test]
    fn test_row_width_checked() {
        let cols = columns(&[("Foo", FieldType::Int32)]);
        let converter = RowConverter::<ResultRow>::for_columns(&cols);
        assert!(converter.bound_columns().is_empty());
        assert_eq!(
            converter.convert(ResultRow::new(vec![])).unwrap_err(),
            RowError::ShapeMismatch { expected: 1, actual: 0 }
        );
    }

    #[test]
    fn test_duplicate_column_last_wins() {
        let cols = columns(&[("Foo", FieldType::Int32), ("Foo", FieldType::Int32)]);
        let converter = RowConverter::<FooBar>::for_columns(&cols);
        let row = ResultRow::new(vec![Value::Int32(1), Value::Int32(2)]);
        assert_eq!(converter.convert(row).unwrap().foo, 2);
    }
}
