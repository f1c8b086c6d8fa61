use rowset_api::converter::FromRow;
use rowset_api::error::RowError;
use rowset_api::mapping::Shape;
use rowset_api::row::ResultRow;
use rowset_api::schema::{Column, FieldType};
use rowset_api::value::{FromValue, Value};

/// Column layout of a plan statistics block, in wire order.
///
/// Order matters twice: for recognizing a block and for reading its rows
/// positionally into [`StatisticsRow`].
pub const STATISTICS_SCHEMA: [(&str, FieldType); 20] = [
    ("Rows", FieldType::Int64),
    ("Executes", FieldType::Int64),
    ("StmtText", FieldType::String),
    ("StmtId", FieldType::Int32),
    ("NodeId", FieldType::Int32),
    ("Parent", FieldType::Int32),
    ("PhysicalOp", FieldType::String),
    ("LogicalOp", FieldType::String),
    ("Argument", FieldType::String),
    ("DefinedValues", FieldType::String),
    ("EstimateRows", FieldType::Float32),
    ("EstimateIO", FieldType::Float32),
    ("EstimateCPU", FieldType::Float32),
    ("AvgRowSize", FieldType::Int32),
    ("TotalSubtreeCost", FieldType::Float32),
    ("OutputList", FieldType::String),
    ("Warnings", FieldType::String),
    ("Type", FieldType::String),
    ("Parallel", FieldType::Bool),
    ("EstimateExecutions", FieldType::Float32),
];

/// Whether `columns` is exactly the statistics layout (names and types).
pub fn is_statistics_schema(columns: &[Column]) -> bool {
    columns.len() == STATISTICS_SCHEMA.len()
        && columns
            .iter()
            .zip(STATISTICS_SCHEMA.iter())
            .all(|(column, (name, field_type))| column.matches(name, *field_type))
}

/// The statistics columns as descriptors.
pub fn statistics_columns() -> Vec<Column> {
    STATISTICS_SCHEMA
        .iter()
        .map(|(name, field_type)| Column::new(*name, *field_type))
        .collect()
}

/// One plan operator of a profiled statement.
///
/// Text columns read as empty when NULL.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct StatisticsRow {
    pub rows: i64,
    pub executes: i64,
    pub stmt_text: String,
    pub stmt_id: i32,
    pub node_id: i32,
    pub parent: i32,
    pub physical_op: String,
    pub logical_op: String,
    pub argument: String,
    pub defined_values: String,
    pub estimate_rows: Option<f32>,
    pub estimate_io: Option<f32>,
    pub estimate_cpu: Option<f32>,
    pub avg_row_size: Option<i32>,
    pub total_subtree_cost: f32,
    pub output_list: String,
    pub warnings: String,
    pub type_text: String,
    pub parallel: bool,
    pub estimate_executions: Option<f32>,
}

impl StatisticsRow {
    /// Read a raw statistics row positionally.
    pub fn from_row(row: ResultRow) -> Result<Self, RowError> {
        row.check_len(STATISTICS_SCHEMA.len())?;
        let mut values = row.into_values();
        let v = values.as_mut_slice();
        Ok(Self {
            rows: field(v, 0)?,
            executes: field(v, 1)?,
            stmt_text: text(v, 2)?,
            stmt_id: field(v, 3)?,
            node_id: field(v, 4)?,
            parent: field(v, 5)?,
            physical_op: text(v, 6)?,
            logical_op: text(v, 7)?,
            argument: text(v, 8)?,
            defined_values: text(v, 9)?,
            estimate_rows: field(v, 10)?,
            estimate_io: field(v, 11)?,
            estimate_cpu: field(v, 12)?,
            avg_row_size: field(v, 13)?,
            total_subtree_cost: field(v, 14)?,
            output_list: text(v, 15)?,
            warnings: text(v, 16)?,
            type_text: text(v, 17)?,
            parallel: field(v, 18)?,
            estimate_executions: field(v, 19)?,
        })
    }
}

impl FromRow for StatisticsRow {
    fn shape() -> Shape<Self> {
        Shape::opaque(StatisticsRow::from_row)
    }
}

fn field<T: FromValue>(values: &mut [Value], index: usize) -> Result<T, RowError> {
    let value = std::mem::replace(&mut values[index], Value::Null);
    T::from_value(value).map_err(|e| e.with_column(STATISTICS_SCHEMA[index].0))
}

fn text(values: &mut [Value], index: usize) -> Result<String, RowError> {
    field::<Option<String>>(values, index).map(Option::unwrap_or_default)
}
