//! Query entry points against the in-memory session.

mod common;

use common::{FooBar, ints, statistics_set};
use rowset_api::{ErrorKind, FieldType, ResultRow, RowError, Value};
use rowset_cursor_memory::{MemoryResultSet, MemorySession};
use rowset_engine::connection::CommandTimeout;
use rowset_engine::{DataConnection, EngineConfig, EngineError, Parameter, Statement, UnprofiledPolicy};

const PROFILE_ON: &str = "set statistics profile on";

#[test]
fn test_typed_query() {
    let session = MemorySession::new().on(
        "select Foo = 42, Bar = 'Hello World'",
        vec![MemoryResultSet::of(
            &[("Foo", FieldType::Int32), ("Bar", FieldType::String)],
            vec![vec![Value::Int32(42), Value::from("Hello World")]],
        )],
    );
    let mut conn = DataConnection::new(session);

    let sets = conn
        .query::<FooBar>("select Foo = 42, Bar = 'Hello World'")
        .unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(
        sets[0].rows,
        vec![FooBar { foo: 42, bar: Some("Hello World".into()) }]
    );
    assert_eq!(conn.session().open_cursors(), 0);
}

#[test]
fn test_typed_query_coerces_long_to_int() {
    let session = MemorySession::new().on(
        "select Foo = cast(13 as bigint)",
        vec![MemoryResultSet::of(&[("Foo", FieldType::Int64)], vec![vec![Value::Int64(13)]])],
    );
    let mut conn = DataConnection::new(session);

    let sets = conn.query::<FooBar>("select Foo = cast(13 as bigint)").unwrap();
    assert_eq!(sets[0].rows[0], FooBar { foo: 13, bar: None });
}

#[test]
fn test_query_returns_every_result_set() {
    let session = MemorySession::new().on(
        "select 1; select 2, 3",
        vec![
            ints("a", &[1]),
            MemoryResultSet::of(
                &[("b", FieldType::Int32), ("c", FieldType::Int32)],
                vec![vec![Value::Int32(2), Value::Int32(3)]],
            ),
        ],
    );
    let mut conn = DataConnection::new(session);

    let sets = conn.query::<ResultRow>("select 1; select 2, 3").unwrap();
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0].columns[0].name, "a");
    assert_eq!(sets[1].columns.len(), 2);
    assert_eq!(sets[1].rows[0].values(), &[Value::Int32(2), Value::Int32(3)]);
}

#[test]
fn test_exec_runs_procedure_with_parameters() {
    let session = MemorySession::new().on("usp_GetFoo", vec![ints("Foo", &[7])]);
    let mut conn = DataConnection::new(session);

    let sets = conn
        .exec::<FooBar>("usp_GetFoo", vec![Parameter::new("id", 7)])
        .unwrap();
    assert_eq!(sets[0].rows[0].foo, 7);

    let executed = conn.session().executed();
    assert_eq!(
        executed,
        &[Statement::procedure("usp_GetFoo", vec![Parameter::new("id", Value::Int32(7))])]
    );
    assert_eq!(executed[0].timeout(), CommandTimeout::Unlimited);
}

#[test]
fn test_execute_command() {
    let mut conn = DataConnection::new(MemorySession::new());
    conn.execute_command("set nocount on").unwrap();
    assert_eq!(conn.session().executed(), &[Statement::text("set nocount on")]);
    assert_eq!(conn.session().executed()[0].timeout(), CommandTimeout::Default);
}

#[test]
fn test_unknown_statement_carries_command_text() {
    let mut conn = DataConnection::new(MemorySession::new());
    let err = conn.query::<ResultRow>("select nothing").unwrap_err();
    match err {
        EngineError::Cursor(e) => {
            assert_eq!(e.kind, ErrorKind::Statement);
            assert!(e.message.starts_with("select nothing: "));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_cursor_released_when_read_fails() {
    let mut ragged = ints("n", &[1, 2]);
    ragged.rows[1] = ResultRow::new(vec![Value::Int32(2), Value::Int32(3)]);
    let session = MemorySession::new().on("select n", vec![ints("n", &[0]), ragged]);
    let mut conn = DataConnection::new(session);

    let err = conn.query::<ResultRow>("select n").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Row(RowError::ShapeMismatch { expected: 1, actual: 2 })
    ));
    assert_eq!(conn.session().open_cursors(), 0);
}

#[test]
fn test_conversion_error_names_column() {
    let session = MemorySession::new().on(
        "select Foo",
        vec![MemoryResultSet::of(&[("Foo", FieldType::Int32)], vec![vec![Value::Null]])],
    );
    let mut conn = DataConnection::new(session);

    let err = conn.query::<FooBar>("select Foo").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Row(RowError::NullCoercion { ref column, target: "i32" }) if column == "Foo"
    ));
}

#[test]
fn test_profile_query_pairs_each_statement() {
    let session = MemorySession::new().on(
        "select 1; select 2",
        vec![ints("a", &[1]), statistics_set(1), ints("b", &[2, 2]), statistics_set(2)],
    );
    let mut conn = DataConnection::new(session);

    let profiled = conn.profile_query("select 1; select 2").unwrap();
    assert_eq!(profiled.len(), 2);
    assert_eq!(profiled[0].result.as_ref().unwrap().rows.len(), 1);
    assert_eq!(profiled[0].statistics.as_ref().unwrap().rows.len(), 1);
    assert_eq!(profiled[1].result.as_ref().unwrap().columns[0].name, "b");
    assert_eq!(profiled[1].statistics.as_ref().unwrap().rows.len(), 2);

    let executed = conn.session().executed();
    assert_eq!(executed[0], Statement::text(PROFILE_ON));
    assert_eq!(executed[1], Statement::text("select 1; select 2"));
}

#[test]
fn test_profile_statement_without_rows() {
    let session = MemorySession::new().on("insert into t values (1)", vec![statistics_set(1)]);
    let mut conn = DataConnection::new(session);

    let profiled = conn.profile_query("insert into t values (1)").unwrap();
    assert_eq!(profiled.len(), 1);
    assert!(profiled[0].result.is_none());
    assert_eq!(profiled[0].statistics.as_ref().unwrap().rows[0].rows, 1);
}

#[test]
fn test_profile_drops_trailing_unprofiled_set() {
    let session = MemorySession::new().on("q", vec![ints("a", &[1]), statistics_set(1), ints("b", &[2])]);
    let mut conn = DataConnection::new(session);

    let profiled = conn.profile_query("q").unwrap();
    assert_eq!(profiled.len(), 1);
    assert_eq!(profiled[0].result.as_ref().unwrap().columns[0].name, "a");
}

#[test]
fn test_profile_emits_unprofiled_set_when_configured() {
    let config = EngineConfig::parse(
        r#"
        profile_statement = "SET STATISTICS PROFILE ON"
        unprofiled_results = "emit"
        "#,
    )
    .unwrap();
    assert_eq!(config.unprofiled_results, UnprofiledPolicy::Emit);

    let session = MemorySession::new().on("q", vec![ints("a", &[1]), statistics_set(1), ints("b", &[2])]);
    let mut conn = DataConnection::with_config(session, config);

    let profiled = conn.profile_exec("q", vec![]).unwrap();
    assert_eq!(profiled.len(), 2);
    assert!(profiled[1].statistics.is_none());
    assert_eq!(profiled[1].result.as_ref().unwrap().columns[0].name, "b");
    assert_eq!(
        conn.session().executed()[0],
        Statement::text("SET STATISTICS PROFILE ON")
    );
}
