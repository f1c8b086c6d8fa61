use rowset_api::converter::FromRow;
use rowset_api::cursor::Cursor;
use rowset_api::error::CursorError;
use rowset_api::result::ResultSet;
use rowset_api::value::Value;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::profile::{ProfiledResult, read_profiled};
use crate::reader::read_result_sets;

/// Named, typed stored-procedure argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: Value,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// How long the driver may let a statement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTimeout {
    /// Whatever the driver/session uses by default.
    Default,
    /// No limit.
    Unlimited,
}

/// A command for the session to run.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Raw command text.
    Text(String),
    /// Stored procedure invocation.
    Procedure { name: String, params: Vec<Parameter> },
}

impl Statement {
    pub fn text(text: impl Into<String>) -> Self {
        Statement::Text(text.into())
    }

    pub fn procedure(name: impl Into<String>, params: Vec<Parameter>) -> Self {
        Statement::Procedure {
            name: name.into(),
            params,
        }
    }

    /// Command text, or procedure name.
    pub fn command_text(&self) -> &str {
        match self {
            Statement::Text(text) => text,
            Statement::Procedure { name, .. } => name,
        }
    }

    /// Procedures run without a timeout; plain text uses the driver default.
    pub fn timeout(&self) -> CommandTimeout {
        match self {
            Statement::Text(_) => CommandTimeout::Default,
            Statement::Procedure { .. } => CommandTimeout::Unlimited,
        }
    }
}

/// Statement execution against a driver. Implemented outside the engine.
///
/// A cursor borrows its session: only one is open at a time, and it is
/// released when dropped.
pub trait Session {
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    /// Run a statement that returns no rows. Returns the affected row count.
    fn execute(&mut self, statement: &Statement) -> Result<u64, CursorError>;

    /// Run a statement and open a cursor over its output.
    fn open(&mut self, statement: &Statement) -> Result<Self::Cursor<'_>, CursorError>;
}

/// Query entry points over a session.
///
/// Every call materializes its output eagerly; the cursor is dropped before
/// the call returns, on success and on error alike.
pub struct DataConnection<S> {
    session: S,
    config: EngineConfig,
}

impl<S: Session> DataConnection<S> {
    pub fn new(session: S) -> Self {
        Self::with_config(session, EngineConfig::default())
    }

    pub fn with_config(session: S, config: EngineConfig) -> Self {
        Self { session, config }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn execute_command(&mut self, command: &str) -> Result<u64, EngineError> {
        self.execute(&Statement::text(command))
    }

    pub fn query<T: FromRow>(&mut self, query: &str) -> Result<Vec<ResultSet<T>>, EngineError> {
        self.read(&Statement::text(query))
    }

    pub fn exec<T: FromRow>(
        &mut self,
        procedure: &str,
        params: Vec<Parameter>,
    ) -> Result<Vec<ResultSet<T>>, EngineError> {
        self.read(&Statement::procedure(procedure, params))
    }

    pub fn profile_query(&mut self, query: &str) -> Result<Vec<ProfiledResult>, EngineError> {
        self.profile(&Statement::text(query))
    }

    pub fn profile_exec(
        &mut self,
        procedure: &str,
        params: Vec<Parameter>,
    ) -> Result<Vec<ProfiledResult>, EngineError> {
        self.profile(&Statement::procedure(procedure, params))
    }

    fn execute(&mut self, statement: &Statement) -> Result<u64, EngineError> {
        tracing::debug!(command = %statement.command_text(), "executing statement");
        self.session
            .execute(statement)
            .map_err(|e| EngineError::from(e).with_context(statement.command_text()))
    }

    fn read<T: FromRow>(&mut self, statement: &Statement) -> Result<Vec<ResultSet<T>>, EngineError> {
        tracing::debug!(command = %statement.command_text(), "opening cursor");
        let cursor = self
            .session
            .open(statement)
            .map_err(|e| e.with_context(statement.command_text()))?;
        read_result_sets(cursor)
    }

    fn profile(&mut self, statement: &Statement) -> Result<Vec<ProfiledResult>, EngineError> {
        let prepare = Statement::text(self.config.profile_statement.as_str());
        self.execute(&prepare)?;

        tracing::debug!(command = %statement.command_text(), "opening profiled cursor");
        let cursor = self
            .session
            .open(statement)
            .map_err(|e| e.with_context(statement.command_text()))?;
        read_profiled(cursor, self.config.unprofiled_results)
    }
}
