pub mod compare;
pub mod config;
pub mod connection;
pub mod error;
pub mod profile;
pub mod reader;
pub mod statistics;

pub use compare::{ResultSetComparer, RowMismatch};
pub use config::{EngineConfig, UnprofiledPolicy};
pub use connection::{DataConnection, Parameter, Session, Statement};
pub use error::EngineError;
pub use profile::{ProfiledReader, ProfiledResult, read_profiled, read_profiled_async};
pub use reader::{ResultSetReader, read_result_sets, read_result_sets_async};
pub use statistics::{STATISTICS_SCHEMA, StatisticsRow, is_statistics_schema};
