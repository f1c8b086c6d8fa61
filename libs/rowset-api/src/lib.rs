pub mod converter;
pub mod cursor;
pub mod error;
pub mod mapping;
pub mod result;
pub mod row;
pub mod schema;
pub mod value;

pub use converter::{FromRow, RowConverter};
pub use cursor::{AsyncCursor, Cursor};
pub use error::{CursorError, ErrorKind, RowError};
pub use mapping::{Member, Shape};
pub use result::ResultSet;
pub use row::{ResultRow, RowBuilder, compare_rows};
pub use rowset_api_derive::FromRow;
pub use schema::{Column, FieldType};
pub use value::{FromValue, Value};
