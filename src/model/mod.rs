pub mod attendance;
pub mod employee;
pub mod holiday;
pub mod leave_request;
pub mod office_settings;
pub mod role;

use std::str::FromStr;

use sqlx::{Row, mysql::MySqlRow};

/// Reads a text column and parses it into one of the closed enums stored as strings.
pub(crate) fn decode_text<T>(row: &MySqlRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
