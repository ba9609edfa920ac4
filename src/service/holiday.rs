use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::holiday::Holiday;

pub const DEFAULT_HOLIDAY_TYPE: &str = "Public";

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewHoliday {
    #[schema(example = "Diwali")]
    pub name: String,
    #[schema(example = "2026-11-08", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    #[schema(example = "Public")]
    pub holiday_type: Option<String>,
}

pub async fn list(pool: &MySqlPool) -> Result<Vec<Holiday>, AppError> {
    let holidays = sqlx::query_as::<_, Holiday>(
        "SELECT id, name, date, holiday_type FROM holidays ORDER BY date ASC, id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(holidays)
}

pub async fn create(pool: &MySqlPool, new: &NewHoliday) -> Result<Holiday, AppError> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("Holiday name is required"));
    }
    let holiday_type = new
        .holiday_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_HOLIDAY_TYPE)
        .to_string();

    let result = sqlx::query("INSERT INTO holidays (name, date, holiday_type) VALUES (?, ?, ?)")
        .bind(name)
        .bind(new.date)
        .bind(&holiday_type)
        .execute(pool)
        .await?;

    info!(date = %new.date, name, "Holiday added");

    Ok(Holiday {
        id: result.last_insert_id(),
        name: name.to_string(),
        date: new.date,
        holiday_type,
    })
}

/// Removes a holiday. Returns false when no such holiday existed.
pub async fn delete(pool: &MySqlPool, id: u64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM holidays WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    let removed = result.rows_affected() > 0;
    if removed {
        info!(holiday_id = id, "Holiday removed");
    }
    Ok(removed)
}
