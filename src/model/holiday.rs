use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Diwali")]
    pub name: String,
    #[schema(example = "2026-11-08", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    #[schema(example = "Public")]
    pub holiday_type: String,
}
