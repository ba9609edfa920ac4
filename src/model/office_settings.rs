use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The stored office-rules singleton, as persisted and as exchanged with the admin UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfficeSettings {
    #[schema(example = "09:30")]
    pub office_start_time: String,
    #[schema(example = "18:30")]
    pub office_close_time: String,
    #[serde(rename = "gracePeriod")]
    #[schema(example = 15)]
    pub grace_period_minutes: i32,
    #[serde(rename = "halfDayThreshold")]
    #[schema(example = 30)]
    pub half_day_threshold_minutes: i32,
}
