use sqlx::MySqlPool;
use tracing::{error, info};

use crate::domain::office_config::{OfficeConfig, format_hhmm};
use crate::error::AppError;
use crate::model::office_settings::OfficeSettings;

const SELECT_SETTINGS: &str = r#"
    SELECT office_start_time, office_close_time, grace_period_minutes, half_day_threshold_minutes
    FROM office_settings
    WHERE id = 1
"#;

async fn fetch(pool: &MySqlPool) -> Result<Option<OfficeSettings>, sqlx::Error> {
    sqlx::query_as::<_, OfficeSettings>(SELECT_SETTINGS)
        .fetch_optional(pool)
        .await
}

/// Effective office rules for this request. Falls back to the defaults when no
/// settings row exists, without writing one.
pub async fn resolve(pool: &MySqlPool) -> Result<OfficeConfig, AppError> {
    let stored = fetch(pool).await?;
    OfficeConfig::resolve(stored.as_ref()).map_err(|e| {
        error!(error = %e, "Stored office settings are unusable");
        AppError::Internal(format!("stored office settings are invalid: {e}"))
    })
}

/// Returns the settings singleton, creating it with the defaults on first read.
pub async fn get_or_create(pool: &MySqlPool) -> Result<OfficeSettings, AppError> {
    if let Some(settings) = fetch(pool).await? {
        return Ok(settings);
    }

    let defaults = OfficeSettings::defaults();
    // INSERT IGNORE: two first reads racing both end up with the same row.
    sqlx::query(
        r#"
        INSERT IGNORE INTO office_settings
            (id, office_start_time, office_close_time, grace_period_minutes, half_day_threshold_minutes)
        VALUES (1, ?, ?, ?, ?)
        "#,
    )
    .bind(&defaults.office_start_time)
    .bind(&defaults.office_close_time)
    .bind(defaults.grace_period_minutes)
    .bind(defaults.half_day_threshold_minutes)
    .execute(pool)
    .await?;
    info!("Created default office settings");

    Ok(fetch(pool).await?.unwrap_or(defaults))
}

/// Validates and stores new office rules (Admin only; checked by the handler).
pub async fn update(pool: &MySqlPool, requested: &OfficeSettings) -> Result<OfficeSettings, AppError> {
    let config = OfficeConfig::validate(requested)?;
    let normalized = OfficeSettings {
        office_start_time: format_hhmm(config.start_time),
        office_close_time: format_hhmm(config.close_time),
        grace_period_minutes: requested.grace_period_minutes,
        half_day_threshold_minutes: requested.half_day_threshold_minutes,
    };

    sqlx::query(
        r#"
        INSERT INTO office_settings
            (id, office_start_time, office_close_time, grace_period_minutes, half_day_threshold_minutes)
        VALUES (1, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            office_start_time = VALUES(office_start_time),
            office_close_time = VALUES(office_close_time),
            grace_period_minutes = VALUES(grace_period_minutes),
            half_day_threshold_minutes = VALUES(half_day_threshold_minutes)
        "#,
    )
    .bind(&normalized.office_start_time)
    .bind(&normalized.office_close_time)
    .bind(normalized.grace_period_minutes)
    .bind(normalized.half_day_threshold_minutes)
    .execute(pool)
    .await?;

    info!(
        start = %normalized.office_start_time,
        close = %normalized.office_close_time,
        grace = normalized.grace_period_minutes,
        half_day = normalized.half_day_threshold_minutes,
        "Office settings updated"
    );
    Ok(normalized)
}
