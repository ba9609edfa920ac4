use chrono::NaiveDate;
use serde_json::{Map, Value};
use sqlx::MySqlPool;

use crate::error::AppError;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Date(NaiveDate),
}

/// How a JSON field is validated before it is bound.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Non-blank text, trimmed
    Text,
    /// Text that may be empty
    OptionalText,
    /// Lowercased, must contain '@'
    Email,
    /// `YYYY-MM-DD`
    Date,
    NonNegativeInt,
    NonNegativeNumber,
    /// One of a closed set of stored values
    OneOf(&'static [&'static str]),
}

/// A JSON key a caller may update, and the column it lands in.
#[derive(Debug, Clone, Copy)]
pub struct UpdatableField {
    pub key: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// Only keys listed in `fields` are accepted; anything else is a 400.
pub fn build_update_sql(
    table: &str,
    payload: &Map<String, Value>,
    fields: &[UpdatableField],
    id_column: &str,
    id_value: u64,
) -> Result<SqlUpdate, AppError> {
    if payload.is_empty() {
        return Err(AppError::bad_request("No fields provided for update"));
    }

    let mut set_clause = Vec::with_capacity(payload.len());
    let mut values = Vec::with_capacity(payload.len() + 1);

    for (key, value) in payload {
        let field = fields
            .iter()
            .find(|f| f.key == key.as_str())
            .ok_or_else(|| AppError::bad_request(format!("Field '{key}' cannot be updated")))?;

        set_clause.push(format!("{} = ?", field.column));
        values.push(convert(field, value)?);
    }

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        table,
        set_clause.join(", "),
        id_column
    );

    // WHERE id = ?
    values.push(SqlValue::U64(id_value));

    Ok(SqlUpdate { sql, values })
}

fn convert(field: &UpdatableField, value: &Value) -> Result<SqlValue, AppError> {
    let invalid = || AppError::bad_request(format!("Invalid value for '{}'", field.key));

    match field.kind {
        FieldKind::Text => {
            let s = value.as_str().map(str::trim).filter(|s| !s.is_empty());
            s.map(|s| SqlValue::String(s.to_string())).ok_or_else(invalid)
        }
        FieldKind::OptionalText => value
            .as_str()
            .map(|s| SqlValue::String(s.trim().to_string()))
            .ok_or_else(invalid),
        FieldKind::Email => value
            .as_str()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| s.contains('@'))
            .map(SqlValue::String)
            .ok_or_else(invalid),
        FieldKind::Date => value
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .map(SqlValue::Date)
            .ok_or_else(invalid),
        FieldKind::NonNegativeInt => value
            .as_i64()
            .filter(|n| *n >= 0)
            .map(SqlValue::I64)
            .ok_or_else(invalid),
        FieldKind::NonNegativeNumber => value
            .as_f64()
            .filter(|n| *n >= 0.0)
            .map(SqlValue::F64)
            .ok_or_else(invalid),
        FieldKind::OneOf(allowed) => value
            .as_str()
            .filter(|s| allowed.contains(s))
            .map(|s| SqlValue::String(s.to_string()))
            .ok_or_else(invalid),
    }
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[UpdatableField] = &[
        UpdatableField {
            key: "name",
            column: "name",
            kind: FieldKind::Text,
        },
        UpdatableField {
            key: "joiningDate",
            column: "joining_date",
            kind: FieldKind::Date,
        },
        UpdatableField {
            key: "casualLeaveBalance",
            column: "casual_leave_balance",
            kind: FieldKind::NonNegativeInt,
        },
        UpdatableField {
            key: "status",
            column: "status",
            kind: FieldKind::OneOf(&["ACTIVE", "INACTIVE"]),
        },
    ];

    fn payload(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn maps_keys_to_columns_and_appends_id() {
        let update = build_update_sql(
            "employees",
            &payload(json!({"joiningDate": "2024-05-01", "name": " Asha "})),
            FIELDS,
            "id",
            12,
        )
        .unwrap();

        assert!(update.sql.starts_with("UPDATE employees SET "));
        assert!(update.sql.contains("joining_date = ?"));
        assert!(update.sql.contains("name = ?"));
        assert!(update.sql.ends_with("WHERE id = ?"));
        assert_eq!(update.values.len(), 3);
        assert!(update.values.contains(&SqlValue::String("Asha".into())));
        assert_eq!(update.values.last(), Some(&SqlValue::U64(12)));
    }

    #[test]
    fn rejects_unknown_and_invalid_fields() {
        assert!(build_update_sql("employees", &payload(json!({"id": 3})), FIELDS, "id", 1).is_err());
        assert!(
            build_update_sql(
                "employees",
                &payload(json!({"casualLeaveBalance": -1})),
                FIELDS,
                "id",
                1
            )
            .is_err()
        );
        assert!(
            build_update_sql("employees", &payload(json!({"status": "FIRED"})), FIELDS, "id", 1)
                .is_err()
        );
        assert!(build_update_sql("employees", &payload(json!({"name": ""})), FIELDS, "id", 1).is_err());
        assert!(build_update_sql("employees", &Map::new(), FIELDS, "id", 1).is_err());
    }
}
