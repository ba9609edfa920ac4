use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Hr,
    Employee,
}

impl Role {
    /// HR and Admin may act on other employees' records.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_storage_text() {
        assert_eq!(Role::Hr.as_ref(), "HR");
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("MANAGER".parse::<Role>().is_err());
    }

    #[test]
    fn only_hr_and_admin_are_privileged() {
        assert!(Role::Admin.is_privileged());
        assert!(Role::Hr.is_privileged());
        assert!(!Role::Employee.is_privileged());
    }

    #[test]
    fn role_json_matches_client_contract() {
        assert_eq!(serde_json::to_value(Role::Employee).unwrap(), "EMPLOYEE");
        let s: EmployeeStatus = serde_json::from_str("\"INACTIVE\"").unwrap();
        assert_eq!(s, EmployeeStatus::Inactive);
    }
}
