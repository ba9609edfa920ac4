use crate::api::attendance::UpdateAttendance;
use crate::api::leave_request::{ApplyLeave, LeaveAction, UpdateBalance};
use crate::auth::handlers::{LoginResponse, LoginUser};
use crate::domain::ledger::AvailableBalances;
use crate::model::attendance::{AttendanceLogEntry, AttendanceRecord, AttendanceStatus};
use crate::model::employee::{Employee, EmployeeRef};
use crate::model::holiday::Holiday;
use crate::model::leave_request::{LeaveRequest, LeaveRequestEntry, LeaveStatus, LeaveType};
use crate::model::office_settings::OfficeSettings;
use crate::model::role::{EmployeeStatus, Role};
use crate::models::LoginReqDto;
use crate::service::dashboard::{AdminStats, EmployeeStats};
use crate::service::employee::{EmployeePage, EmployeeQuery, NewEmployee};
use crate::service::holiday::NewHoliday;
use crate::service::leave::{LeaveHistory, MyLeaves};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Attendance API",
        version = "1.0.0",
        description = r#"
## Attendance and Leave

Back office for daily attendance and leave balances.

### Attendance
- Check-in is classified against the office start time: **Present** within the grace period,
  **Late** up to the half-day threshold, **Half Day** beyond it.
- Leaving before 14:30 downgrades the day to **Half Day**.
- A session left open past midnight is closed as **Absent** the next time its logs are read.
- HR/Admin can correct a record; status `Auto` recomputes it from the corrected check-in.

### Leave
- Casual (CL) and Earned (EL) leave draw on stored balances; Unpaid (UL) has none.
- Pending requests reserve days; balances are debited only on approval.
- Casual leave resets to 1 at the first leave operation of each new year.

### Security
Everything except `/auth/login` needs a **JWT Bearer** token.
HR/Admin-only and Admin-only operations answer `403 Access Denied` to other roles.

Office days and times are taken in the configured office UTC offset.
"#,
    ),
    paths(
        crate::auth::handlers::login,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::my_logs,
        crate::api::attendance::all_logs,
        crate::api::attendance::user_logs,
        crate::api::attendance::update_record,

        crate::api::leave_request::my_leaves,
        crate::api::leave_request::apply_leave,
        crate::api::leave_request::leave_action,
        crate::api::leave_request::all_requests,
        crate::api::leave_request::user_leaves,
        crate::api::leave_request::update_balance,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_me,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,

        crate::api::settings::get_settings,
        crate::api::settings::update_settings,

        crate::api::holiday::list_holidays,
        crate::api::holiday::create_holiday,
        crate::api::holiday::delete_holiday,

        crate::api::dashboard::admin_stats,
        crate::api::dashboard::employee_stats
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            LoginUser,
            Role,
            EmployeeStatus,
            Employee,
            EmployeeRef,
            NewEmployee,
            EmployeeQuery,
            EmployeePage,
            AttendanceStatus,
            AttendanceRecord,
            AttendanceLogEntry,
            UpdateAttendance,
            LeaveType,
            LeaveStatus,
            LeaveRequest,
            LeaveRequestEntry,
            ApplyLeave,
            LeaveAction,
            UpdateBalance,
            AvailableBalances,
            MyLeaves,
            LeaveHistory,
            OfficeSettings,
            Holiday,
            NewHoliday,
            AdminStats,
            EmployeeStats
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login"),
        (name = "Attendance", description = "Check-in, check-out and attendance records"),
        (name = "Leave", description = "Leave applications, decisions and balances"),
        (name = "Employee", description = "Employee directory"),
        (name = "Settings", description = "Office timing rules"),
        (name = "Holiday", description = "Holiday calendar"),
        (name = "Dashboard", description = "Summary counters"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/login",
            "/api/attendance/checkin",
            "/api/attendance/update/{record_id}",
            "/api/leaves/action/{leave_id}",
            "/api/leaves/admin/update-balance",
            "/api/settings",
            "/api/holidays/{holiday_id}",
            "/api/dashboard/employee-stats",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer_auth"));
    }
}
