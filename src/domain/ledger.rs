//! Casual/earned leave accounting.
//!
//! Stored balances are only debited when a request is approved. Until then a
//! pending request reserves its days: what an employee can still apply for is
//! the stored balance minus the days of their own pending requests.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::clock::OfficeClock;
use crate::model::leave_request::{LeaveStatus, LeaveType};

/// Casual leave granted at the start of every year.
pub const ANNUAL_CASUAL_LEAVE: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeaveError {
    #[error("Insufficient {leave_type} balance. You have {available} days available.")]
    InsufficientAvailable { leave_type: LeaveType, available: i32 },
    #[error("Insufficient {} Balance", .leave_type.long_name())]
    InsufficientStored { leave_type: LeaveType },
    #[error("Request already processed")]
    AlreadyProcessed,
    #[error("Leave not found")]
    NotFound,
    #[error("From date cannot be after to date")]
    InvertedRange,
    #[error("Reason is required")]
    MissingReason,
    #[error("Leave balance cannot be negative")]
    NegativeBalance,
}

/// Stored balances of the two balanced pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Balances {
    pub casual: i32,
    pub earned: i32,
}

impl Balances {
    /// `None` for unpaid leave, which has no pool.
    pub fn get(&self, leave_type: LeaveType) -> Option<i32> {
        match leave_type {
            LeaveType::CL => Some(self.casual),
            LeaveType::EL => Some(self.earned),
            LeaveType::UL => None,
        }
    }

    fn get_mut(&mut self, leave_type: LeaveType) -> Option<&mut i32> {
        match leave_type {
            LeaveType::CL => Some(&mut self.casual),
            LeaveType::EL => Some(&mut self.earned),
            LeaveType::UL => None,
        }
    }
}

/// Balances as shown to the employee: `{"CL": n, "EL": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct AvailableBalances {
    #[serde(rename = "CL")]
    pub casual: i32,
    #[serde(rename = "EL")]
    pub earned: i32,
}

/// An employee's leave position: stored balances, last reset, and pending reservations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveAccount {
    pub stored: Balances,
    pub pending: Balances,
    pub last_reset: DateTime<Utc>,
}

impl LeaveAccount {
    /// Stored minus pending; may be negative. `None` for unpaid leave.
    pub fn available_raw(&self, leave_type: LeaveType) -> Option<i32> {
        Some(self.stored.get(leave_type)? - self.pending.get(leave_type)?)
    }

    pub fn available_for_display(&self) -> AvailableBalances {
        AvailableBalances {
            casual: (self.stored.casual - self.pending.casual).max(0),
            earned: (self.stored.earned - self.pending.earned).max(0),
        }
    }

    /// Resets casual leave when `now` is in a later office year than the last reset.
    /// Returns whether a reset happened. Earned leave is never touched.
    pub fn apply_annual_reset(&mut self, now: DateTime<Utc>, clock: &OfficeClock) -> bool {
        if !needs_annual_reset(self.last_reset, now, clock) {
            return false;
        }
        self.stored.casual = ANNUAL_CASUAL_LEAVE;
        self.last_reset = now;
        true
    }

    /// Checks a new application against balance minus the other pending requests.
    pub fn check_application(&self, leave_type: LeaveType, days: i32) -> Result<(), LeaveError> {
        match self.available_raw(leave_type) {
            Some(available) if days > available => Err(LeaveError::InsufficientAvailable {
                leave_type,
                available,
            }),
            _ => Ok(()),
        }
    }
}

pub fn needs_annual_reset(last_reset: DateTime<Utc>, now: DateTime<Utc>, clock: &OfficeClock) -> bool {
    clock.year_of(now) > clock.year_of(last_reset)
}

/// Inclusive length of a leave span in days.
pub fn leave_days(from: NaiveDate, to: NaiveDate) -> Result<i32, LeaveError> {
    if from > to {
        return Err(LeaveError::InvertedRange);
    }
    let days = (to - from).num_days() + 1;
    i32::try_from(days).map_err(|_| LeaveError::InvertedRange)
}

/// Validates the free-form part of an application.
pub fn check_reason(reason: &str) -> Result<&str, LeaveError> {
    let reason = reason.trim();
    if reason.is_empty() {
        Err(LeaveError::MissingReason)
    } else {
        Ok(reason)
    }
}

/// What an HR/Admin decision does to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn resulting_status(&self) -> LeaveStatus {
        match self {
            Decision::Approve => LeaveStatus::Approved,
            Decision::Reject => LeaveStatus::Rejected,
        }
    }
}

/// Result of deciding a request: the balances to persist (if any changed) and the new status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub status: LeaveStatus,
    pub balances: Option<Balances>,
}

/// Decides a request against the current stored balances.
///
/// Only a pending request can be decided. Approval debits the stored balance
/// exactly once, and is refused without any change if the stored balance no
/// longer covers the days. Rejection and unpaid leave never touch balances.
pub fn settle(
    current_status: LeaveStatus,
    leave_type: LeaveType,
    days: i32,
    stored: Balances,
    decision: Decision,
) -> Result<Settlement, LeaveError> {
    if current_status != LeaveStatus::Pending {
        return Err(LeaveError::AlreadyProcessed);
    }

    let status = decision.resulting_status();
    if decision == Decision::Reject || !leave_type.is_balanced() {
        return Ok(Settlement {
            status,
            balances: None,
        });
    }

    let mut next = stored;
    let Some(pool) = next.get_mut(leave_type) else {
        return Ok(Settlement {
            status,
            balances: None,
        });
    };
    if *pool < days {
        return Err(LeaveError::InsufficientStored { leave_type });
    }
    *pool -= days;

    Ok(Settlement {
        status,
        balances: Some(next),
    })
}

/// Absolute overwrite of stored balances by HR/Admin. Unset fields keep their value.
pub fn grant(
    stored: Balances,
    casual: Option<i32>,
    earned: Option<i32>,
) -> Result<Balances, LeaveError> {
    let next = Balances {
        casual: casual.unwrap_or(stored.casual),
        earned: earned.unwrap_or(stored.earned),
    };
    if next.casual < 0 || next.earned < 0 {
        return Err(LeaveError::NegativeBalance);
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> DateTime<Utc> {
        raw.parse().unwrap()
    }

    fn account(casual: i32, earned: i32, pending_casual: i32) -> LeaveAccount {
        LeaveAccount {
            stored: Balances { casual, earned },
            pending: Balances {
                casual: pending_casual,
                earned: 0,
            },
            last_reset: at("2026-01-01T00:00:00Z"),
        }
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[test]
    fn day_count_is_inclusive() {
        assert_eq!(leave_days(date(3, 2), date(3, 2)), Ok(1));
        assert_eq!(leave_days(date(3, 2), date(3, 4)), Ok(3));
        assert_eq!(leave_days(date(2, 27), date(3, 2)), Ok(4));
        assert_eq!(leave_days(date(3, 4), date(3, 2)), Err(LeaveError::InvertedRange));
    }

    #[test]
    fn scenario_c_pending_requests_reserve_balance() {
        let acct = account(2, 0, 1);
        assert_eq!(acct.available_raw(LeaveType::CL), Some(1));

        let err = acct.check_application(LeaveType::CL, 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Insufficient CL balance. You have 1 days available."
        );
        assert!(acct.check_application(LeaveType::CL, 1).is_ok());
    }

    #[test]
    fn unpaid_leave_skips_balance_checks() {
        let acct = account(0, 0, 0);
        assert_eq!(acct.available_raw(LeaveType::UL), None);
        assert!(acct.check_application(LeaveType::UL, 30).is_ok());
    }

    #[test]
    fn display_balance_floors_at_zero_but_validation_sees_negative() {
        let acct = account(1, 0, 3);
        assert_eq!(acct.available_for_display().casual, 0);
        assert_eq!(acct.available_raw(LeaveType::CL), Some(-2));
        assert_eq!(
            acct.check_application(LeaveType::CL, 1),
            Err(LeaveError::InsufficientAvailable {
                leave_type: LeaveType::CL,
                available: -2
            })
        );
    }

    #[test]
    fn scenario_d_second_approval_is_refused() {
        let stored = Balances {
            casual: 1,
            earned: 0,
        };
        let first = settle(LeaveStatus::Pending, LeaveType::CL, 1, stored, Decision::Approve).unwrap();
        assert_eq!(first.status, LeaveStatus::Approved);
        let after = first.balances.unwrap();
        assert_eq!(after.casual, 0);

        let second = settle(LeaveStatus::Pending, LeaveType::CL, 1, after, Decision::Approve);
        assert_eq!(
            second,
            Err(LeaveError::InsufficientStored {
                leave_type: LeaveType::CL
            })
        );
        assert_eq!(
            second.unwrap_err().to_string(),
            "Insufficient Casual Leave Balance"
        );
    }

    #[test]
    fn decided_requests_cannot_be_decided_again() {
        let stored = Balances {
            casual: 5,
            earned: 5,
        };
        for status in [LeaveStatus::Approved, LeaveStatus::Rejected] {
            for decision in [Decision::Approve, Decision::Reject] {
                assert_eq!(
                    settle(status, LeaveType::EL, 1, stored, decision),
                    Err(LeaveError::AlreadyProcessed)
                );
            }
        }
    }

    #[test]
    fn rejection_and_unpaid_approval_never_debit() {
        let stored = Balances {
            casual: 1,
            earned: 2,
        };
        let rejected = settle(LeaveStatus::Pending, LeaveType::EL, 2, stored, Decision::Reject).unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);
        assert_eq!(rejected.balances, None);

        let unpaid = settle(LeaveStatus::Pending, LeaveType::UL, 10, stored, Decision::Approve).unwrap();
        assert_eq!(unpaid.status, LeaveStatus::Approved);
        assert_eq!(unpaid.balances, None);
    }

    #[test]
    fn earned_debit_leaves_casual_alone() {
        let stored = Balances {
            casual: 1,
            earned: 4,
        };
        let s = settle(LeaveStatus::Pending, LeaveType::EL, 3, stored, Decision::Approve).unwrap();
        assert_eq!(
            s.balances,
            Some(Balances {
                casual: 1,
                earned: 1
            })
        );
    }

    #[test]
    fn balances_never_go_negative_over_a_sequence() {
        // Apply/approve one at a time; every approval that would overdraw is refused.
        let mut stored = Balances {
            casual: 3,
            earned: 2,
        };
        let requests = [
            (LeaveType::CL, 2, Decision::Approve),
            (LeaveType::CL, 2, Decision::Approve),
            (LeaveType::EL, 1, Decision::Reject),
            (LeaveType::EL, 2, Decision::Approve),
            (LeaveType::EL, 1, Decision::Approve),
            (LeaveType::CL, 1, Decision::Approve),
        ];
        for (leave_type, days, decision) in requests {
            if let Ok(Settlement {
                balances: Some(next),
                ..
            }) = settle(LeaveStatus::Pending, leave_type, days, stored, decision)
            {
                stored = next;
            }
            assert!(stored.casual >= 0 && stored.earned >= 0);
        }
        assert_eq!(
            stored,
            Balances {
                casual: 0,
                earned: 0
            }
        );
    }

    #[test]
    fn scenario_e_new_year_resets_casual_leave() {
        let clock = OfficeClock::utc();
        let mut acct = LeaveAccount {
            stored: Balances {
                casual: 0,
                earned: 6,
            },
            pending: Balances::default(),
            last_reset: at("2025-01-15T10:00:00Z"),
        };
        let now = at("2026-10-17T09:00:00Z");

        assert!(acct.apply_annual_reset(now, &clock));
        assert_eq!(acct.stored.casual, ANNUAL_CASUAL_LEAVE);
        assert_eq!(acct.stored.earned, 6);
        assert_eq!(acct.last_reset, now);

        // Same year again: nothing to do.
        acct.stored.casual = 0;
        assert!(!acct.apply_annual_reset(at("2026-12-31T09:00:00Z"), &clock));
        assert_eq!(acct.stored.casual, 0);
    }

    #[test]
    fn reset_stands_even_when_the_application_is_refused() {
        let clock = OfficeClock::new(chrono::FixedOffset::east_opt(19_800).unwrap());
        let now = at("2027-01-05T05:00:00Z");
        let mut acct = account(0, 0, 0);
        acct.last_reset = at("2026-03-01T00:00:00Z");

        assert!(acct.apply_annual_reset(now, &clock));
        let err = acct.check_application(LeaveType::CL, 3).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient CL balance. You have 1 days available.");

        // The reset is independent of the refusal: the position it leaves
        // behind is final and does not reset again within the year.
        assert_eq!(acct.stored.casual, ANNUAL_CASUAL_LEAVE);
        assert!(!needs_annual_reset(acct.last_reset, at("2027-12-31T12:00:00Z"), &clock));
    }

    #[test]
    fn grant_overwrites_and_guards_negative() {
        let stored = Balances {
            casual: 1,
            earned: 0,
        };
        assert_eq!(
            grant(stored, None, Some(5)),
            Ok(Balances {
                casual: 1,
                earned: 5
            })
        );
        assert_eq!(grant(stored, Some(-1), None), Err(LeaveError::NegativeBalance));
    }

    #[test]
    fn reason_must_not_be_blank() {
        assert_eq!(check_reason("  "), Err(LeaveError::MissingReason));
        assert_eq!(check_reason(" fever "), Ok("fever"));
    }
}
