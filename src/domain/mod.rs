//! Attendance and leave rules, free of I/O.
//!
//! Services load records, hand them to these functions together with the
//! resolved [`office_config::OfficeConfig`] and an [`clock::OfficeClock`], and
//! persist whatever comes back.

pub mod classifier;
pub mod clock;
pub mod ledger;
pub mod manual_override;
pub mod office_config;
pub mod reconciler;
