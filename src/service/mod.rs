//! Persistence-facing operations. Each function loads what the domain rules need,
//! applies them, and writes the result back.

pub mod attendance;
pub mod dashboard;
pub mod employee;
pub mod holiday;
pub mod leave;
pub mod settings;
