//! CLI command implementations.

pub mod add;
pub mod audit;
pub mod repair;

pub use add::AddCommand;
pub use audit::{AuditCommand, AuditReport, LinkCheck};
pub use repair::{RepairCommand, RepairSummary};
