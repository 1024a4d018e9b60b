pub mod charge_service;
pub mod charge_tracker;

// Re-export commonly used types
pub use charge_service::{ChargeOutcome, ChargeRequest, ChargeService};
pub use charge_tracker::{ChargeState, ChargeTracker, TrackedCharge};
