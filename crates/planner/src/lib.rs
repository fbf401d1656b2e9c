//! Campaign budget planning: sizes an advertising campaign from its
//! revenue target and splits the spend into a phased, day-by-day schedule.

pub mod calendar;
pub mod engine;
pub mod policy;
pub mod store;
pub mod validate;

pub use engine::{compute, estimate, plan};
pub use policy::{AllocationPolicy, POLICIES};
pub use store::PlanStore;
pub use validate::{validate, ValidatedParameters};
