//! Restore plans: request, assembly and exclusion filtering

pub mod builder;
pub mod exclude;
pub mod model;
pub mod request;

pub use builder::assemble_plan;
pub use exclude::apply_exclusions;
pub use model::{PlanCounts, RestorePlan};
pub use request::{ExcludeSet, PlanRequest};
