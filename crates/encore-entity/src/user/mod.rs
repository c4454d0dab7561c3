//! User-facing projections. The user table itself belongs to the profile service.

pub mod actor;

pub use actor::ActorSummary;
