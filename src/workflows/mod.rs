// Record lifecycle rules. Pure functions over records; persistence lives in the store.

pub mod issuance;
pub mod maintenance;

pub use maintenance::{MaintenanceTransition, TransitionInput, IRREPARABLE};
