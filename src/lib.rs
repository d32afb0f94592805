pub mod data;
pub mod error;
pub mod history;
pub mod ranking;
pub mod records;
pub mod roster;
pub mod solver;

pub use data::{AllocationInput, AllocationResult, HallRecord, StudentRecord};
pub use solver::{allocate, place};
