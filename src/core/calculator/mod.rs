pub mod gaps;
pub mod stats;
pub mod totals;
