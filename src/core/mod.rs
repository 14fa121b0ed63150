pub mod calculator;
pub mod reducer;
