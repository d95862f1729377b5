pub mod deal;
pub mod raw;
