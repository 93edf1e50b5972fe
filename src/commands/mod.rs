pub mod control;
pub mod start;
pub mod status;
