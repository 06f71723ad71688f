pub mod config;
pub mod curve;
pub mod register;
pub mod report;
pub mod schedule;
