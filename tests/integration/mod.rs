//! Integration test scenarios

pub mod scenarios;
