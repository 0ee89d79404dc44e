//! Test infrastructure

pub mod fixtures;
