//! Discovery Domain Concerns

pub mod catalog;
pub mod recommendations;
pub mod search;
pub mod validation;
pub mod views;
