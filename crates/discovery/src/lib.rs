//! Product discovery: full-text search with record-store fallback, completion
//! suggestions, similar-product recommendations and deduplicated view tracking.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod envelope;
pub mod ids;
pub mod pagination;

#[cfg(test)]
mod test;
