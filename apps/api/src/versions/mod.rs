//! Saved CV and cover-letter versions.

pub mod handlers;
pub mod naming;
pub mod store;
