//! Domain types for procurement records

pub mod tenders;

pub use tenders::*;
