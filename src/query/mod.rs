// src/query/mod.rs
//
// Query construction module

pub mod filter_builder;

pub use filter_builder::{BuiltQuery, FilterBuilder, SortDirection, SortField};
