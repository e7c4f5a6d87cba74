//! matchgraph - Player and match repositories over a Neo4j graph.
//!
//! Players and matches are nodes linked by `PARTICIPATED_IN` edges. Every
//! write runs in one transaction with an optional deadline; lookups of
//! missing nodes return `None` instead of failing.

pub mod cli;
pub mod config;
pub mod context;
pub mod di;
pub mod error;
pub mod graph;
pub mod migrations;
pub mod models;
pub mod repositories;

pub use di::FromRef;
