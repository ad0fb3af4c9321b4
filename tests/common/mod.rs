//! Common test utilities for quantlink integration tests
//!
//! Shared helpers for opening every storage backend and building
//! randomized graphs. Each test binary uses a different subset.

#![allow(dead_code, unused_imports)]

pub mod backends;
pub mod graph_builder;

pub use backends::{all_backends, Backend};
pub use graph_builder::{random_graph, RandomGraph, RandomGraphConfig};
