//! Generates the network map from a live cluster and, optionally, serves it.
//!
//! Each generation scans the configured namespaces, builds the graph, records metrics, renders
//! the HTML page, publishes the result as the current snapshot and writes the page to disk.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use netmap_core as core;
pub use netmap_graph as graph;
pub use netmap_k8s_scan as scan;

mod args;
mod generate;
mod metrics;
mod render;
mod server;
mod store;

pub use self::{
    args::Args,
    store::{SharedSnapshot, Snapshot},
};
