//! # cinegraph
//!
//! An incremental film-relationship graph engine. A user seeds a graph from
//! a film found in an open knowledge base, then explores outward (film →
//! director → other films → their casts) by clicking nodes; each click
//! either fetches and merges that node's children or collapses them again.
//!
//! The crate is renderer-agnostic: it maintains the authoritative node/edge
//! sets and hands out immutable [`schema::GraphSnapshot`] copies; any
//! rendering layer that can draw a node/edge list and report back clicked
//! node keys will do.
//!
//! # Architecture
//!
//! - [`graph::FilmGraph`] - the graph-state engine: identity rules,
//!   expand/collapse semantics, snapshots
//! - [`orchestrator::Explorer`] - sequences asynchronous lookups, guards
//!   against duplicate in-flight expands, and discards stale responses
//! - [`client::EntityLookup`] - the abstract knowledge-base boundary; a
//!   Wikidata implementation lives in the `cinegraph-wikidata` crate
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cinegraph::client::EntityLookup;
//! use cinegraph::orchestrator::Explorer;
//!
//! # async fn demo(client: Arc<dyn EntityLookup>) -> cinegraph::Result<()> {
//! let explorer = Explorer::new(client);
//!
//! let candidates = explorer.search("matrix").await?;
//! explorer.seed(candidates.first());
//!
//! // A click event from the renderer:
//! let outcome = explorer.handle_click("d-Wachowski").await?;
//! println!("{outcome:?}, graph now {} nodes", explorer.snapshot().node_count());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod constants;
pub mod error;
pub mod graph;
pub mod orchestrator;
pub mod schema;

pub use constants::{
    DEFAULT_HTTP_CONNECT_TIMEOUT, DEFAULT_HTTP_REQUEST_TIMEOUT, DEFAULT_POOL_IDLE_TIMEOUT,
    DEFAULT_TCP_KEEPALIVE,
};
pub use error::{Error, Result};
