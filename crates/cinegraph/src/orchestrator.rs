//! Fetch Orchestrator
//!
//! [`Explorer`] sits between the renderer's click stream and the graph
//! engine. A click on a node key resolves to one of: ignore (the key is not
//! an expandable kind), collapse (the key is expanded), or expand (fetch
//! the node's children from the knowledge base, then merge).
//!
//! Two guards keep interleaved clicks and slow responses from corrupting
//! the graph:
//!
//! - **in-flight guard**: at most one outstanding expand per key; a
//!   re-click while the first fetch is pending returns
//!   [`ClickOutcome::InFlight`] without issuing a second lookup
//! - **staleness check**: a completed fetch is merged only if the seed
//!   generation is unchanged and the clicked node still exists (an ancestor
//!   collapse prunes it); otherwise the response is discarded
//!
//! No engine lock is held across an await, so every committed mutation is
//! an atomic critical section.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::client::{EntityLookup, FilmRecord};
use crate::error::{Error, Result};
use crate::graph::FilmGraph;
use crate::schema::{
    cast_actor_key, film_key, ChildSpec, GraphSnapshot, NodeKind, DIRECTOR_PREFIX, FILM_PREFIX,
    REL_ACTED_IN, REL_DIRECTED,
};

/// Maximum number of cast members merged when expanding a film.
pub const MAX_CAST: usize = 5;

/// What a click on a node key resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The key is not an expandable kind of node
    NotExpandable,
    /// An expand for this key is already in flight; no lookup was issued
    InFlight,
    /// The node was expanded; `added` is the number of new nodes merged
    Expanded {
        /// Number of nodes actually added
        added: usize,
    },
    /// The node was collapsed; `removed` is the number of nodes pruned
    Collapsed {
        /// Number of nodes removed
        removed: usize,
    },
    /// The fetch completed but the graph had moved on (re-seed or ancestor
    /// collapse); the response was dropped
    Discarded,
}

/// What kind of expansion a key asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ClickTarget {
    Director(String),
    Film(String),
    Other,
}

impl ClickTarget {
    fn classify(key: &str) -> Self {
        if let Some(name) = key.strip_prefix(DIRECTOR_PREFIX) {
            ClickTarget::Director(name.to_string())
        } else if let Some(title) = key.strip_prefix(FILM_PREFIX) {
            ClickTarget::Film(title.to_string())
        } else {
            ClickTarget::Other
        }
    }
}

/// Releases the in-flight reservation for a key when the operation settles,
/// whether it merged, was discarded, or failed.
struct InFlightGuard {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl InFlightGuard {
    fn acquire(keys: &Arc<Mutex<HashSet<String>>>, key: &str) -> Option<Self> {
        if !keys.lock().insert(key.to_string()) {
            return None;
        }
        Some(Self {
            keys: Arc::clone(keys),
            key: key.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys.lock().remove(&self.key);
    }
}

/// Orchestrates clicks, knowledge-base fetches and graph merges.
///
/// Cheap to clone; clones share the same graph and in-flight state.
#[derive(Clone)]
pub struct Explorer {
    client: Arc<dyn EntityLookup>,
    graph: Arc<Mutex<FilmGraph>>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl Explorer {
    /// Create an explorer over an empty graph.
    pub fn new(client: Arc<dyn EntityLookup>) -> Self {
        Self {
            client,
            graph: Arc::new(Mutex::new(FilmGraph::new())),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Search the knowledge base for seed candidates. Thin passthrough for
    /// the search form.
    pub async fn search(&self, title_fragment: &str) -> Result<Vec<FilmRecord>> {
        self.client.search_films(title_fragment).await
    }

    /// Reset the graph around a chosen film. `None` is a silent no-op.
    pub fn seed(&self, film: Option<&FilmRecord>) {
        self.graph.lock().seed(film);
    }

    /// Owned copy of the current graph for the renderer.
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        self.graph.lock().snapshot()
    }

    /// Whether `key` currently has fetched children in the graph.
    #[must_use]
    pub fn is_expanded(&self, key: &str) -> bool {
        self.graph.lock().is_expanded(key)
    }

    /// React to a click on a node key.
    ///
    /// # Errors
    ///
    /// [`Error::Lookup`] when the knowledge base fails and
    /// [`Error::ResolutionMiss`] when a film has no resolvable identifier.
    /// In both cases nothing was merged, the key is left collapsed, and the
    /// graph is exactly as it was before the click.
    pub async fn handle_click(&self, key: &str) -> Result<ClickOutcome> {
        let target = ClickTarget::classify(key);
        if target == ClickTarget::Other {
            return Ok(ClickOutcome::NotExpandable);
        }

        {
            let mut graph = self.graph.lock();
            if graph.is_expanded(key) {
                let removed = graph.collapse(key);
                return Ok(ClickOutcome::Collapsed { removed });
            }
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, key) else {
            debug!(key, "expand already in flight, ignoring click");
            return Ok(ClickOutcome::InFlight);
        };
        let generation = self.graph.lock().generation();

        let children = match &target {
            ClickTarget::Director(name) => self.director_children(name).await,
            ClickTarget::Film(title) => self.film_children(key, title).await,
            ClickTarget::Other => return Ok(ClickOutcome::NotExpandable),
        };
        let children = children.inspect_err(|error| {
            warn!(key, %error, "expansion abandoned");
        })?;

        let mut graph = self.graph.lock();
        if graph.generation() != generation || !graph.contains_node(key) || graph.is_expanded(key)
        {
            debug!(key, "discarding stale expand response");
            return Ok(ClickOutcome::Discarded);
        }

        match graph.add_children(key, children) {
            Ok(added) => {
                debug!(key, added, "expanded node");
                Ok(ClickOutcome::Expanded { added })
            }
            // The parent vanished between the checks above and the merge;
            // treat it like any other stale response.
            Err(Error::NodeNotFound(_)) => Ok(ClickOutcome::Discarded),
            Err(e) => Err(e),
        }
    }

    /// Children of a director: the films they directed.
    async fn director_children(&self, name: &str) -> Result<Vec<ChildSpec>> {
        let films = self.client.films_by_director(name).await?;
        Ok(films
            .into_iter()
            .map(|film| ChildSpec {
                key: film_key(&film.title),
                label: film.title,
                relation: REL_DIRECTED.to_string(),
                kind: NodeKind::ExpandedFilm,
            })
            .collect())
    }

    /// Children of an expansion-time film: its cast, found by first
    /// resolving the film's entity identifier from its display title.
    async fn film_children(&self, parent_key: &str, title: &str) -> Result<Vec<ChildSpec>> {
        let id = self
            .client
            .resolve_entity_id(title)
            .await?
            .ok_or_else(|| Error::ResolutionMiss(title.to_string()))?;

        let actors = self.client.actors_in_film(&id).await?;
        Ok(actors
            .into_iter()
            .take(MAX_CAST)
            .map(|actor| ChildSpec {
                key: cast_actor_key(&actor, parent_key),
                label: actor,
                relation: REL_ACTED_IN.to_string(),
                kind: NodeKind::ExpandedActor,
            })
            .collect())
    }
}
