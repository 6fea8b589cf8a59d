//! Graph State Engine
//!
//! [`FilmGraph`] owns the authoritative node/edge sets and the expansion
//! state. All mutation goes through `seed`, `add_children` and `collapse`;
//! readers get owned [`GraphSnapshot`] copies, never references into the
//! internal containers.
//!
//! Invariants maintained here:
//!
//! - node keys are unique; inserting an existing key is a no-op
//! - every edge's endpoints exist at the moment the edge is inserted, and
//!   pruning a node removes every edge touching it - no dangling edges in
//!   any observable state
//! - a key is in the expansion set only while its direct children are
//!   present; collapse evicts it, so a re-click re-fetches
//! - collapse is single-level: grandchildren reached only through a pruned
//!   child stay in the graph as orphans (their edges go with the pruned
//!   parent)

use std::collections::{HashMap, HashSet};

use crate::client::FilmRecord;
use crate::error::{Error, Result};
use crate::schema::{
    director_key, seed_actor_key, ChildSpec, Edge, GraphSnapshot, Node, NodeKind,
    REL_ACTED_IN, REL_DIRECTED_BY,
};

/// Maximum number of cast members shown when seeding a graph.
pub const MAX_SEED_ACTORS: usize = 5;

/// The incremental film-relationship graph.
#[derive(Debug, Default)]
pub struct FilmGraph {
    nodes: Vec<Node>,
    node_keys: HashSet<String>,
    edges: Vec<Edge>,
    edge_set: HashSet<Edge>,
    expanded: HashSet<String>,
    generation: u64,
}

impl FilmGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the graph around a seed film: the movie node, one director
    /// node per director with a "directed by" edge, and up to
    /// [`MAX_SEED_ACTORS`] actor nodes with "acted in" edges.
    ///
    /// `None` is a silent no-op; the current graph stays untouched.
    pub fn seed(&mut self, film: Option<&FilmRecord>) {
        let Some(film) = film else { return };

        self.nodes.clear();
        self.node_keys.clear();
        self.edges.clear();
        self.edge_set.clear();
        self.expanded.clear();
        self.generation += 1;

        let movie_key = film.title.clone();
        self.insert_node(Node::new(&movie_key, &film.title, NodeKind::Movie));

        for director in &film.directors {
            let key = director_key(director);
            self.insert_node(Node::new(&key, director, NodeKind::Director));
            self.insert_edge(&movie_key, &key, REL_DIRECTED_BY);
        }

        for (i, actor) in film.actors.iter().take(MAX_SEED_ACTORS).enumerate() {
            let key = seed_actor_key(i, actor);
            self.insert_node(Node::new(&key, actor, NodeKind::SeedActor));
            self.insert_edge(&movie_key, &key, REL_ACTED_IN);
        }

        tracing::debug!(
            movie = %film.title,
            nodes = self.nodes.len(),
            generation = self.generation,
            "seeded graph"
        );
    }

    /// Merge fetched children under `parent_key` and mark it expanded.
    ///
    /// Nodes whose key already exists are skipped; edges are deduplicated
    /// on the full (from, to, label) triple. Returns the number of nodes
    /// actually added.
    ///
    /// # Errors
    ///
    /// [`Error::NodeNotFound`] if the parent is not in the graph (for
    /// instance because it was pruned while the fetch was in flight); no
    /// children are committed in that case.
    pub fn add_children(&mut self, parent_key: &str, children: Vec<ChildSpec>) -> Result<usize> {
        if !self.node_keys.contains(parent_key) {
            return Err(Error::NodeNotFound(parent_key.to_string()));
        }

        let mut added = 0;
        for child in children {
            if self.insert_node(Node::new(&child.key, &child.label, child.kind)) {
                added += 1;
            }
            self.insert_edge(parent_key, &child.key, &child.relation);
        }
        self.expanded.insert(parent_key.to_string());
        Ok(added)
    }

    /// Remove the direct children of `parent_key` (the `to` endpoints of
    /// its outgoing edges), every edge touching a pruned node, and evict
    /// the key from the expansion set. Pruned keys that were themselves
    /// expanded are evicted too.
    ///
    /// Single-level by design: a pruned child's own children stay behind
    /// as orphan nodes. Returns the number of nodes removed; 0 when the
    /// key was not expanded.
    pub fn collapse(&mut self, parent_key: &str) -> usize {
        if !self.expanded.remove(parent_key) {
            return 0;
        }

        let pruned: HashSet<String> = self
            .edges
            .iter()
            .filter(|e| e.from == parent_key)
            .map(|e| e.to.clone())
            .collect();

        self.nodes.retain(|n| !pruned.contains(&n.key));
        self.node_keys.retain(|k| !pruned.contains(k));
        self.edges
            .retain(|e| !pruned.contains(&e.from) && !pruned.contains(&e.to));
        self.edge_set
            .retain(|e| !pruned.contains(&e.from) && !pruned.contains(&e.to));
        for key in &pruned {
            self.expanded.remove(key);
        }

        tracing::debug!(parent = parent_key, removed = pruned.len(), "collapsed node");
        pruned.len()
    }

    /// Whether `key` currently has fetched children in the graph.
    #[must_use]
    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.contains(key)
    }

    /// Whether a node with `key` exists.
    #[must_use]
    pub fn contains_node(&self, key: &str) -> bool {
        self.node_keys.contains(key)
    }

    /// Seed generation counter, bumped on every successful `seed`. Used by
    /// the orchestrator to discard responses initiated against an earlier
    /// graph.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Owned read-only copy of the current node/edge sets.
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Insert a node unless its key already exists. Returns true if the
    /// node was added.
    fn insert_node(&mut self, node: Node) -> bool {
        if !self.node_keys.insert(node.key.clone()) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Insert an edge between two existing nodes, suppressing exact
    /// duplicates.
    fn insert_edge(&mut self, from: &str, to: &str, label: &str) {
        debug_assert!(self.node_keys.contains(from) && self.node_keys.contains(to));
        let edge = Edge::new(from, to, label);
        if self.edge_set.insert(edge.clone()) {
            self.edges.push(edge);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::schema::{film_key, NodeKind, REL_DIRECTED};

    fn matrix() -> FilmRecord {
        FilmRecord {
            title: "Matrix".to_string(),
            directors: vec!["Wachowski".to_string()],
            actors: vec!["Keanu".to_string(), "Carrie".to_string()],
            poster: None,
        }
    }

    fn film_child(title: &str) -> ChildSpec {
        ChildSpec {
            key: film_key(title),
            label: title.to_string(),
            relation: REL_DIRECTED.to_string(),
            kind: NodeKind::ExpandedFilm,
        }
    }

    fn assert_no_dangling_edges(graph: &FilmGraph) {
        let snapshot = graph.snapshot();
        for edge in &snapshot.edges {
            assert!(
                snapshot.get_node(&edge.from).is_some(),
                "dangling edge from '{}'",
                edge.from
            );
            assert!(
                snapshot.get_node(&edge.to).is_some(),
                "dangling edge to '{}'",
                edge.to
            );
        }
    }

    #[test]
    fn test_seed_shape() {
        let mut graph = FilmGraph::new();
        graph.seed(Some(&matrix()));

        let snapshot = graph.snapshot();
        assert_eq!(snapshot.node_count(), 4); // movie + director + 2 actors
        assert_eq!(snapshot.edge_count(), 3);
        assert_eq!(snapshot.get_node("Matrix").map(|n| n.kind), Some(NodeKind::Movie));
        assert!(snapshot.get_node("d-Wachowski").is_some());
        assert!(snapshot.get_node("a-0-Keanu").is_some());
        assert!(snapshot.get_node("a-1-Carrie").is_some());
        assert_eq!(snapshot.outgoing_edges("Matrix").len(), 3);
        assert_no_dangling_edges(&graph);
    }

    #[test]
    fn test_seed_none_is_noop() {
        let mut graph = FilmGraph::new();
        graph.seed(Some(&matrix()));
        let before = graph.snapshot();
        let generation = graph.generation();

        graph.seed(None);
        assert_eq!(graph.snapshot(), before);
        assert_eq!(graph.generation(), generation);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let mut once = FilmGraph::new();
        once.seed(Some(&matrix()));

        let mut twice = FilmGraph::new();
        twice.seed(Some(&matrix()));
        twice.seed(Some(&matrix()));

        assert_eq!(once.snapshot(), twice.snapshot());
    }

    #[test]
    fn test_seed_caps_actors_and_disambiguates_duplicates() {
        let film = FilmRecord {
            title: "Ensemble".to_string(),
            directors: vec![],
            actors: vec!["A", "B", "Smith", "Smith", "E", "F", "G"]
                .into_iter()
                .map(String::from)
                .collect(),
            poster: None,
        };
        let mut graph = FilmGraph::new();
        graph.seed(Some(&film));

        let snapshot = graph.snapshot();
        // movie + 5 actors, the two Smiths kept apart by their ordinal
        assert_eq!(snapshot.node_count(), 6);
        assert!(snapshot.get_node("a-2-Smith").is_some());
        assert!(snapshot.get_node("a-3-Smith").is_some());
        assert!(snapshot.get_node("a-5-F").is_none());
    }

    #[test]
    fn test_seed_resets_previous_graph() {
        let mut graph = FilmGraph::new();
        graph.seed(Some(&matrix()));
        graph
            .add_children("d-Wachowski", vec![film_child("Speed")])
            .unwrap();
        assert!(graph.is_expanded("d-Wachowski"));

        let other = FilmRecord {
            title: "Speed".to_string(),
            directors: vec!["Jan".to_string()],
            actors: vec![],
            poster: None,
        };
        graph.seed(Some(&other));

        assert!(!graph.contains_node("Matrix"));
        assert!(!graph.is_expanded("d-Wachowski"));
        assert_eq!(graph.snapshot().node_count(), 2);
    }

    #[test]
    fn test_add_children_counts_only_new_nodes() {
        let mut graph = FilmGraph::new();
        graph.seed(Some(&matrix()));

        let added = graph
            .add_children(
                "d-Wachowski",
                vec![film_child("Speed"), film_child("Speed"), film_child("Bound")],
            )
            .unwrap();
        assert_eq!(added, 2);
        assert!(graph.is_expanded("d-Wachowski"));

        // Re-adding the same children adds nothing and duplicates no edges
        let snapshot = graph.snapshot();
        let added = graph
            .add_children("d-Wachowski", vec![film_child("Speed")])
            .unwrap();
        assert_eq!(added, 0);
        assert_eq!(graph.snapshot(), snapshot);
    }

    #[test]
    fn test_add_children_missing_parent() {
        let mut graph = FilmGraph::new();
        graph.seed(Some(&matrix()));

        let err = graph
            .add_children("d-Nobody", vec![film_child("Speed")])
            .unwrap_err();
        assert!(matches!(err, Error::NodeNotFound(_)));
        assert!(!graph.is_expanded("d-Nobody"));
        assert_eq!(graph.snapshot().node_count(), 4);
    }

    #[test]
    fn test_edge_dedup() {
        let mut graph = FilmGraph::new();
        graph.seed(Some(&matrix()));
        graph
            .add_children("d-Wachowski", vec![film_child("Speed")])
            .unwrap();
        graph
            .add_children("d-Wachowski", vec![film_child("Speed")])
            .unwrap();

        let edges = graph.snapshot().outgoing_edges("d-Wachowski").len();
        assert_eq!(edges, 1);
    }

    #[test]
    fn test_expand_collapse_is_inverse() {
        let mut graph = FilmGraph::new();
        graph.seed(Some(&matrix()));
        let before = graph.snapshot();

        graph
            .add_children("d-Wachowski", vec![film_child("Speed"), film_child("Bound")])
            .unwrap();
        assert_eq!(graph.snapshot().node_count(), 6);

        let removed = graph.collapse("d-Wachowski");
        assert_eq!(removed, 2);
        assert_eq!(graph.snapshot(), before);
        assert!(!graph.is_expanded("d-Wachowski"));
    }

    #[test]
    fn test_collapse_not_expanded_is_noop() {
        let mut graph = FilmGraph::new();
        graph.seed(Some(&matrix()));
        let before = graph.snapshot();

        assert_eq!(graph.collapse("d-Wachowski"), 0);
        assert_eq!(graph.collapse("no-such-node"), 0);
        assert_eq!(graph.snapshot(), before);
    }

    #[test]
    fn test_collapse_is_single_level() {
        let mut graph = FilmGraph::new();
        graph.seed(Some(&matrix()));
        graph
            .add_children("d-Wachowski", vec![film_child("Speed")])
            .unwrap();
        // Expand the film as well: its cast hangs off "f-Speed"
        graph
            .add_children(
                "f-Speed",
                vec![ChildSpec {
                    key: "a-Keanu-f-Speed".to_string(),
                    label: "Keanu".to_string(),
                    relation: REL_ACTED_IN.to_string(),
                    kind: NodeKind::ExpandedActor,
                }],
            )
            .unwrap();

        let removed = graph.collapse("d-Wachowski");
        assert_eq!(removed, 1);

        // The grandchild stays as an orphan, but no edge dangles and the
        // pruned film is no longer marked expanded.
        let snapshot = graph.snapshot();
        assert!(snapshot.get_node("f-Speed").is_none());
        assert!(snapshot.get_node("a-Keanu-f-Speed").is_some());
        assert!(!graph.is_expanded("f-Speed"));
        assert_no_dangling_edges(&graph);
    }

    #[test]
    fn test_collapse_prunes_cross_edges() {
        // A child referenced from elsewhere is still pruned, and the
        // foreign edge into it goes too - never a dangling edge.
        let mut graph = FilmGraph::new();
        graph.seed(Some(&matrix()));
        graph
            .add_children("d-Wachowski", vec![film_child("Speed")])
            .unwrap();
        graph
            .add_children(
                "a-0-Keanu",
                vec![ChildSpec {
                    key: film_key("Speed"),
                    label: "Speed".to_string(),
                    relation: REL_ACTED_IN.to_string(),
                    kind: NodeKind::ExpandedFilm,
                }],
            )
            .unwrap();

        graph.collapse("d-Wachowski");
        let snapshot = graph.snapshot();
        assert!(snapshot.get_node("f-Speed").is_none());
        assert!(snapshot.outgoing_edges("a-0-Keanu").is_empty());
        assert_no_dangling_edges(&graph);
    }

    #[test]
    fn test_node_immutable_after_creation() {
        let mut graph = FilmGraph::new();
        graph.seed(Some(&matrix()));
        graph
            .add_children(
                "Matrix",
                vec![ChildSpec {
                    key: "d-Wachowski".to_string(),
                    label: "Different Label".to_string(),
                    relation: REL_DIRECTED_BY.to_string(),
                    kind: NodeKind::ExpandedActor,
                }],
            )
            .unwrap();

        let node = graph.snapshot().get_node("d-Wachowski").cloned().unwrap();
        assert_eq!(node.label, "Wachowski");
        assert_eq!(node.kind, NodeKind::Director);
    }

    #[test]
    fn test_generation_bumps_on_seed_only() {
        let mut graph = FilmGraph::new();
        assert_eq!(graph.generation(), 0);
        graph.seed(Some(&matrix()));
        assert_eq!(graph.generation(), 1);
        graph
            .add_children("d-Wachowski", vec![film_child("Speed")])
            .unwrap();
        graph.collapse("d-Wachowski");
        assert_eq!(graph.generation(), 1);
        graph.seed(Some(&matrix()));
        assert_eq!(graph.generation(), 2);
    }
}
