//! Graph Schema
//!
//! This module provides the node/edge types that make up a film graph
//! snapshot, plus the key-derivation helpers that give every entity a stable
//! string identity.
//!
//! Node keys are namespaced by entity kind so that two entities sharing a
//! bare display name never collide:
//!
//! - seed movie: the raw title (`"Matrix"`)
//! - director: `d-` + name (`"d-Wachowski"`)
//! - seed-time actor: `a-` + ordinal + `-` + name (`"a-0-Keanu"`)
//! - expansion-time film: `f-` + title (`"f-Speed"`)
//! - expansion-time actor: `a-` + name + `-` + parent film key
//!   (`"a-Keanu-f-Speed"`)
//!
//! The ordinal in seed-time actor keys disambiguates duplicate names within
//! one cast list. Tying expansion-time actor keys to the parent film means
//! the same actor under two films gets two nodes: the graph models
//! *appearances*, not canonical entities.

use serde::{Deserialize, Serialize};

/// Key prefix for director nodes.
pub const DIRECTOR_PREFIX: &str = "d-";
/// Key prefix for films added by expanding a director.
pub const FILM_PREFIX: &str = "f-";
/// Key prefix for actor nodes (both seed-time and expansion-time).
pub const ACTOR_PREFIX: &str = "a-";

/// Relation label on seed edges from a movie to its directors.
pub const REL_DIRECTED_BY: &str = "directed by";
/// Relation label on edges from a film to its cast.
pub const REL_ACTED_IN: &str = "acted in";
/// Relation label on edges from a director to their films.
pub const REL_DIRECTED: &str = "directed";

/// Derive the key of a director node.
#[must_use]
pub fn director_key(name: &str) -> String {
    format!("{DIRECTOR_PREFIX}{name}")
}

/// Derive the key of a seed-time actor node. `ordinal` is the actor's
/// position in the seed cast list.
#[must_use]
pub fn seed_actor_key(ordinal: usize, name: &str) -> String {
    format!("{ACTOR_PREFIX}{ordinal}-{name}")
}

/// Derive the key of a film node added by expanding a director.
#[must_use]
pub fn film_key(title: &str) -> String {
    format!("{FILM_PREFIX}{title}")
}

/// Derive the key of an actor node added by expanding a film. The parent
/// film key is part of the identity.
#[must_use]
pub fn cast_actor_key(name: &str, parent_film_key: &str) -> String {
    format!("{ACTOR_PREFIX}{name}-{parent_film_key}")
}

/// Kind of entity a node represents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The seed movie at the center of the graph
    Movie,
    /// A director of the seed movie
    Director,
    /// An actor from the seed movie's cast list
    SeedActor,
    /// A film reached by expanding a director
    ExpandedFilm,
    /// An actor reached by expanding a film
    ExpandedActor,
}

impl NodeKind {
    /// Default presentational style for this kind of node.
    #[must_use]
    pub fn style(self) -> NodeStyle {
        match self {
            NodeKind::Movie => NodeStyle::new(NodeShape::Box, "#A2D2FF"),
            NodeKind::Director => NodeStyle::new(NodeShape::Ellipse, "#FFC6FF"),
            NodeKind::SeedActor => NodeStyle::new(NodeShape::Ellipse, "#B9FBC0"),
            NodeKind::ExpandedFilm => NodeStyle::new(NodeShape::Box, "#FFD6A5"),
            NodeKind::ExpandedActor => NodeStyle::new(NodeShape::Ellipse, "#CAFFBF"),
        }
    }
}

/// Shape hint for the renderer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeShape {
    /// Rectangular node (films)
    Box,
    /// Elliptical node (people)
    Ellipse,
}

/// Presentational hint attached to a node. Purely advisory; the renderer
/// owns all actual layout and styling decisions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeStyle {
    /// Shape hint
    pub shape: NodeShape,
    /// Fill color hint (CSS hex)
    pub color: String,
}

impl NodeStyle {
    /// Create a style hint
    pub fn new(shape: NodeShape, color: impl Into<String>) -> Self {
        Self {
            shape,
            color: color.into(),
        }
    }
}

/// A node in the film graph. Immutable once inserted: label and style are
/// fixed at creation and a node only disappears when a collapse prunes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    /// Unique key within the graph (see module docs for derivation)
    pub key: String,
    /// Display label
    pub label: String,
    /// Kind of entity
    pub kind: NodeKind,
    /// Presentational hint
    pub style: NodeStyle,
}

impl Node {
    /// Create a node with the default style for its kind
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            style: kind.style(),
        }
    }
}

/// A directed, labeled edge. Identity is the full (from, to, label) triple;
/// the engine suppresses exact duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Source node key
    pub from: String,
    /// Target node key
    pub to: String,
    /// Relation label, e.g. "directed by"
    pub label: String,
}

impl Edge {
    /// Create an edge
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: label.into(),
        }
    }
}

/// A child descriptor handed to [`crate::graph::FilmGraph::add_children`]:
/// the pre-derived key, the display label, the relation label for the edge
/// from the parent, and the node kind.
#[derive(Debug, Clone)]
pub struct ChildSpec {
    /// Derived node key
    pub key: String,
    /// Display label
    pub label: String,
    /// Relation label for the parent → child edge
    pub relation: String,
    /// Kind of the child node
    pub kind: NodeKind,
}

/// Read-only copy of the graph for the renderer. Vectors preserve insertion
/// order, so two identical mutation histories produce identical snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GraphSnapshot {
    /// All nodes in insertion order
    pub nodes: Vec<Node>,
    /// All edges in insertion order
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    /// Get total number of nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get total number of edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get a node by key
    #[must_use]
    pub fn get_node(&self, key: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.key == key)
    }

    /// Get all outgoing edges from a node
    #[must_use]
    pub fn outgoing_edges(&self, from: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.from == from).collect()
    }

    /// Convert to JSON string for the renderer boundary
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_key_derivation() {
        assert_eq!(director_key("Wachowski"), "d-Wachowski");
        assert_eq!(seed_actor_key(0, "Keanu"), "a-0-Keanu");
        assert_eq!(film_key("Speed"), "f-Speed");
        assert_eq!(cast_actor_key("Keanu", "f-Speed"), "a-Keanu-f-Speed");
    }

    #[test]
    fn test_duplicate_names_get_distinct_keys() {
        // Two same-named actors in one cast list
        assert_ne!(seed_actor_key(0, "Smith"), seed_actor_key(1, "Smith"));
        // The same actor under two different films
        assert_ne!(
            cast_actor_key("Keanu", "f-Speed"),
            cast_actor_key("Keanu", "f-Matrix")
        );
    }

    #[test]
    fn test_node_style_follows_kind() {
        let node = Node::new("f-Speed", "Speed", NodeKind::ExpandedFilm);
        assert_eq!(node.style.shape, NodeShape::Box);
        assert_eq!(node.style.color, "#FFD6A5");

        let node = Node::new("d-Wachowski", "Wachowski", NodeKind::Director);
        assert_eq!(node.style.shape, NodeShape::Ellipse);
    }

    #[test]
    fn test_snapshot_lookup_helpers() {
        let snapshot = GraphSnapshot {
            nodes: vec![
                Node::new("Matrix", "Matrix", NodeKind::Movie),
                Node::new("d-Wachowski", "Wachowski", NodeKind::Director),
            ],
            edges: vec![Edge::new("Matrix", "d-Wachowski", REL_DIRECTED_BY)],
        };
        assert_eq!(snapshot.node_count(), 2);
        assert_eq!(snapshot.edge_count(), 1);
        assert!(snapshot.get_node("d-Wachowski").is_some());
        assert_eq!(snapshot.outgoing_edges("Matrix").len(), 1);
        assert!(snapshot.outgoing_edges("d-Wachowski").is_empty());
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = GraphSnapshot {
            nodes: vec![Node::new("Matrix", "Matrix", NodeKind::Movie)],
            edges: vec![],
        };
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"Matrix\""));
        assert!(json.contains("\"movie\""));
        assert!(json.contains("\"box\""));
    }
}
