//! Knowledge-base lookup boundary.
//!
//! The graph engine never talks to a network itself: everything it learns
//! about films and people arrives through the [`EntityLookup`] trait. The
//! record types here are the explicit shapes the boundary returns; any
//! missing fields in the upstream data (absent labels, empty cast lists)
//! are defaulted by the implementation before they reach the engine.

use async_trait::async_trait;

use crate::error::Result;

/// Fallback display string when an upstream record carries no label.
pub const UNTITLED: &str = "Untitled";

/// A film candidate returned by a title search.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FilmRecord {
    /// Display title (defaulted to [`UNTITLED`] when missing upstream)
    pub title: String,
    /// Director names
    pub directors: Vec<String>,
    /// Cast member names
    pub actors: Vec<String>,
    /// Optional poster/logo image URL
    pub poster: Option<String>,
}

/// A film returned by a by-director lookup.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DirectedFilm {
    /// Display title
    pub title: String,
    /// Aggregated cast member names
    pub actors: Vec<String>,
}

/// Abstract lookup capabilities against an open knowledge base.
///
/// All four calls are assumed to be network requests with unspecified
/// latency; none are required to be idempotent beyond read semantics. The
/// bounds (10 search hits, 20 raw by-director rows, 5 cast members) are
/// properties of the implementation, not of this trait.
#[async_trait]
pub trait EntityLookup: Send + Sync {
    /// Search films by a title fragment.
    async fn search_films(&self, title_fragment: &str) -> Result<Vec<FilmRecord>>;

    /// Films directed by the named person, deduplicated by film.
    async fn films_by_director(&self, name: &str) -> Result<Vec<DirectedFilm>>;

    /// Up to a bounded number of actor names for a film entity id.
    async fn actors_in_film(&self, identifier: &str) -> Result<Vec<String>>;

    /// Best-effort resolution of a display name to an entity id; first
    /// match only, `None` when nothing matches.
    async fn resolve_entity_id(&self, display_name: &str) -> Result<Option<String>>;
}
