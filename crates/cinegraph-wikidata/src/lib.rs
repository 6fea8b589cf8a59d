//! # Wikidata Lookup Client
//!
//! Wikidata is the free knowledge base behind Wikipedia. This crate
//! implements cinegraph's [`EntityLookup`] boundary against it: film search
//! and relationship lookups go through the public SPARQL endpoint, and
//! display-name → entity-id resolution goes through the `wbsearchentities`
//! MediaWiki API. No API key is required.
//!
//! All responses are requested as `application/sparql-results+json` and
//! deserialized into explicit record shapes at this boundary; missing
//! labels are defaulted here so the graph engine never sees partial data.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cinegraph::client::EntityLookup;
//! use cinegraph_wikidata::WikidataClient;
//!
//! # tokio_test::block_on(async {
//! let wikidata = WikidataClient::builder().language("en").build();
//!
//! let films = wikidata.search_films("matrix").await.unwrap();
//! println!("found {} candidates", films.len());
//! # });
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::debug;

use cinegraph::client::{DirectedFilm, EntityLookup, FilmRecord, UNTITLED};
use cinegraph::{
    Error, Result, DEFAULT_HTTP_CONNECT_TIMEOUT, DEFAULT_HTTP_REQUEST_TIMEOUT,
    DEFAULT_POOL_IDLE_TIMEOUT, DEFAULT_TCP_KEEPALIVE,
};

/// Public Wikidata SPARQL endpoint.
pub const SPARQL_ENDPOINT: &str = "https://query.wikidata.org/sparql";
/// Public MediaWiki API endpoint used for entity search.
pub const ENTITY_SEARCH_ENDPOINT: &str = "https://www.wikidata.org/w/api.php";

/// Title-search result bound.
const SEARCH_LIMIT: usize = 10;
/// Raw row bound for by-director queries, before per-film deduplication.
const DIRECTOR_ROW_LIMIT: usize = 20;
/// Cast member bound per film.
const CAST_LIMIT: usize = 5;

const SPARQL_ACCEPT: &str = "application/sparql-results+json";

/// Wikidata-backed [`EntityLookup`] implementation.
///
/// # Example
///
/// ```rust,no_run
/// use cinegraph::client::EntityLookup;
/// use cinegraph_wikidata::WikidataClient;
///
/// # tokio_test::block_on(async {
/// let wikidata = WikidataClient::new();
/// let id = wikidata.resolve_entity_id("Speed").await.unwrap();
/// println!("Speed resolves to {id:?}");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct WikidataClient {
    client: reqwest::Client,
    sparql_endpoint: String,
    entity_search_endpoint: String,
    language: String,
}

impl WikidataClient {
    /// Create a client with default settings (English labels, public
    /// endpoints).
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for `WikidataClient`
    #[must_use]
    pub fn builder() -> WikidataClientBuilder {
        WikidataClientBuilder::default()
    }

    /// Run a SPARQL query and return the raw JSON body.
    async fn sparql(&self, query: &str) -> Result<String> {
        debug!(endpoint = %self.sparql_endpoint, "running SPARQL query");
        let response = self
            .client
            .get(&self.sparql_endpoint)
            .header(ACCEPT, SPARQL_ACCEPT)
            .query(&[("query", query)])
            .send()
            .await
            .map_err(|e| Error::lookup(format!("SPARQL request failed: {e}")))?
            .error_for_status()
            .map_err(|e| Error::lookup(format!("SPARQL endpoint returned error: {e}")))?;

        response
            .text()
            .await
            .map_err(|e| Error::lookup(format!("failed to read SPARQL response: {e}")))
    }
}

impl Default for WikidataClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityLookup for WikidataClient {
    async fn search_films(&self, title_fragment: &str) -> Result<Vec<FilmRecord>> {
        let query = film_search_query(title_fragment, &self.language);
        let body = self.sparql(&query).await?;
        parse_film_search(&body)
    }

    async fn films_by_director(&self, name: &str) -> Result<Vec<DirectedFilm>> {
        let query = films_by_director_query(name, &self.language);
        let body = self.sparql(&query).await?;
        parse_directed_films(&body)
    }

    async fn actors_in_film(&self, identifier: &str) -> Result<Vec<String>> {
        if !is_valid_qid(identifier) {
            return Err(Error::lookup(format!(
                "'{identifier}' is not a Wikidata entity id"
            )));
        }
        let query = cast_query(identifier, &self.language);
        let body = self.sparql(&query).await?;
        parse_cast(&body)
    }

    async fn resolve_entity_id(&self, display_name: &str) -> Result<Option<String>> {
        debug!(name = display_name, "resolving entity id");
        let response = self
            .client
            .get(&self.entity_search_endpoint)
            .query(&[
                ("action", "wbsearchentities"),
                ("search", display_name),
                ("language", &self.language),
                ("format", "json"),
                ("origin", "*"),
            ])
            .send()
            .await
            .map_err(|e| Error::lookup(format!("entity search request failed: {e}")))?
            .error_for_status()
            .map_err(|e| Error::lookup(format!("entity search returned error: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::lookup(format!("failed to read entity search response: {e}")))?;
        first_entity_id(&body)
    }
}

/// Builder for [`WikidataClient`]
///
/// # Example
///
/// ```rust
/// use cinegraph_wikidata::WikidataClient;
///
/// let wikidata = WikidataClient::builder()
///     .language("es")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct WikidataClientBuilder {
    language: Option<String>,
    sparql_endpoint: Option<String>,
    entity_search_endpoint: Option<String>,
}

impl WikidataClientBuilder {
    /// Set the label language (MediaWiki language code). Default: `"en"`.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Override the SPARQL endpoint (e.g. for a mirror).
    #[must_use]
    pub fn sparql_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.sparql_endpoint = Some(endpoint.into());
        self
    }

    /// Override the entity-search endpoint.
    #[must_use]
    pub fn entity_search_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.entity_search_endpoint = Some(endpoint.into());
        self
    }

    /// Build the `WikidataClient`
    #[must_use]
    pub fn build(self) -> WikidataClient {
        WikidataClient {
            client: reqwest::Client::builder()
                .user_agent(concat!("cinegraph/", env!("CARGO_PKG_VERSION")))
                .timeout(DEFAULT_HTTP_REQUEST_TIMEOUT)
                .connect_timeout(DEFAULT_HTTP_CONNECT_TIMEOUT)
                .pool_idle_timeout(DEFAULT_POOL_IDLE_TIMEOUT)
                .tcp_keepalive(DEFAULT_TCP_KEEPALIVE)
                .build()
                .unwrap_or_default(),
            sparql_endpoint: self.sparql_endpoint.unwrap_or_else(|| SPARQL_ENDPOINT.into()),
            entity_search_endpoint: self
                .entity_search_endpoint
                .unwrap_or_else(|| ENTITY_SEARCH_ENDPOINT.into()),
            language: self.language.unwrap_or_else(|| "en".into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Query construction
// ---------------------------------------------------------------------------

/// Strip characters that would break out of a SPARQL string literal.
fn escape_literal(raw: &str) -> String {
    raw.chars().filter(|c| *c != '"' && *c != '\\').collect()
}

/// A bare entity id: "Q" followed by digits.
fn is_valid_qid(id: &str) -> bool {
    let mut chars = id.chars();
    chars.next() == Some('Q') && id.len() > 1 && chars.all(|c| c.is_ascii_digit())
}

/// Reduce an entity IRI like `http://www.wikidata.org/entity/Q17738` to its
/// bare QID. Already-bare ids pass through.
fn qid_from_iri(iri: &str) -> String {
    iri.rsplit('/').next().unwrap_or(iri).to_string()
}

/// Title search via the EntitySearch service: films with director, cast
/// (comma-aggregated) and an optional poster image.
fn film_search_query(title_fragment: &str, language: &str) -> String {
    let search = escape_literal(title_fragment);
    format!(
        r#"SELECT ?film ?filmLabel ?directorLabel (GROUP_CONCAT(DISTINCT ?actorLabel; separator=", ") AS ?actors) ?poster WHERE {{
  SERVICE wikibase:mwapi {{
    bd:serviceParam wikibase:endpoint "www.wikidata.org";
                    wikibase:api "EntitySearch";
                    mwapi:search "{search}";
                    mwapi:language "{language}".
    ?film wikibase:apiOutputItem mwapi:item.
    ?num wikibase:apiOrdinal true.
  }}
  ?film wdt:P31 wd:Q11424;
        wdt:P57 ?director;
        wdt:P161 ?actor.
  OPTIONAL {{ ?film wdt:P154 ?poster. }}
  SERVICE wikibase:label {{
    bd:serviceParam wikibase:language "{language}".
    ?film rdfs:label ?filmLabel.
    ?director rdfs:label ?directorLabel.
    ?actor rdfs:label ?actorLabel.
  }}
}}
GROUP BY ?film ?filmLabel ?directorLabel ?poster
LIMIT {SEARCH_LIMIT}"#
    )
}

/// Films whose director carries the given label, with cast labels for
/// per-film aggregation.
fn films_by_director_query(name: &str, language: &str) -> String {
    let name = escape_literal(name);
    format!(
        r#"SELECT ?film ?filmLabel ?actorLabel WHERE {{
  ?film wdt:P31 wd:Q11424;
        wdt:P57 ?director;
        wdt:P161 ?actor.
  ?director rdfs:label "{name}"@{language}.
  SERVICE wikibase:label {{
    bd:serviceParam wikibase:language "{language}".
    ?film rdfs:label ?filmLabel.
    ?actor rdfs:label ?actorLabel.
  }}
}}
LIMIT {DIRECTOR_ROW_LIMIT}"#
    )
}

/// Cast members of a film entity.
fn cast_query(qid: &str, language: &str) -> String {
    format!(
        r#"SELECT DISTINCT ?actorLabel WHERE {{
  wd:{qid} wdt:P161 ?actor.
  SERVICE wikibase:label {{
    bd:serviceParam wikibase:language "{language}".
    ?actor rdfs:label ?actorLabel.
  }}
}}
LIMIT {CAST_LIMIT}"#
    )
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    #[serde(default)]
    bindings: Vec<SparqlBinding>,
}

type SparqlBinding = HashMap<String, SparqlValue>;

#[derive(Debug, Deserialize)]
struct SparqlValue {
    value: String,
}

fn binding_value<'a>(binding: &'a SparqlBinding, key: &str) -> Option<&'a str> {
    binding.get(key).map(|v| v.value.as_str())
}

fn parse_film_search(body: &str) -> Result<Vec<FilmRecord>> {
    let response: SparqlResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .bindings
        .iter()
        .map(|binding| FilmRecord {
            title: binding_value(binding, "filmLabel")
                .unwrap_or(UNTITLED)
                .to_string(),
            directors: binding_value(binding, "directorLabel")
                .map(|d| vec![d.to_string()])
                .unwrap_or_default(),
            actors: binding_value(binding, "actors")
                .map(|joined| {
                    joined
                        .split(", ")
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            poster: binding_value(binding, "poster").map(String::from),
        })
        .collect())
}

fn parse_directed_films(body: &str) -> Result<Vec<DirectedFilm>> {
    let response: SparqlResponse = serde_json::from_str(body)?;

    // One raw row per (film, actor); deduplicate by film entity, merging
    // cast lists and keeping first-seen order.
    let mut order: Vec<String> = Vec::new();
    let mut films: HashMap<String, DirectedFilm> = HashMap::new();
    for binding in &response.results.bindings {
        let Some(film_iri) = binding_value(binding, "film") else {
            continue;
        };
        let entry = films.entry(film_iri.to_string()).or_insert_with(|| {
            order.push(film_iri.to_string());
            DirectedFilm {
                title: binding_value(binding, "filmLabel")
                    .unwrap_or(UNTITLED)
                    .to_string(),
                actors: Vec::new(),
            }
        });
        if let Some(actor) = binding_value(binding, "actorLabel") {
            if !entry.actors.iter().any(|a| a == actor) {
                entry.actors.push(actor.to_string());
            }
        }
    }

    Ok(order
        .into_iter()
        .filter_map(|iri| films.remove(&iri))
        .collect())
}

fn parse_cast(body: &str) -> Result<Vec<String>> {
    let response: SparqlResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .bindings
        .iter()
        .filter_map(|binding| binding_value(binding, "actorLabel"))
        .map(String::from)
        .collect())
}

#[derive(Debug, Deserialize)]
struct EntitySearchResponse {
    #[serde(default)]
    search: Vec<EntityHit>,
}

#[derive(Debug, Deserialize)]
struct EntityHit {
    id: String,
}

fn first_entity_id(body: &str) -> Result<Option<String>> {
    let response: EntitySearchResponse = serde_json::from_str(body)?;
    Ok(response.search.into_iter().next().map(|hit| qid_from_iri(&hit.id)))
}
