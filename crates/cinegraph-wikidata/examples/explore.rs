//! Explore a film graph from the command line.
//!
//! Searches Wikidata for the given title fragment (default "matrix"),
//! seeds a graph from the first hit, expands its first director, and
//! prints the resulting snapshot as JSON.
//!
//! ```sh
//! cargo run --example explore -- "blade runner"
//! ```

use std::sync::Arc;

use cinegraph::orchestrator::Explorer;
use cinegraph::schema::director_key;
use cinegraph_wikidata::WikidataClient;

#[tokio::main]
async fn main() -> cinegraph::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let term = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "matrix".to_string());

    let explorer = Explorer::new(Arc::new(WikidataClient::new()));

    let candidates = explorer.search(&term).await?;
    let Some(film) = candidates.first() else {
        println!("no films found for '{term}'");
        return Ok(());
    };

    println!("seeding graph from '{}'", film.title);
    explorer.seed(Some(film));

    if let Some(director) = film.directors.first() {
        let outcome = explorer.handle_click(&director_key(director)).await?;
        println!("expanding director '{director}': {outcome:?}");
    }

    let snapshot = explorer.snapshot();
    println!(
        "{} nodes, {} edges:\n{}",
        snapshot.node_count(),
        snapshot.edge_count(),
        snapshot.to_json()?
    );
    Ok(())
}
