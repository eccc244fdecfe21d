use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crocus::embedding::{HashingSparseEmbedder, HashingTextEmbedder, TextEmbedder};
use crocus::pipeline::{ReviewIndexConfig, ReviewIndexer, ReviewSearcher};
use crocus::store::{ConflictPolicy, open_store};

/// Crocus - review similarity search server
#[derive(Parser)]
#[command(name = "crocus-server", version, about)]
struct Args {
    /// CSV file with comment, rating and product_id columns.
    pub csv: PathBuf,

    /// Address to listen on.
    #[arg(long, env = "CROCUS_LISTEN", default_value = "0.0.0.0:8000")]
    pub listen: String,

    /// Store URI: `mem:` for a volatile store, or a directory path.
    #[arg(long, env = "CROCUS_STORE", default_value = "mem:")]
    pub store: String,

    /// Collection name.
    #[arg(long, default_value = "search_by_reviews")]
    pub collection: String,

    /// Index a sparse vector field alongside the dense one and fuse results
    /// at query time.
    #[arg(long)]
    pub hybrid: bool,

    /// Dimension of the built-in hashing embedder.
    #[arg(long, default_value_t = 256)]
    pub dimension: usize,

    /// Append to an existing compatible collection instead of dropping and
    /// recreating it.
    #[arg(long)]
    pub append: bool,

    /// Hugging Face model id to embed with instead of the hashing embedder.
    #[cfg(feature = "embeddings-candle")]
    #[arg(long, env = "CROCUS_MODEL")]
    pub model: Option<String>,
}

#[cfg(feature = "embeddings-candle")]
fn dense_embedder(args: &Args) -> Result<Arc<dyn TextEmbedder>> {
    match &args.model {
        Some(model) => Ok(Arc::new(crocus::embedding::CandleTextEmbedder::new(model)?)),
        None => Ok(Arc::new(HashingTextEmbedder::with_dimension(args.dimension))),
    }
}

#[cfg(not(feature = "embeddings-candle"))]
fn dense_embedder(args: &Args) -> Result<Arc<dyn TextEmbedder>> {
    Ok(Arc::new(HashingTextEmbedder::with_dimension(args.dimension)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = open_store(&args.store)?;
    let embedder = dense_embedder(&args)?;

    let mut config = ReviewIndexConfig::new(&args.collection).hybrid(args.hybrid);
    if !args.append {
        // Reruns rebuild the collection from the CSV instead of piling up
        // duplicate rows.
        config = config.conflict_policy(ConflictPolicy::DropAndRecreate);
    }

    let mut indexer = ReviewIndexer::new(store.clone(), embedder.clone(), config.clone());
    let mut searcher = ReviewSearcher::new(store, embedder, config);
    if args.hybrid {
        let sparse = Arc::new(HashingSparseEmbedder::new());
        indexer = indexer.with_sparse_embedder(sparse.clone());
        searcher = searcher.with_sparse_embedder(sparse);
    }

    let stats = indexer.ingest_csv(&args.csv).await?;
    tracing::info!(
        "indexed {} reviews from {} ({} entities)",
        stats.inserted,
        args.csv.display(),
        stats.total_entities
    );

    crocus::http::serve(&args.listen, Arc::new(searcher)).await?;
    Ok(())
}
