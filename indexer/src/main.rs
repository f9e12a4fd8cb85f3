use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use triage_core::{
    AnalyzerConfig, FileStore, IndexBuilder, IndexStore, Retriever, SledStore, VectorizerConfig, DEFAULT_INDEX_PATH,
    DEFAULT_TOP_K,
};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query the TF-IDF description index", long_about = None)]
struct Cli {
    /// Index location (file path, or database directory for the sled backend)
    #[arg(long, global = true, default_value = DEFAULT_INDEX_PATH)]
    index: String,
    /// Storage backend holding the index
    #[arg(long, global = true, value_enum, default_value_t = Backend::File)]
    backend: Backend,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    File,
    Sled,
}

#[derive(Args)]
struct ModelArgs {
    /// Use IDF = ln(N/df) + 1 instead of the smoothed ln((1+N)/(1+df)) + 1
    #[arg(long, default_value_t = false)]
    no_smooth_idf: bool,
    /// Use tf = 1 + ln(count) instead of raw counts
    #[arg(long, default_value_t = false)]
    sublinear_tf: bool,
    /// Drop English stopwords
    #[arg(long, default_value_t = false)]
    stop_words: bool,
    /// Stem terms (English)
    #[arg(long, default_value_t = false)]
    stem: bool,
    /// NFKC-normalize text before tokenizing
    #[arg(long, default_value_t = false)]
    nfkc: bool,
}

impl ModelArgs {
    fn config(&self) -> VectorizerConfig {
        VectorizerConfig {
            analyzer: AnalyzerConfig { nfkc: self.nfkc, stop_words: self.stop_words, stem: self.stem },
            smooth_idf: !self.no_smooth_idf,
            sublinear_tf: self.sublinear_tf,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a CSV file with a Description column, replacing any previous index
    Build {
        /// Input CSV path
        #[arg(long)]
        input: String,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Print the descriptions most similar to a summary
    Query {
        /// Summary text to match
        #[arg(long)]
        summary: String,
        /// Number of records to return
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        k: usize,
        /// Print scores and rows as JSON lines
        #[arg(long, default_value_t = false)]
        scores: bool,
    },
    /// Print index metadata as JSON
    Inspect,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let store = open_store(cli.backend, &cli.index)?;

    match cli.command {
        Commands::Build { input, model } => {
            let meta = IndexBuilder::new(model.config()).build(&input, store.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&meta)?);
        }
        Commands::Query { summary, k, scores } => {
            let retriever = Retriever::load(store.as_ref())?;
            for hit in retriever.query_scored(&summary, k) {
                if scores {
                    println!("{}", serde_json::to_string(&hit)?);
                } else {
                    println!("{}", hit.description);
                }
            }
        }
        Commands::Inspect => {
            let retriever = Retriever::load(store.as_ref())?;
            println!("{}", serde_json::to_string_pretty(retriever.meta())?);
        }
    }
    Ok(())
}

fn open_store(backend: Backend, index: &str) -> Result<Box<dyn IndexStore>> {
    let store: Box<dyn IndexStore> = match backend {
        Backend::File => Box::new(FileStore::new(index)),
        Backend::Sled => Box::new(SledStore::open(index)?),
    };
    tracing::debug!(location = %store.location(), "using index store");
    Ok(store)
}
