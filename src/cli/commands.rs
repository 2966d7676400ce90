use crate::application::build_index::DEFAULT_BATCH_SIZE;
use crate::application::retrieval::{DEFAULT_FINDNAME_FIELD, DEFAULT_FINDNAME_K};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "galindex", about = "Vector lookup service for visual-novel metadata")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed a JSONL file into a collection and save it
    Build {
        /// Collection (intro, findname)
        collection: String,
        /// JSONL input, one {"text", "metadata", "id"} object per line
        input: PathBuf,
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
    /// Best intro document for a title
    Intro {
        name: String,
    },
    /// Titles whose chunks match the query
    Findname {
        name: String,
        #[arg(long, default_value_t = DEFAULT_FINDNAME_K)]
        k: usize,
        /// Metadata field to return for each hit
        #[arg(long, default_value = DEFAULT_FINDNAME_FIELD)]
        field: String,
    },
    /// Raw top-k search with scores
    Query {
        /// Collection (intro, findname)
        collection: String,
        text: String,
        #[arg(long, default_value = "4")]
        k: usize,
    },
    /// Show the header of saved collections
    Info {
        /// Collection (intro, findname); all collections when omitted
        collection: Option<String>,
    },
}
