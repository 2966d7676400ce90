use clap::Parser;
use galindex::cli::commands::{Cli, Commands};
use galindex::config::Config;
use galindex::domain::error::DomainError;
use galindex::domain::values::collection::Collection;
use galindex::infrastructure::ingestion::jsonl::JsonlDocumentSource;
use galindex::GalIndex;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let gi = match Config::from_env().and_then(|config| GalIndex::new(&config)) {
        Ok(gi) => gi,
        Err(e) => {
            eprintln!("Error initializing galindex: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(gi, cli.command).await {
        eprintln!("Error: {e}");
        let client_error = e
            .downcast_ref::<DomainError>()
            .map(DomainError::is_client_error)
            .unwrap_or(false);
        std::process::exit(if client_error { 2 } else { 1 });
    }
}

async fn run_command(gi: GalIndex, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Build {
            collection,
            input,
            batch_size,
        } => {
            let collection = parse_collection(&collection)?;
            let source = JsonlDocumentSource::new(input);
            let report = gi.build(collection, &source, batch_size).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Intro { name } => {
            let body = match gi.lookup_single(&name).await? {
                Some(hit) => json!({
                    "name": hit.name,
                    "title": hit.title,
                    "content": hit.content,
                    "score": hit.score,
                    "message": "Success",
                }),
                None => json!({ "message": "No results found." }),
            };
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Commands::Findname { name, k, field } => {
            let ans = gi.lookup_many(&name, k, &field).await?;
            println!("{}", serde_json::to_string_pretty(&json!({ "ans": ans }))?);
        }
        Commands::Query { collection, text, k } => {
            let collection = parse_collection(&collection)?;
            let results = gi.query(collection, &text, k).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Info { collection: Some(collection) } => {
            let collection = parse_collection(&collection)?;
            let info = gi.info(collection)?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Info { collection: None } => {
            let mut all = serde_json::Map::new();
            for collection in Collection::ALL {
                let value = match gi.info(collection) {
                    Ok(info) => serde_json::to_value(&info)?,
                    Err(DomainError::NotFound(_)) => serde_json::Value::Null,
                    Err(e) => return Err(e.into()),
                };
                all.insert(collection.to_string(), value);
            }
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
    }
    Ok(())
}

fn parse_collection(s: &str) -> Result<Collection, DomainError> {
    s.parse().map_err(DomainError::InvalidInput)
}
