//! CLI entry point for dynablog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dynablog::config::BlogConfig;
use dynablog::Blog;

#[derive(Parser)]
#[command(name = "dynablog")]
#[command(version)]
#[command(about = "A small personal blog served from a DynamoDB table", long_about = None)]
struct Cli {
    /// YAML configuration file (TITLE, INTRO and BLOGTABLE env vars override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Serve from an empty in-memory store instead of DynamoDB
        #[arg(long)]
        memory: bool,
    },

    /// Publish a markdown file as a new post
    New {
        /// Markdown file with optional YAML front-matter
        file: PathBuf,

        /// Post id (defaults to the front-matter id, then the slugified title)
        #[arg(long)]
        id: Option<String>,
    },

    /// List stored posts
    List,

    /// Create the posts table if it does not exist
    Init,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "dynablog=debug,tower_http=debug,info"
    } else {
        "dynablog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &cli.config {
        Some(path) => BlogConfig::load(path)?,
        None => BlogConfig::default(),
    };
    config.apply_env()?;

    match cli.command {
        Commands::Serve { port, ip, memory } => {
            let blog = if memory {
                tracing::warn!("Serving from an in-memory store; posts are not persisted");
                Blog::in_memory(config)
            } else {
                Blog::connect(config).await?
            };

            tracing::info!("Starting server at http://{}:{}", ip, port);
            blog.serve(&ip, port).await?;
        }

        Commands::New { file, id } => {
            let blog = Blog::connect(config).await?;
            tracing::info!("Publishing {:?}", file);
            dynablog::commands::new::create_post(blog.store.as_ref(), &file, id.as_deref())
                .await?;
        }

        Commands::List => {
            let blog = Blog::connect(config).await?;
            dynablog::commands::list::run(blog.store.as_ref()).await?;
        }

        Commands::Init => {
            let store = dynablog::store::DynamoDbPostStore::from_blog_config(&config).await;
            tracing::info!("Ensuring table {}", store.table_name());
            dynablog::commands::init::run(&store).await?;
        }

        Commands::Version => {
            println!("dynablog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
