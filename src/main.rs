use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ideastruct::api::{self, AppState};
use ideastruct::blueprint::blueprint_file_name;
use ideastruct::config::AppConfig;
use ideastruct::db::Database;
use ideastruct::generation::ProviderChain;
use ideastruct::models::{CreateUserInput, GenerationRequest, Platform};
use ideastruct::pipeline::BlueprintService;

#[derive(Parser)]
#[command(name = "ideastruct")]
#[command(about = "Turn app ideas into technical blueprints")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Generate a blueprint once and print or write it
    Generate {
        /// Description of the app idea
        #[arg(short, long)]
        idea: String,

        /// Target platform: web, mobile or both
        #[arg(long, default_value = "web")]
        platform: String,

        /// Who the app is for
        #[arg(short, long)]
        audience: Option<String>,

        /// Comma- or newline-separated feature list
        #[arg(short, long)]
        features: Option<String>,

        /// Write to this file, or a file named after the idea when given a directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a user and print their API token
    Add {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: Option<String>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "ideastruct=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_database(config: &AppConfig) -> anyhow::Result<Database> {
    let db = match &config.db_path {
        Some(path) => Database::open(path.clone())?,
        None => Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

fn blueprint_service(config: &AppConfig) -> BlueprintService {
    let chain = ProviderChain::from_config(&config.generation, None);
    tracing::info!("Generation providers: {:?}", chain.provider_names());
    BlueprintService::new(chain)
}

async fn serve(config: &AppConfig, host: &str, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting IdeaStruct server on port {}", port);

    let db = open_database(config)?;
    let state = AppState::new(db, blueprint_service(config));
    let app = api::create_router(state, &config.security);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("IdeaStruct server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::from_env();

    match cli.command {
        Some(Commands::Serve { host, port }) => serve(&config, &host, port).await?,
        Some(Commands::Generate {
            idea,
            platform,
            audience,
            features,
            output,
        }) => {
            let platform = Platform::from_str(&platform)
                .with_context(|| format!("Unknown platform '{}'", platform))?;
            let request = GenerationRequest::new(idea, platform, audience, features)?;

            let result = blueprint_service(&config).generate(&request).await;
            tracing::info!("Blueprint source: {}", result.source_kind.as_str());

            match output {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(blueprint_file_name(request.idea_description()))
                    } else {
                        path
                    };
                    std::fs::write(&path, &result.content)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Blueprint written to {}", path.display());
                }
                None => println!("{}", result.content),
            }
        }
        Some(Commands::User {
            command: UserCommands::Add { email, name },
        }) => {
            let db = open_database(&config)?;
            let created = db.create_user(CreateUserInput { email, name })?;
            println!("Created user {} ({})", created.user.email, created.user.id);
            println!("API token: {}", created.api_token);
        }
        None => serve(&config, "127.0.0.1", 3000).await?,
    }

    Ok(())
}
