use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use factlens_common::{Article, Config};
use factlens_pipeline::agents::search::DEFAULT_MAX_RESULTS;
use factlens_pipeline::{ArticleStore, Pipeline};

#[derive(Parser)]
#[command(name = "factlens")]
#[command(about = "Search, scrape, fact-check and classify news on a topic")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a topic end to end
    Run {
        topic: String,

        /// Number of search results to process (1-20)
        #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
        max_results: usize,
    },

    /// List recently analyzed articles
    Articles {
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },

    /// List recent analysis runs
    Sessions {
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },

    /// Find stored articles whose url, title or summary mention a term
    Search { term: String },

    /// Show database totals
    Stats,

    /// Show which services are configured
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("factlens=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Status => print_status(&config),
        Commands::Run { topic, max_results } => {
            let store = open_store(&config).await?;
            config.log_redacted();
            for warning in config.warnings() {
                warn!("{warning}");
            }
            info!(topic = topic.as_str(), "FactLens starting");

            let pipeline = Pipeline::from_config(&config, store);
            let report = pipeline.run(&topic, max_results).await;
            println!("{report}");
        }
        Commands::Articles { limit } => {
            let store = open_store(&config).await?;
            print_articles(&store.recent_articles(limit).await?);
        }
        Commands::Sessions { limit } => {
            let store = open_store(&config).await?;
            let sessions = store.analysis_sessions(limit).await?;
            if sessions.is_empty() {
                println!("No analysis runs yet.");
            }
            for s in sessions {
                println!(
                    "#{:<4} {}  {:<40} found {:>2}  fact {:>2}  myth {:>2}  unclear {:>2}",
                    s.id.unwrap_or_default(),
                    s.created_at.format("%Y-%m-%d %H:%M"),
                    s.topic,
                    s.articles_found,
                    s.facts_count,
                    s.myths_count,
                    s.unclear_count
                );
            }
        }
        Commands::Search { term } => {
            let store = open_store(&config).await?;
            print_articles(&store.articles_by_topic(&term).await?);
        }
        Commands::Stats => {
            let store = open_store(&config).await?;
            println!("{}", store.database_stats().await?);
        }
    }

    Ok(())
}

async fn open_store(config: &Config) -> Result<ArticleStore> {
    let store = ArticleStore::connect(&config.database_url).await?;
    store.migrate().await?;
    Ok(store)
}

fn print_articles(articles: &[Article]) {
    if articles.is_empty() {
        println!("No articles found.");
        return;
    }
    for article in articles {
        println!(
            "[{}] {} ({}, {})",
            article.overall_fact_status, article.title, article.classification, article.confidence
        );
        println!("    {}", article.url);
        if !article.summary.is_empty() {
            println!("    {}", article.summary.lines().next().unwrap_or_default());
        }
    }
}

fn print_status(config: &Config) {
    let mark = |set: bool| if set { "configured" } else { "missing" };

    println!("Web search (Serper):     {}", mark(config.serper_api_key.is_some()));
    println!("Gemini:                  {}", mark(config.google_api_key.is_some()));
    println!("  model:                 {}", config.gemini_model);
    println!("Fact Check API:          {}", mark(config.fact_check_api_key.is_some()));
    println!("Notion token:            {}", mark(config.notion_token.is_some()));
    println!(
        "Notion publishing:       {}",
        if config.notion_enabled() { "enabled" } else { "disabled" }
    );
    println!("Database:                {}", config.database_url);
    println!("Stage files:             {}", config.temp_dir.display());

    let warnings = config.warnings();
    if !warnings.is_empty() {
        println!();
        for warning in warnings {
            println!("warning: {warning}");
        }
    }
}
