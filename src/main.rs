use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use snapsearch::api::{ApiState, create_router};
use snapsearch::app::{App, AppOptions};
use snapsearch::client::{HttpSearchClient, SearchBackend};
use snapsearch::config::{CONFIG, Config};
use snapsearch::data_models::SearchResult;
use snapsearch::render;
use snapsearch::trigger::TriggerPhase;

#[derive(Parser)]
#[command(name = "snapsearch", about = "Debounced image search front end")]
struct Cli {
    /// Search endpoint, queried as `<endpoint>?query=...`
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Prefix for results that only carry a file name
    #[arg(long, global = true)]
    view_base_url: Option<String>,

    /// Quiet period before a query is sent
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single query and print the results
    Search {
        query: String,
        /// Print the rendered thumbnail links instead of plain lines
        #[arg(long)]
        html: bool,
    },
    /// Treat every stdin line as the new contents of the search box
    Watch,
    /// Serve the search page over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = (*CONFIG).clone();
        if let Some(endpoint) = &self.endpoint {
            config.search_endpoint = endpoint.clone();
        }
        if let Some(view_base_url) = &self.view_base_url {
            config.view_base_url = view_base_url.clone();
        }
        if let Some(ms) = self.delay_ms {
            config.debounce = Duration::from_millis(ms);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The fmt subscriber also picks up `log` records from the library.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    let client = HttpSearchClient::new(
        config.search_endpoint.clone(),
        config.view_base_url.clone(),
        config.request_timeout,
    )
    .context("Failed to build HTTP client")?;

    match cli.command {
        Command::Search { query, html } => search_once(client, &query, html).await,
        Command::Watch => watch(client, &config).await,
        Command::Serve { addr } => serve(client, &config, addr).await,
    }
}

async fn search_once(client: HttpSearchClient, query: &str, html: bool) -> anyhow::Result<()> {
    let results = client
        .search(query, &CancellationToken::new())
        .await
        .with_context(|| format!("Search for {query:?} against {} failed", client.endpoint()))?;

    if html {
        println!("{}", render::render_results(&results)?);
    } else {
        print_results(&results);
    }
    Ok(())
}

async fn watch(client: HttpSearchClient, config: &Config) -> anyhow::Result<()> {
    let mut app = App::new(client, AppOptions::from(config));

    let mut rx = app.subscribe();
    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            match snapshot.phase {
                TriggerPhase::InFlight => eprintln!("{}", render::SEARCHING_INDICATOR),
                TriggerPhase::Idle => print_results(&snapshot.results),
                TriggerPhase::Armed => {}
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        app.input(line);
    }

    // Let the last query settle before exiting.
    let mut settled = app.subscribe();
    settled
        .wait_for(|s| s.phase == TriggerPhase::Idle)
        .await
        .context("Search state closed before settling")?;

    drop(app);
    printer.await?;
    Ok(())
}

async fn serve(client: HttpSearchClient, config: &Config, addr: SocketAddr) -> anyhow::Result<()> {
    let state = Arc::new(ApiState {
        backend: client,
        placeholder: config.placeholder.clone(),
        initial_query: config.initial_query.clone(),
    });
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    log::info!("serving search page on http://{addr}");
    axum::serve(listener, router).await?;
    Ok(())
}

fn print_results(results: &[SearchResult]) {
    for r in results {
        match &r.content {
            Some(content) => println!("{}\t{}", r.image_url, content),
            None => println!("{}", r.image_url),
        }
    }
}
