//! ripple-api server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the JSON API over HTTP.
//!
//! # User provisioning
//!
//! Registration lives outside this service. To provision a user and print
//! the API token it should authenticate with:
//!
//! ```text
//! cargo run -p ripple-api --bin server -- --create-user worace
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use ripple_api::{AppState, ServerConfig, Urls};
use ripple_core::{store::FeedStore as _, user::NewUser};
use ripple_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Ripple feed API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create a user with this display name, print their id and API token,
  /// and exit.
  #[arg(long, value_name = "NAME")]
  create_user: Option<String>,

  /// Mark the created user's feed as private (with --create-user).
  #[arg(long)]
  private: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("RIPPLE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: provision a user and exit.
  if let Some(name) = cli.create_user {
    let user = store
      .add_user(NewUser {
        display_name: name,
        private:      cli.private,
      })
      .await
      .context("failed to create user")?;
    println!("user_id: {}", user.user_id);
    println!("token:   {}", user.token);
    return Ok(());
  }

  // Build application state.
  let state = AppState {
    store: Arc::new(store),
    urls:  Arc::new(Urls::new(&server_cfg.base_url)),
  };

  let app = ripple_api::router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
