//! tecsocial - command line client for the tec social network.
//!
//! Logs in against a backend that may be asleep, then reads and writes
//! posts, likes and follows through the core `SessionClient`.

mod commands;
mod validate;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tecsocial_core::api::posts::{FOLLOWED_POSTS_LIMIT, RECENT_POSTS_LIMIT, USER_POSTS_LIMIT};
use tecsocial_core::models::Id;
use tecsocial_core::{Config, FileSessionStore, KeyringSessionStore, SessionClient, SessionStore};

/// Directory for a rolling log file, in addition to stderr
const LOG_DIR_ENV: &str = "TECSOCIAL_LOG_DIR";

#[derive(Parser)]
#[command(name = "tecsocial", version, about = "Command line client for the tec social network")]
struct Cli {
    /// Keep the session in the OS keychain instead of the cache directory
    #[arg(long, global = true)]
    keychain: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Probe the server once
    Status,
    /// Keep probing until the server is awake
    Wake,
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Recent posts from everyone
    Posts {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = RECENT_POSTS_LIMIT)]
        limit: u32,
    },
    /// Posts from users you follow
    Feed {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = FOLLOWED_POSTS_LIMIT)]
        limit: u32,
    },
    /// Publish a post
    Post {
        content: String,
        #[arg(long)]
        image: Option<String>,
    },
    /// Replace a post's content
    Edit {
        id: Id,
        content: String,
        #[arg(long)]
        image: Option<String>,
    },
    Delete {
        id: Id,
    },
    Like {
        id: Id,
    },
    Unlike {
        id: Id,
    },
    /// Show a user's profile and latest posts
    Profile {
        id: Id,
    },
    /// List a user's posts
    UserPosts {
        id: Id,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = USER_POSTS_LIMIT)]
        limit: u32,
    },
    Follow {
        id: Id,
    },
    Unfollow {
        id: Id,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tecsocial.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing();

    let mut config = Config::load()?;
    let store: Arc<dyn SessionStore> = if cli.keychain {
        Arc::new(KeyringSessionStore::default())
    } else {
        Arc::new(FileSessionStore::new(config.cache_dir()?))
    };
    let client = SessionClient::new(config.clone(), store)?;
    info!(base_url = %config.base_url, "tecsocial starting");

    commands::run(&client, &mut config, cli.command).await
}
