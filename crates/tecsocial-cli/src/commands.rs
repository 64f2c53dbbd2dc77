//! Command execution on top of `SessionClient`.

use std::io::{self, Write};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use tecsocial_core::models::{FeedPost, Post, User};
use tecsocial_core::{ApiError, Config, ProgressState, SessionClient};

use crate::validate;
use crate::Command;

/// Posts shown under a profile
const PROFILE_POSTS_LIMIT: u32 = 5;

/// Print "Attempt N of M" lines as the wake-up loop reports them.
fn progress_printer() -> (mpsc::UnboundedSender<ProgressState>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressState>();
    let handle = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            eprintln!("  Waking server... {}", progress.display());
        }
    });
    (tx, handle)
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Turn client errors into the message a user should see.
fn user_message(err: &ApiError) -> String {
    match err {
        ApiError::ServerUnavailable { .. } => {
            "The server did not wake up in time. Try again in a minute.".to_string()
        }
        ApiError::InvalidCredentials(msg) | ApiError::ValidationError(msg) => msg.clone(),
        ApiError::Unauthenticated => "Not logged in. Run `tecsocial login`.".to_string(),
        ApiError::NetworkError(_) => {
            "Unable to connect to server. Check your internet connection.".to_string()
        }
        other => other.to_string(),
    }
}

fn print_posts(posts: Vec<Post>, me: Option<&User>) {
    if posts.is_empty() {
        println!("No posts yet.");
        return;
    }
    for view in FeedPost::from_posts(posts, me) {
        let heart = if view.is_liked { "♥" } else { "♡" };
        let author = view.post.username.as_deref().unwrap_or("unknown");
        println!(
            "#{} @{}  {} {}",
            view.post.id,
            author,
            heart,
            view.like_count()
        );
        println!("    {}", view.post.content);
        if let Some(ref image) = view.post.image {
            println!("    [image] {}", image);
        }
        if let Some(ref at) = view.post.created_at {
            println!("    {}", at);
        }
    }
}

pub async fn run(client: &SessionClient, config: &mut Config, command: Command) -> Result<()> {
    let result = dispatch(client, config, command).await;
    if let Err(ref e) = result {
        if let Some(api) = e.downcast_ref::<ApiError>() {
            warn!(error = %api, "Command failed");
            anyhow::bail!(user_message(api));
        }
    }
    result
}

async fn dispatch(client: &SessionClient, config: &mut Config, command: Command) -> Result<()> {
    match command {
        Command::Status => {
            if client.check_server_status().await {
                println!("Server is awake.");
            } else {
                println!("Server is not answering yet.");
            }
        }
        Command::Wake => {
            let (tx, printer) = progress_printer();
            let result = client.wait_for_server(&tx).await;
            drop(tx);
            let _ = printer.await;
            let attempts = result?;
            println!("Server is awake after {} attempt(s).", attempts);
        }
        Command::Login { email } => {
            let email = match email.or_else(|| config.last_email.clone()) {
                Some(e) => e,
                None => prompt("Email")?,
            };
            let password = rpassword::prompt_password("Password: ")?;
            validate::login_fields(&email, &password)?;

            let (tx, printer) = progress_printer();
            let result = client.login(&email, &password, &tx).await;
            drop(tx);
            let _ = printer.await;
            let session = result?;

            if let Err(e) = config.remember_email(&email) {
                warn!(error = %e, "Failed to save config");
            }
            println!("Welcome back, @{}!", session.user.username);
        }
        Command::Signup { username, email } => {
            let password = rpassword::prompt_password("Password (min 8 characters): ")?;
            validate::signup_fields(&username, &email, &password)?;

            let (tx, printer) = progress_printer();
            let result = client.sign_up(&username, &email, &password, &tx).await;
            drop(tx);
            let _ = printer.await;
            let session = result?;
            println!("Account created. Logged in as @{}.", session.user.username);
        }
        Command::Logout => {
            client.logout()?;
            println!("Logged out.");
        }
        Command::Whoami => match client.current_session() {
            Some(session) => {
                let user = &session.user;
                println!("@{} (id {})", user.username, user.id);
                if let Some(ref email) = user.email {
                    println!("{}", email);
                }
                println!("Logged in {} min ago.", session.age_minutes());
            }
            None => println!("Not logged in."),
        },
        Command::Posts { page, limit } => {
            let posts = client.recent_posts(page, limit).await?;
            print_posts(posts, client.get_user_data().as_ref());
        }
        Command::Feed { page, limit } => {
            let posts = client.followed_posts(page, limit).await?;
            print_posts(posts, client.get_user_data().as_ref());
        }
        Command::Post { content, image } => {
            let created = client.create_post(&content, image.as_deref()).await?;
            match created.get("id") {
                Some(id) => println!("Posted #{}.", id),
                None => println!("Posted."),
            }
        }
        Command::Edit { id, content, image } => {
            client.edit_post(&id, &content, image.as_deref()).await?;
            println!("Post #{} updated.", id);
        }
        Command::Delete { id } => {
            client.delete_post(&id).await?;
            println!("Post #{} deleted.", id);
        }
        Command::Like { id } => {
            client.like_post(&id).await?;
            println!("Liked #{}.", id);
        }
        Command::Unlike { id } => {
            client.unlike_post(&id).await?;
            println!("Unliked #{}.", id);
        }
        Command::Profile { id } => {
            let (profile, posts) = futures::try_join!(
                client.user_profile(&id),
                client.user_posts(&id, 1, PROFILE_POSTS_LIMIT),
            )
            .context("Failed to load profile")?;
            let relation = if profile.is_following { "following" } else { "not following" };
            println!("@{} (id {}) - {}", profile.username, profile.id, relation);
            print_posts(posts, client.get_user_data().as_ref());
        }
        Command::UserPosts { id, page, limit } => {
            let posts = client.user_posts(&id, page, limit).await?;
            print_posts(posts, client.get_user_data().as_ref());
        }
        Command::Follow { id } => {
            client.follow_user(&id).await?;
            println!("Following user {}.", id);
        }
        Command::Unfollow { id } => {
            client.unfollow_user(&id).await?;
            println!("No longer following user {}.", id);
        }
    }
    Ok(())
}
