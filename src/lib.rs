pub mod clients;
pub mod config;
pub mod events;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

pub use config::Config;
pub use state::SharedState;

use anyhow::Context;
use clients::SearchMode;
use clients::search::SearchRequest;
use events::AppEvent;
use models::{FeedFilter, group_by_category};
use services::SuggestMode;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "login" => {
            if args.len() < 3 {
                println!("Usage: ladle login <email>");
                return Ok(());
            }
            cmd_login(config, &args[2]).await
        }

        "logout" => cmd_logout(config).await,

        "search" | "s" => {
            if args.len() < 3 {
                println!("Usage: ladle search <query> [--mode smart|vector|ingredients|hybrid]");
                return Ok(());
            }
            let mode = args
                .iter()
                .position(|a| a == "--mode")
                .and_then(|i| args.get(i + 1))
                .map_or(Ok(SearchMode::Smart), |m| {
                    m.parse().map_err(|e: String| anyhow::anyhow!(e))
                })?;
            let query: Vec<&String> = args[2..]
                .iter()
                .take_while(|a| *a != "--mode")
                .collect();
            let query = query
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            cmd_search(config, &query, mode).await
        }

        "suggest" => {
            if args.len() < 3 {
                println!("Usage: ladle suggest <prefix> [--ingredients]");
                return Ok(());
            }
            let ingredients = args.iter().any(|a| a == "--ingredients");
            cmd_suggest(config, &args[2], ingredients).await
        }

        "saved" => {
            if args.len() < 3 {
                println!("Usage: ladle saved <subcommand>");
                println!("Subcommands: list, toggle <recipe_id>");
                return Ok(());
            }
            match args[2].as_str() {
                "list" | "ls" => cmd_saved_list(config).await,
                "toggle" | "t" => {
                    if args.len() < 4 {
                        println!("Usage: ladle saved toggle <recipe_id>");
                        return Ok(());
                    }
                    cmd_saved_toggle(config, &args[3]).await
                }
                _ => {
                    println!("Unknown saved subcommand: {}", args[2]);
                    println!("Use: list, toggle");
                    Ok(())
                }
            }
        }

        "notifications" | "n" => match args.get(2).map(String::as_str) {
            Some("read") => {
                if args.len() < 4 {
                    println!("Usage: ladle notifications read <id>");
                    return Ok(());
                }
                cmd_notifications_read(config, &args[3]).await
            }
            Some("read-all") => cmd_notifications_read_all(config).await,
            Some("delete") => {
                if args.len() < 4 {
                    println!("Usage: ladle notifications delete <id>");
                    return Ok(());
                }
                cmd_notifications_delete(config, &args[3]).await
            }
            Some("clear") => cmd_notifications_clear(config).await,
            _ => {
                let unread = args.iter().any(|a| a == "--unread");
                let page = args
                    .iter()
                    .position(|a| a == "--page")
                    .and_then(|i| args.get(i + 1))
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(1);
                cmd_notifications_list(config, page, unread).await
            }
        },

        "daemon" | "-d" | "--daemon" => cmd_daemon(config).await,

        "init" | "--init" => {
            let path = Config::create_default_if_missing()?;
            println!("✓ Config ready at {}. Set api.base_url and api.api_key.", path.display());
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Ladle - recipe platform client");
    println!();
    println!("USAGE:");
    println!("  ladle <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  login <email>          Sign in (password read from stdin)");
    println!("  logout                 Sign out and forget the cached session");
    println!("  search <query>         Search recipes (--mode smart|vector|ingredients|hybrid)");
    println!("  suggest <prefix>       Autocomplete suggestions (--ingredients lowers the threshold)");
    println!("  saved list             List saved recipe ids");
    println!("  saved toggle <id>      Save/unsave a recipe");
    println!("  notifications          Show the feed (--unread, --page N)");
    println!("  notifications read <id>      Mark one notification read");
    println!("  notifications read-all       Mark everything read");
    println!("  notifications delete <id>    Delete one notification");
    println!("  notifications clear          Delete everything");
    println!("  daemon                 Run the unread poll + push listener");
    println!("  init                   Create a default config file");
    println!("  help                   Show this help message");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml (see 'ladle init'), or set LADLE_API_URL / LADLE_API_KEY.");
}

fn read_line(prompt: &str) -> anyhow::Result<String> {
    use std::io::Write;
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    let input = read_line(prompt)?;
    Ok(input.eq_ignore_ascii_case("y"))
}

async fn cmd_login(config: Config, email: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config)?;
    let password = read_line("Password: ")?;

    match state.session.login(email, &password).await {
        Ok(user) => {
            println!("✓ Signed in as {}", user.email);
            state.saved.load(&user.id).await;
            println!("  {} saved recipes synced", state.saved.ids().await.len());
        }
        Err(e) => println!("Login failed: {e}"),
    }
    Ok(())
}

async fn cmd_logout(config: Config) -> anyhow::Result<()> {
    let state = SharedState::new(config)?;
    state.session.logout().await;
    println!("✓ Signed out");
    Ok(())
}

async fn cmd_search(config: Config, query: &str, mode: SearchMode) -> anyhow::Result<()> {
    let state = SharedState::new(config)?;

    if !state.search.is_available() {
        println!("Search is not configured. Set api.base_url and api.api_key.");
        return Ok(());
    }

    let limit = state.config.search.result_limit;
    let request = if mode == SearchMode::Ingredients {
        SearchRequest::ingredients(
            query.split(',').map(|s| s.trim().to_string()).collect(),
            limit,
        )
    } else {
        SearchRequest::query(query, limit)
    };

    let response = state
        .search
        .search(mode, &request)
        .await
        .context("Search request failed")?;

    if response.data.is_empty() {
        println!("No recipes found for '{query}'");
        return Ok(());
    }

    println!("Results ({} of {} total)", response.data.len(), response.total);
    println!("{:-<60}", "");
    for recipe in &response.data {
        let category = recipe.category.as_deref().unwrap_or("Uncategorized");
        println!("• {} [{}]", recipe.title, category);
        println!("  ID: {} | Status: {}", recipe.id, recipe.status);
    }
    if let Some(ms) = response.execution_time_ms {
        println!();
        println!("({ms:.0} ms)");
    }

    Ok(())
}

async fn cmd_suggest(config: Config, prefix: &str, ingredients: bool) -> anyhow::Result<()> {
    let state = SharedState::new(config)?;
    let mode = if ingredients {
        SuggestMode::Ingredients
    } else {
        SuggestMode::General
    };

    state.suggest.set_query(prefix, mode);
    state.suggest.flush().await;

    let snapshot = state.suggest.state();
    if !snapshot.available {
        println!("Suggestions are not configured. Set api.base_url and api.api_key.");
        return Ok(());
    }
    if let Some(error) = snapshot.error {
        println!("{error}");
        return Ok(());
    }
    if snapshot.suggestions.is_empty() {
        println!("No suggestions for '{prefix}'");
        return Ok(());
    }

    for (category, members) in group_by_category(&snapshot.suggestions) {
        println!("{category}:");
        for suggestion in members {
            println!("  {} ({:?})", suggestion.name, suggestion.match_type);
        }
    }

    Ok(())
}

async fn cmd_saved_list(config: Config) -> anyhow::Result<()> {
    let state = SharedState::new(config)?;
    let Some(session) = state.session.current() else {
        println!("Not signed in. Use 'ladle login <email>' first.");
        return Ok(());
    };

    state.saved.load(&session.user_id).await;
    let ids = state.saved.ids().await;

    if let Some(error) = state.saved.last_error().await {
        println!("⚠ Using cached snapshot: {error}");
    }

    if ids.is_empty() {
        println!("No saved recipes.");
        return Ok(());
    }

    println!("Saved recipes ({}):", ids.len());
    for id in ids {
        println!("  • {id}");
    }
    Ok(())
}

async fn cmd_saved_toggle(config: Config, recipe_id: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config)?;
    let Some(session) = state.session.current() else {
        println!("Not signed in. Use 'ladle login <email>' first.");
        return Ok(());
    };

    state.saved.load(&session.user_id).await;

    match state.saved.toggle(recipe_id).await {
        Ok(true) => println!("✓ Saved {recipe_id}"),
        Ok(false) => println!("✓ Removed {recipe_id}"),
        Err(e) => println!("Toggle failed, state unchanged: {e}"),
    }
    Ok(())
}

async fn cmd_notifications_list(config: Config, page: u32, unread: bool) -> anyhow::Result<()> {
    let state = SharedState::new(config)?;
    let filter = if unread {
        FeedFilter::unread_only()
    } else {
        FeedFilter::default()
    };

    let feed_page = state
        .feed
        .page(page, &filter)
        .await
        .context("Failed to fetch notifications")?;

    if feed_page.items.is_empty() {
        println!("No notifications.");
        return Ok(());
    }

    println!(
        "Notifications (page {}/{}, {} total)",
        feed_page.page,
        feed_page.total_pages(),
        feed_page.total
    );
    println!("{:-<70}", "");
    for item in &feed_page.items {
        let marker = if item.is_read { " " } else { "●" };
        println!(
            "{} [{}/{}] {}",
            marker,
            item.kind.as_str(),
            item.priority.as_str(),
            item.title
        );
        println!("  ID: {} | {}", item.id, item.created_at.to_rfc3339());
    }

    let count = state.feed.poll_unread_once().await;
    println!();
    println!("{count} unread");
    Ok(())
}

async fn cmd_notifications_read(config: Config, id: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config)?;
    state.feed.mark_read(id).await.context("Mark-read failed")?;
    println!("✓ Marked {id} as read");
    Ok(())
}

async fn cmd_notifications_read_all(config: Config) -> anyhow::Result<()> {
    let state = SharedState::new(config)?;
    let affected = state
        .feed
        .mark_all_read()
        .await
        .context("Mark-all-read failed")?;
    println!("✓ Marked {affected} notifications as read");
    Ok(())
}

async fn cmd_notifications_delete(config: Config, id: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config)?;

    if !confirm(&format!("Delete notification {id}? Enter 'y' to confirm: "))? {
        println!("Cancelled.");
        return Ok(());
    }

    state.feed.delete(id).await.context("Delete failed")?;
    println!("✓ Deleted {id}");
    Ok(())
}

async fn cmd_notifications_clear(config: Config) -> anyhow::Result<()> {
    let state = SharedState::new(config)?;

    if !confirm("Delete ALL notifications? Enter 'y' to confirm: ")? {
        println!("Cancelled.");
        return Ok(());
    }

    let affected = state.feed.clear_all().await.context("Clear failed")?;
    println!("✓ Cleared {affected} notifications");
    Ok(())
}

async fn cmd_daemon(config: Config) -> anyhow::Result<()> {
    info!("Ladle v{} starting in daemon mode...", env!("CARGO_PKG_VERSION"));

    let state = SharedState::new(config)?;

    let poll_handle = state.feed.spawn_unread_poll();

    // Push channel: the transport adapter feeds this from the provider.
    let (_push_tx, push_rx) = tokio::sync::mpsc::channel(32);
    let push_handle = state.push.spawn(push_rx);

    let mut events = state.event_bus.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                AppEvent::Toast(toast) => {
                    println!("[toast] {}: {}", toast.kind.as_str(), toast.title);
                }
                AppEvent::UnreadCount(count) => println!("[feed] {count} unread"),
                AppEvent::FeedInvalidated => println!("[feed] invalidated"),
                AppEvent::SavedChanged { recipe_id, saved } => {
                    println!("[saved] {recipe_id} -> {saved}");
                }
                AppEvent::SuggestionsUpdated { query } => {
                    println!("[suggest] updated for '{query}'");
                }
                AppEvent::SessionChanged { signed_in } => {
                    println!("[session] signed_in={signed_in}");
                }
            }
        }
    });

    info!("Daemon running. Press Ctrl+C to stop.");

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => tracing::error!("Error listening for shutdown: {e}"),
    }

    poll_handle.abort();
    push_handle.abort();
    printer.abort();
    info!("Daemon stopped");

    Ok(())
}
