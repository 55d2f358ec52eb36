//! stream-watcher client
//!
//! Tracks YouTube/Twitch channels in a local store, resolves channels
//! through the stream-watcher backend, syncs the tracked list across
//! devices with an opaque key, and watches upcoming livestreams.

mod api;
mod config;
mod error;
mod logging;
mod resolve;
mod store;
mod sync;
mod view;
mod watch;

use anyhow::{bail, Context, Result};
use tracing::{error, info};

use api::ApiClient;
use config::Config;
use store::{ChannelStore, FilePersistence, Provider};
use sync::{SyncClient, SyncKey};
use watch::{create_engine_channels, EngineCommand, WatchEngine};

fn main() -> Result<()> {
    // Initialize logging
    let _log_guard = logging::init_logging()?;

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // Load configuration
    let config = Config::load()?;
    info!("Configuration loaded from {:?}", config.config_path()?);

    let api = ApiClient::new(&config);
    let state_dir = config.state_directory()?;
    let mut store = ChannelStore::new(FilePersistence::open(&state_dir)?);

    // Create tokio runtime for async operations
    let runtime = tokio::runtime::Runtime::new()?;

    match args.first().map(String::as_str) {
        None | Some("watch") => run_watch(&runtime, &config, api, store),
        Some("follow") => runtime.block_on(cmd_follow(&api, &mut store, &args[1..])),
        Some("unfollow") => cmd_unfollow(&mut store, &args[1..]),
        Some("list") => cmd_list(&store),
        Some("import") => runtime.block_on(cmd_import(&api, &mut store, &args[1..])),
        Some("sync") => runtime.block_on(cmd_sync(&api, &mut store, &args[1..])),
        Some("cal") => cmd_cal(&api, &store, &args[1..]),
        Some("notice") => runtime.block_on(cmd_notice(&api, &args[1..])),
        Some(other) => {
            print_help();
            bail!("unknown command: {}", other);
        }
    }
}

/// Run the watch loop until Ctrl+C
fn run_watch(
    runtime: &tokio::runtime::Runtime,
    config: &Config,
    api: ApiClient,
    store: ChannelStore<FilePersistence>,
) -> Result<()> {
    if !api.is_configured() {
        bail!("API endpoint not configured (set api.endpoint in {:?})", config.config_path()?);
    }

    let (cmd_tx, cmd_rx) = create_engine_channels();

    // Set up Ctrl+C handler that sends the shutdown command
    let ctrl_c_tx = cmd_tx;
    let ctrl_c_handle = runtime.handle().clone();
    ctrlc::set_handler(move || {
        info!("Ctrl+C received, shutting down...");
        let tx = ctrl_c_tx.clone();
        ctrl_c_handle.spawn(async move {
            let _ = tx.send(EngineCommand::Shutdown).await;
        });
    })?;

    let mut engine = WatchEngine::new(config, api, store, cmd_rx);
    runtime.block_on(engine.run())?;

    info!("Shutdown complete");
    Ok(())
}

/// Resolve a query, show the resolved identity, and start tracking it
async fn cmd_follow(
    api: &ApiClient,
    store: &mut ChannelStore<FilePersistence>,
    args: &[String],
) -> Result<()> {
    let (provider, query) = parse_provider_and_value(args)
        .context("usage: stream-watcher follow <yt|tw> <query>")?;

    let info = api
        .lookup_channel(provider, &query)
        .await
        .with_context(|| format!("Failed to resolve {:?}", query))?;

    println!("{}: {} ({})", provider.label(), info.title, info.custom_url);

    if store.add(provider, &info.custom_url)? {
        println!("Now following {}", info.custom_url);
        refresh_once(api, store).await;
    } else {
        println!("Already following {}", info.custom_url);
    }
    Ok(())
}

/// Stop tracking a channel
fn cmd_unfollow(store: &mut ChannelStore<FilePersistence>, args: &[String]) -> Result<()> {
    let (provider, handle) = parse_provider_and_value(args)
        .context("usage: stream-watcher unfollow <yt|tw> <handle>")?;

    if store.remove(provider, &handle)? {
        println!("Unfollowed {}", handle);
    } else {
        println!("Not following {}", handle);
    }
    Ok(())
}

/// Print the tracked channels per provider
fn cmd_list(store: &ChannelStore<FilePersistence>) -> Result<()> {
    for provider in [Provider::YouTube, Provider::Twitch] {
        let list = store.get(provider);
        println!("{} ({}):", provider.label(), list.len());
        for handle in &list {
            println!("  @{}", handle);
        }
    }
    Ok(())
}

/// Bulk import: resolve a comma-separated query list (or the channel
/// parameters of a shared URL) and follow everything that resolves
async fn cmd_import(
    api: &ApiClient,
    store: &mut ChannelStore<FilePersistence>,
    args: &[String],
) -> Result<()> {
    // Provider tag is optional; bare values default to YouTube
    let (provider, value) = match parse_provider_and_value(args) {
        Ok(parsed) => parsed,
        Err(_) => match args.first() {
            Some(value) => (Provider::YouTube, value.clone()),
            None => bail!("usage: stream-watcher import [yt|tw] <queries-or-url>"),
        },
    };

    let queries = resolve::extract_import_queries(&value, provider);
    if queries.is_empty() {
        bail!("nothing to import from {:?}", value);
    }

    let added = resolve::bulk_import(api, store, &queries).await?;
    println!("Imported {} of {} channels", added, queries.len());

    // One combined refresh after all resolutions settled
    refresh_once(api, store).await;
    Ok(())
}

/// Sync subcommands: new / set / show / push / pull
async fn cmd_sync(
    api: &ApiClient,
    store: &mut ChannelStore<FilePersistence>,
    args: &[String],
) -> Result<()> {
    let client = SyncClient::new(api);

    match args.first().map(String::as_str) {
        Some("new") => {
            let key = client.generate().await?;
            store.set_sync_key(key.as_str())?;
            println!("{}", key);
        }
        Some("set") => {
            let raw = args.get(1).context("usage: stream-watcher sync set <key>")?;
            let key = SyncKey::parse(raw)?;
            store.set_sync_key(key.as_str())?;
            println!("Sync key stored");
        }
        Some("show") => match store.sync_key() {
            Some(key) => println!("{}", key),
            None => println!("No sync key stored"),
        },
        Some("push") => {
            let key = store.sync_key().context("no sync key stored (run `sync new` first)")?;
            client.push(&key, store).await?;
            println!("Pushed tracked channels to key {}", key);
        }
        Some("pull") => {
            let key = store.sync_key().context("no sync key stored (run `sync set` first)")?;
            let added = client.pull(&key, store).await?;
            println!("Pulled {} new channels", added);
            refresh_once(api, store).await;
        }
        _ => bail!("usage: stream-watcher sync <new|set|show|push|pull>"),
    }
    Ok(())
}

/// Print the calendar URL for the tracked channels
fn cmd_cal(
    api: &ApiClient,
    store: &ChannelStore<FilePersistence>,
    args: &[String],
) -> Result<()> {
    let alarm = args.iter().any(|a| a == "--alarm");
    let url = api.calendar_url(
        &store.get(Provider::YouTube),
        &store.get(Provider::Twitch),
        alarm,
    )?;
    println!("{}", url);
    Ok(())
}

/// Report manually noticed YouTube videos to the backend
async fn cmd_notice(api: &ApiClient, args: &[String]) -> Result<()> {
    let value = args.first().context("usage: stream-watcher notice <urls-or-ids>")?;
    let ids = resolve::extract_video_ids(value);
    if ids.is_empty() {
        bail!("no video ids in {:?}", value);
    }

    let ack = api.notice_videos(&ids).await?;
    if !ack.is_ok() {
        bail!("backend rejected the notice: {}", ack.result);
    }
    println!("Noticed {} videos", ids.len());
    Ok(())
}

/// Fetch the combined video list once and render it; failures only log
async fn refresh_once(api: &ApiClient, store: &ChannelStore<FilePersistence>) {
    let yt_list = store.get(Provider::YouTube);
    let tw_list = store.get(Provider::Twitch);

    match api.video_data(&yt_list, &tw_list).await {
        Ok(events) => view::render(&view::build_view(&events, chrono::Utc::now())),
        Err(e) => error!("Video fetch failed: {}", e),
    }
}

fn parse_provider_and_value(args: &[String]) -> Result<(Provider, String)> {
    let tag = args.first().context("missing provider")?;
    let provider = Provider::parse(tag).with_context(|| format!("unknown provider: {}", tag))?;
    let value = args.get(1).context("missing value")?;
    Ok((provider, value.clone()))
}

fn print_help() {
    println!("stream-watcher - track YouTube/Twitch channels and watch upcoming livestreams");
    println!();
    println!("USAGE:");
    println!("    stream-watcher [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    watch                         Run the watch loop (default)");
    println!("    follow <yt|tw> <query>        Resolve a channel and start tracking it");
    println!("    unfollow <yt|tw> <handle>     Stop tracking a channel");
    println!("    list                          Show tracked channels");
    println!("    import [yt|tw] <list-or-url>  Bulk import channels (comma list or share URL)");
    println!("    sync new|set|show|push|pull   Transfer the tracked list between devices");
    println!("    cal [--alarm]                 Print the ICS calendar URL");
    println!("    notice <urls-or-ids>          Report YouTube videos to the backend");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help    Print this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    RUST_LOG      Set log level (e.g., debug, info, warn)");
}
