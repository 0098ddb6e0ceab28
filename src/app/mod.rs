//! Application wiring and lifecycle.
//!
//! Owns the long-lived state (cache, registry, source), spawns the poller
//! and the command listener, and tears both down on shutdown. The state is
//! constructed here and passed by reference into the tasks; nothing in the
//! system is ambient.

pub mod handler;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::adapter::monobank::MonobankSource;
use crate::cache::RateCache;
use crate::config::Config;
use crate::error::Result;
use crate::poller::{Poller, PollerSettings};
use crate::port::RateSource;
use crate::registry::SubscriptionRegistry;
use crate::router::{NotificationRouter, Renderer};

use handler::CommandContext;

pub struct App;

impl App {
    /// Run the application until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error when construction fails (bad configuration, HTTP
    /// client build); runtime fetch and delivery failures are logged, never
    /// fatal.
    pub async fn run(config: Config) -> Result<()> {
        let cache = Arc::new(RateCache::new());
        let registry = Arc::new(SubscriptionRegistry::new());
        let source: Arc<dyn RateSource> = Arc::new(MonobankSource::new(&config.source)?);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let context = Arc::new(CommandContext::new(
            Arc::clone(&cache),
            Arc::clone(&registry),
            Arc::clone(&source),
            config.cache.ttl(),
            config.cache.mode,
        ));

        let (sink, render) = build_sink(&config);
        let router = Arc::new(NotificationRouter::new(
            Arc::clone(&registry),
            sink,
            render,
        ));

        let poller = Poller::new(
            Arc::clone(&cache),
            Arc::clone(&registry),
            router,
            Arc::clone(&source),
            PollerSettings {
                interval: config.poller.interval(),
                rate_limit_retry: config.source.rate_limit_retry(),
                mode: config.cache.mode,
            },
        );
        let poller_task = tokio::spawn(poller.run(shutdown_rx.clone()));

        let listener_task = spawn_listener(&config, context, shutdown_rx);

        tokio::signal::ctrl_c().await?;
        info!("shutdown signal received");

        let _ = shutdown_tx.send(true);
        let _ = poller_task.await;
        if let Some(task) = listener_task {
            let _ = task.await;
        }

        Ok(())
    }
}

#[cfg(feature = "telegram")]
fn build_sink(config: &Config) -> (Arc<dyn crate::port::Sink>, Renderer) {
    use crate::adapter::telegram::{format, TelegramSink};
    use teloxide::Bot;

    match config.telegram.resolved_bot_token() {
        Some(token) => {
            let sink: Arc<dyn crate::port::Sink> = Arc::new(TelegramSink::new(Bot::new(token)));
            let render: Renderer =
                Arc::new(|s: &crate::domain::Snapshot| format::rates_message(s));
            (sink, render)
        }
        None => {
            tracing::warn!("no Telegram bot token configured, notifications go to the log only");
            log_sink()
        }
    }
}

#[cfg(not(feature = "telegram"))]
fn build_sink(_config: &Config) -> (Arc<dyn crate::port::Sink>, Renderer) {
    log_sink()
}

fn log_sink() -> (Arc<dyn crate::port::Sink>, Renderer) {
    let sink: Arc<dyn crate::port::Sink> = Arc::new(crate::port::LogSink);
    let render: Renderer = Arc::new(|s: &crate::domain::Snapshot| {
        format!("{} rates as of {}", s.len(), s.fetched_at)
    });
    (sink, render)
}

#[cfg(feature = "telegram")]
fn spawn_listener(
    config: &Config,
    context: Arc<CommandContext>,
    shutdown: watch::Receiver<bool>,
) -> Option<tokio::task::JoinHandle<()>> {
    let token = config.telegram.resolved_bot_token()?;
    Some(tokio::spawn(crate::adapter::telegram::run_listener(
        token,
        context,
        config.telegram.restart_delay(),
        shutdown,
    )))
}

#[cfg(not(feature = "telegram"))]
fn spawn_listener(
    _config: &Config,
    _context: Arc<CommandContext>,
    _shutdown: watch::Receiver<bool>,
) -> Option<tokio::task::JoinHandle<()>> {
    None
}
