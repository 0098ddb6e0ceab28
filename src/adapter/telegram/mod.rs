//! Telegram sink and command listener.
//!
//! The sink delivers rendered notifications to a chat. The command listener
//! answers `/start` and `/rates`, and runs under a small supervisor that
//! recreates the bot transport when the listener dies; cache, registry, and
//! poller state live outside the supervised task and survive restarts.
//!
//! Requires the `telegram` feature to be enabled.

pub mod format;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::app::handler::{CommandContext, RatesReply};
use crate::domain::SubscriberId;
use crate::error::SinkError;
use crate::port::Sink;

/// [`Sink`] that delivers notifications to Telegram chats.
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Sink for TelegramSink {
    async fn deliver(&self, recipient: SubscriberId, text: &str) -> Result<(), SinkError> {
        self.bot
            .send_message(ChatId(recipient.value()), text)
            .await
            .map(|_| ())
            .map_err(|e| SinkError::Delivery {
                recipient,
                reason: e.to_string(),
            })
    }
}

/// Commands registered with Telegram for the "/" menu.
fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("start", "Subscribe to rate change notifications"),
        ("rates", "Show the latest exchange rates"),
    ]
}

/// Run the command listener under transport supervision.
///
/// When the listener exits for any reason other than shutdown, the bot is
/// recreated after `restart_delay` and the listener starts again with the
/// same shared state.
pub async fn run_listener(
    token: String,
    context: Arc<CommandContext>,
    restart_delay: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let bot = Bot::new(&token);

        tokio::select! {
            () = listen(bot, Arc::clone(&context)) => {
                if *shutdown.borrow() {
                    break;
                }
                warn!(
                    delay_secs = restart_delay.as_secs(),
                    "telegram listener exited, restarting transport"
                );
                tokio::time::sleep(restart_delay).await;
            }
            _ = shutdown.changed() => {
                info!("telegram listener shutting down");
                break;
            }
        }
    }
}

/// Answer bot commands until the underlying transport gives up.
async fn listen(bot: Bot, context: Arc<CommandContext>) {
    if let Err(e) = register_bot_commands(&bot).await {
        warn!(error = %e, "failed to register bot commands with Telegram");
    }

    info!("telegram command listener started");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let context = Arc::clone(&context);
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };

            if let Some(reply) = command_reply(text, msg.chat.id, &context).await {
                if let Err(e) = bot.send_message(msg.chat.id, reply).await {
                    error!(error = %e, "failed to send command response");
                }
            }

            respond(())
        }
    })
    .await;
}

/// The response for one inbound message, or `None` for anything that is not
/// a known command.
async fn command_reply(text: &str, chat: ChatId, context: &CommandContext) -> Option<String> {
    let subscriber = SubscriberId::new(chat.0);

    match text.trim() {
        "/start" => {
            context.handle_start(subscriber);
            Some(format::subscribed_message())
        }
        "/rates" => Some(render_rates_reply(context.handle_rates(subscriber).await)),
        _ => None,
    }
}

fn render_rates_reply(reply: RatesReply) -> String {
    match reply {
        RatesReply::Fresh(snapshot) => format::rates_message(&snapshot),
        RatesReply::Stale { snapshot, .. } => format::stale_rates_message(&snapshot),
        RatesReply::Failed(_) => format::fetch_failed_message(),
    }
}

/// Register bot commands with Telegram for the "/" menu.
async fn register_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<BotCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| BotCommand::new(cmd, desc))
        .collect();

    bot.set_my_commands(commands).await?;
    Ok(())
}
