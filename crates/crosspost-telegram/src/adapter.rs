//! Telegram adapter.
//!
//! Wraps a teloxide `Bot` + `Dispatcher` and drives the long-polling event loop
//! until Ctrl-C. Long polling needs no public URL.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::info;

use crate::context::BotContext;
use crate::handler::handle_message;

pub struct TelegramAdapter {
    bot: Bot,
    ctx: Arc<BotContext>,
}

impl TelegramAdapter {
    pub fn new(bot: Bot, ctx: Arc<BotContext>) -> Self {
        Self { bot, ctx }
    }

    /// Drive the long-polling loop. Returns once Ctrl-C stops the dispatcher.
    pub async fn run(self) {
        info!("Telegram: starting long-polling dispatcher");

        let handler = Update::filter_message().endpoint(handle_message);

        Dispatcher::builder(self.bot, handler)
            .dependencies(dptree::deps![self.ctx])
            .default_handler(|_upd| async {})
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram: dispatcher stopped");
    }
}
