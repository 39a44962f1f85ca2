//! Chat Thread - View Model

use contracts::domain::a002_chat_thread::aggregate::ChatThread;
use contracts::domain::a002_chat_thread::service::send_message;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::layout::global_context::AppGlobalContext;
use crate::shared::signal_cell::SignalCell;

#[derive(Clone, Copy)]
pub struct ChatThreadVm {
    ctx: StoredValue<AppGlobalContext>,
    pub thread: RwSignal<ChatThread>,
    pub input: RwSignal<String>,
}

impl ChatThreadVm {
    pub fn new() -> Self {
        let ctx = use_context::<AppGlobalContext>().expect("AppGlobalContext context not found");
        Self {
            thread: ctx.thread,
            ctx: StoredValue::new(ctx),
            input: RwSignal::new(String::new()),
        }
    }

    pub fn is_sending(&self) -> bool {
        self.thread.with(|t| t.is_sending())
    }

    /// Send the current input. Blank input or a send already in flight is a no-op.
    pub fn send(&self) {
        let text = self.input.get_untracked();
        if text.trim().is_empty() || self.thread.with_untracked(|t| t.is_sending()) {
            return;
        }
        self.input.set(String::new());

        let ctx = self.ctx.get_value();
        let cell = SignalCell(self.thread);
        spawn_local(async move {
            if !send_message(&cell, &ctx.identity, &ctx.chat, &text).await {
                log::debug!("chat send skipped");
            }
        });
    }
}
