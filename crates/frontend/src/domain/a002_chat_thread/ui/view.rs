//! Chat Thread - View Component

use super::view_model::ChatThreadVm;
use crate::layout::header::Header;
use crate::shared::icons::icon;
use contracts::domain::a002_chat_thread::aggregate::ChatRole;
use contracts::shared::markdown;
use leptos::prelude::*;
use leptos_router::components::A;
use thaw::*;

#[component]
#[allow(non_snake_case)]
pub fn ChatPage() -> impl IntoView {
    let vm = ChatThreadVm::new();
    let messages_container_ref = NodeRef::<leptos::html::Div>::new();

    // Keep the newest message (or the thinking bubble) in view
    Effect::new(move |_| {
        vm.thread.with(|t| (t.messages().len(), t.is_sending()));
        if let Some(container) = messages_container_ref.get() {
            request_animation_frame(move || {
                container.set_scroll_top(container.scroll_height());
            });
        }
    });

    let is_sending = Signal::derive(move || vm.is_sending());

    view! {
        <div class="page page--chat">
            <Header>
                <A href="/" attr:class="header__link">"← Back to uploads"</A>
            </Header>

            <main class="chat">
                <div class="chat__messages" node_ref=messages_container_ref>
                    <Show when=move || vm.thread.with(|t| t.messages().is_empty())>
                        <div class="chat__empty">
                            <p class="chat__empty-title">"Ask anything about your PDFs"</p>
                            <p class="chat__empty-hint">
                                "Answers come from the documents you analysed."
                            </p>
                        </div>
                    </Show>

                    <For
                        each=move || vm.thread.with(|t| t.messages().to_vec())
                        key=|msg| msg.id
                        let:msg
                    >
                        {match msg.role {
                            ChatRole::User => view! {
                                <div class="bubble-row bubble-row--user">
                                    <div class="bubble bubble--user">{msg.content.clone()}</div>
                                    <span class="avatar avatar--user">{icon("user")}</span>
                                </div>
                            }.into_any(),
                            ChatRole::Assistant => view! {
                                <div class="bubble-row bubble-row--assistant">
                                    <span class="avatar avatar--assistant">{icon("bot")}</span>
                                    <div
                                        class="bubble bubble--assistant markdown"
                                        inner_html=markdown::render(&msg.content)
                                    ></div>
                                </div>
                            }.into_any(),
                        }}
                    </For>

                    <Show when=move || vm.is_sending()>
                        <div class="bubble-row bubble-row--assistant">
                            <span class="avatar avatar--assistant">{icon("bot")}</span>
                            <div class="bubble bubble--assistant bubble--thinking">"Thinking…"</div>
                        </div>
                    </Show>
                </div>

                <div class="chat__input">
                    <div style="flex: 1;">
                        <Textarea
                            value=vm.input
                            placeholder="Ask a question about your PDFs… (Enter to send, Shift+Enter for a new line)"
                            attr:style="width: 100%; min-height: 48px; max-height: 200px; resize: vertical;"
                            disabled=is_sending
                            on:keydown=move |ev: web_sys::KeyboardEvent| {
                                if ev.key() == "Enter" && !ev.shift_key() {
                                    ev.prevent_default();
                                    vm.send();
                                }
                            }
                        />
                    </div>
                    <Button
                        appearance=ButtonAppearance::Primary
                        disabled=Signal::derive(move || {
                            vm.is_sending() || vm.input.with(|s| s.trim().is_empty())
                        })
                        on_click=move |_| vm.send()
                    >
                        {icon("send")}
                        " Send"
                    </Button>
                </div>
            </main>
        </div>
    }
}
