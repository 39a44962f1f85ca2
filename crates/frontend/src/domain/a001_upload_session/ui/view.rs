//! Upload Session - View Component

use super::view_model::UploadSessionVm;
use crate::layout::header::Header;
use crate::shared::icons::icon;
use contracts::domain::a001_upload_session::aggregate::{
    EntryId, UploadEntry, UploadStatus, MAX_FILES,
};
use leptos::prelude::*;
use leptos_router::components::A;
use thaw::*;
use web_sys::{File, FileList};

fn file_list(files: &FileList) -> Vec<File> {
    (0..files.length()).filter_map(|i| files.get(i)).collect()
}

fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.0} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

fn status_label(entry: &UploadEntry) -> String {
    match entry.status {
        UploadStatus::Pending => "Waiting…".to_string(),
        UploadStatus::Uploading => format!("{}%", entry.progress),
        UploadStatus::Done => "Uploaded".to_string(),
        UploadStatus::Error => "Failed".to_string(),
    }
}

#[component]
#[allow(non_snake_case)]
pub fn UploadPage() -> impl IntoView {
    let vm = UploadSessionVm::new();
    let file_input_ref = NodeRef::<leptos::html::Input>::new();

    let analyse_disabled =
        Signal::derive(move || vm.session.with(|s| !s.all_uploaded() || s.is_analysing()));

    view! {
        <div class="page">
            <Header>
                <Button appearance=ButtonAppearance::Secondary on_click=move |_| vm.sign_out()>
                    "Sign out"
                </Button>
            </Header>

            <main class="page__main page__main--centered">
                <div class="upload-card">
                    <div class="upload-card__title">
                        <h2>"Chat with your PDFs"</h2>
                        <p>{format!("Upload up to {} PDF files, analyse them, and start chatting.", MAX_FILES)}</p>
                    </div>

                    <div class="info-cards">
                        <div class="info-card">
                            <p class="info-card__title">"1. Upload"</p>
                            <p class="info-card__text">{format!("Add up to {} PDF files to get started.", MAX_FILES)}</p>
                        </div>
                        <div class="info-card">
                            <p class="info-card__title">"2. Analyse"</p>
                            <p class="info-card__text">"We index your documents for smart search."</p>
                        </div>
                        <div class="info-card">
                            <p class="info-card__title">"3. Chat"</p>
                            <p class="info-card__text">"Ask questions and get answers from your PDFs."</p>
                        </div>
                    </div>

                    <input
                        type="file"
                        accept="application/pdf"
                        multiple
                        style="display: none;"
                        node_ref=file_input_ref
                        on:change=move |ev| {
                            let input: web_sys::HtmlInputElement = event_target(&ev);
                            if let Some(files) = input.files() {
                                vm.add_files(file_list(&files));
                            }
                            // Clear input so picking the same file again fires change
                            input.set_value("");
                        }
                    />

                    <Show when=move || vm.session.with(|s| s.len() < MAX_FILES)>
                        <div
                            class=move || {
                                if vm.drag_over.get() { "dropzone dropzone--active" } else { "dropzone" }
                            }
                            on:dragover=move |ev: web_sys::DragEvent| {
                                ev.prevent_default();
                                vm.drag_over.set(true);
                            }
                            on:dragleave=move |_| vm.drag_over.set(false)
                            on:drop=move |ev: web_sys::DragEvent| {
                                ev.prevent_default();
                                vm.drag_over.set(false);
                                if let Some(files) = ev.data_transfer().and_then(|dt| dt.files()) {
                                    vm.add_files(file_list(&files));
                                }
                            }
                            on:click=move |_| {
                                if let Some(input) = file_input_ref.get() {
                                    input.click();
                                }
                            }
                        >
                            {icon("upload")}
                            <p class="dropzone__title">"Drop PDFs here or click to browse"</p>
                            <p class="dropzone__hint">
                                {move || {
                                    let left = MAX_FILES - vm.session.with(|s| s.len());
                                    format!("{} of {} slots left", left, MAX_FILES)
                                }}
                            </p>
                        </div>
                    </Show>

                    <div class="file-list">
                        <For
                            each=move || vm.session.with(|s| s.entries().map(|e| e.id).collect::<Vec<_>>())
                            key=|id| *id
                            let:id
                        >
                            <EntryRow vm=vm id=id />
                        </For>
                    </div>

                    {move || {
                        vm.session
                            .with(|s| s.analyse_error().map(str::to_string))
                            .map(|e| view! { <div class="error-banner">{e}</div> })
                    }}

                    <Show when=move || !vm.session.with(|s| s.is_empty())>
                        <div class="upload-card__actions">
                            <Button
                                appearance=ButtonAppearance::Primary
                                disabled=analyse_disabled
                                on_click=move |_| vm.analyse()
                            >
                                {move || {
                                    vm.session.with(|s| {
                                        if s.is_analysing() {
                                            "Analysing…"
                                        } else if s.is_analysed() {
                                            "Analyse again"
                                        } else {
                                            "Analyse"
                                        }
                                    })
                                }}
                            </Button>
                            <Show when=move || vm.session.with(|s| s.is_analysed())>
                                <A href="/chat" attr:class="btn-primary">"Start chatting →"</A>
                            </Show>
                        </div>
                    </Show>
                </div>
            </main>
        </div>
    }
}

/// One file row; re-reads its entry by id so late progress never lands on
/// another row.
#[component]
#[allow(non_snake_case)]
fn EntryRow(vm: UploadSessionVm, id: EntryId) -> impl IntoView {
    move || {
        vm.session.with(|s| s.get(id).cloned()).map(|entry| {
            let status_class = format!("file-row__status file-row__status--{}", entry.status.as_str());
            view! {
                <div class="file-row">
                    {icon("document")}
                    <div class="file-row__body">
                        <div class="file-row__top">
                            <span class="file-row__name">{entry.file_name.clone()}</span>
                            <span class=status_class>{status_label(&entry)}</span>
                        </div>
                        <div class="file-row__size">{format_size(entry.size)}</div>
                        <div class="progress">
                            <div class="progress__bar" style=format!("width: {}%;", entry.progress)></div>
                        </div>
                    </div>
                    <button
                        class="icon-button"
                        aria-label="Remove file"
                        on:click=move |_| vm.remove(id)
                    >
                        {icon("close")}
                    </button>
                </div>
            }
        })
    }
}
