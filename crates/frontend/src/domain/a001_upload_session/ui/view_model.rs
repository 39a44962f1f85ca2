//! Upload Session - View Model

use contracts::domain::a001_upload_session::aggregate::{EntryId, PendingFile, UploadSession};
use contracts::domain::a001_upload_session::service::{analyse, upload_entry};
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::File;

use crate::layout::global_context::AppGlobalContext;
use crate::shared::dialog::alert;
use crate::shared::signal_cell::SignalCell;

#[derive(Clone, Copy)]
pub struct UploadSessionVm {
    ctx: StoredValue<AppGlobalContext>,
    pub session: RwSignal<UploadSession>,
    pub drag_over: RwSignal<bool>,
}

impl UploadSessionVm {
    pub fn new() -> Self {
        let ctx = use_context::<AppGlobalContext>().expect("AppGlobalContext context not found");
        Self {
            session: ctx.session,
            ctx: StoredValue::new(ctx),
            drag_over: RwSignal::new(false),
        }
    }

    /// Admit the picked files and start one upload per admitted entry.
    pub fn add_files(&self, files: Vec<File>) {
        let candidates = files
            .into_iter()
            .map(|file| PendingFile {
                name: file.name(),
                content_type: file.type_(),
                size: file.size() as u64,
                blob: file,
            })
            .collect();

        let admitted = match self.session.try_update(|s| s.add_files(candidates)) {
            Some(Ok(admitted)) => admitted,
            Some(Err(e)) => {
                alert(&e.to_string());
                return;
            }
            None => return,
        };

        for (id, file) in admitted {
            let ctx = self.ctx.get_value();
            let cell = SignalCell(self.session);
            spawn_local(async move {
                let result =
                    upload_entry(cell, &ctx.identity, &ctx.storage, id, &file.name, file.blob)
                        .await;
                if let Err(e) = result {
                    alert(&format!(
                        "Upload failed: {}\n\nMake sure storage is enabled and allows authenticated uploads.",
                        e
                    ));
                }
            });
        }
    }

    pub fn remove(&self, id: EntryId) {
        self.session.update(|s| {
            s.remove(id);
        });
    }

    /// Signing out also clears the session; the auth guard then redirects.
    pub fn sign_out(&self) {
        self.ctx.with_value(|ctx| ctx.sign_out());
    }

    pub fn analyse(&self) {
        let ctx = self.ctx.get_value();
        let cell = SignalCell(self.session);
        spawn_local(async move {
            if analyse(&cell, &ctx.identity, &ctx.analysis).await.is_none() {
                log::debug!("analyse ignored: not every file is uploaded");
            }
        });
    }
}
