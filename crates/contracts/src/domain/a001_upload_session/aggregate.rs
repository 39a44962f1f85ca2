use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Maximum number of entries in one session
pub const MAX_FILES: usize = 3;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Stable entry identifier, assigned once at creation and never reused.
/// Ordering follows creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Upload state of a single entry: `pending -> uploading -> done | error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Done,
    Error,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Pending => "pending",
            UploadStatus::Uploading => "uploading",
            UploadStatus::Done => "done",
            UploadStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Done | UploadStatus::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadEntry {
    pub id: EntryId,
    pub file_name: String,
    pub size: u64,
    /// 0..=100
    pub progress: u8,
    pub url: Option<String>,
    pub status: UploadStatus,
}

/// A file the user picked, before admission into the session.
/// `blob` is the platform file handle handed to storage.
#[derive(Debug, Clone)]
pub struct PendingFile<B> {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub blob: B,
}

impl<B> PendingFile<B> {
    pub fn is_pdf(&self) -> bool {
        self.content_type == PDF_CONTENT_TYPE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddFilesError {
    #[error("You can upload a maximum of {max} PDFs.")]
    TooManyFiles {
        current: usize,
        incoming: usize,
        max: usize,
    },
}

/// Analysis progress of the session as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnalysisState {
    #[default]
    Idle,
    InFlight {
        generation: u64,
    },
    Analysed,
    Failed(String),
}

/// Handed out by `begin_analyse`; the generation ties the eventual result to
/// the set of entries that was analysed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyseTicket {
    pub generation: u64,
    pub pdf_urls: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSession {
    entries: BTreeMap<EntryId, UploadEntry>,
    next_id: u64,
    /// Bumped on every add/remove.
    generation: u64,
    analysis: AnalysisState,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry and the analysis outcome, for the next user.
    ///
    /// Id and generation counters keep running so callbacks and tickets from
    /// before the reset never match anything created after it.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.generation += 1;
        self.analysis = AnalysisState::Idle;
    }

    /// Entries in selection order.
    pub fn entries(&self) -> impl Iterator<Item = &UploadEntry> {
        self.entries.values()
    }

    pub fn get(&self, id: EntryId) -> Option<&UploadEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Admit the PDF candidates as `pending` entries.
    ///
    /// Non-PDF candidates are dropped first; an empty remainder is a no-op.
    /// A batch that would exceed [`MAX_FILES`] is rejected as a whole. On
    /// success the admitted files come back paired with their new ids so the
    /// caller can start one upload per entry.
    pub fn add_files<B>(
        &mut self,
        candidates: Vec<PendingFile<B>>,
    ) -> Result<Vec<(EntryId, PendingFile<B>)>, AddFilesError> {
        let pdfs: Vec<PendingFile<B>> = candidates
            .into_iter()
            .filter(|c| {
                let keep = c.is_pdf();
                if !keep {
                    log::debug!("skipping {} ({})", c.name, c.content_type);
                }
                keep
            })
            .collect();
        if pdfs.is_empty() {
            return Ok(Vec::new());
        }

        if self.entries.len() + pdfs.len() > MAX_FILES {
            return Err(AddFilesError::TooManyFiles {
                current: self.entries.len(),
                incoming: pdfs.len(),
                max: MAX_FILES,
            });
        }

        let admitted = pdfs
            .into_iter()
            .map(|file| {
                let id = EntryId(self.next_id);
                self.next_id += 1;
                self.entries.insert(
                    id,
                    UploadEntry {
                        id,
                        file_name: file.name.clone(),
                        size: file.size,
                        progress: 0,
                        url: None,
                        status: UploadStatus::Pending,
                    },
                );
                (id, file)
            })
            .collect();

        self.generation += 1;
        self.analysis = match std::mem::take(&mut self.analysis) {
            in_flight @ AnalysisState::InFlight { .. } => in_flight,
            _ => AnalysisState::Idle,
        };
        Ok(admitted)
    }

    /// Remove the entry at `index` (selection order). An upload still in
    /// flight for it is not cancelled; its callbacks are ignored from now on.
    pub fn remove_at(&mut self, index: usize) -> Option<UploadEntry> {
        let id = *self.entries.keys().nth(index)?;
        self.remove(id)
    }

    pub fn remove(&mut self, id: EntryId) -> Option<UploadEntry> {
        let removed = self.entries.remove(&id)?;
        self.generation += 1;
        if self.analysis == AnalysisState::Analysed {
            self.analysis = AnalysisState::Idle;
        }
        Some(removed)
    }

    /// Storage progress tick. Returns false when the tick was ignored.
    pub fn on_progress(&mut self, id: EntryId, transferred: u64, total: u64) -> bool {
        let Some(entry) = self.live_entry(id) else {
            return false;
        };
        entry.progress = percent(transferred, total);
        entry.status = UploadStatus::Uploading;
        true
    }

    pub fn on_uploaded(&mut self, id: EntryId, url: String) -> bool {
        let Some(entry) = self.live_entry(id) else {
            return false;
        };
        entry.url = Some(url);
        entry.progress = 100;
        entry.status = UploadStatus::Done;
        true
    }

    pub fn on_upload_failed(&mut self, id: EntryId) -> bool {
        let Some(entry) = self.live_entry(id) else {
            return false;
        };
        entry.status = UploadStatus::Error;
        true
    }

    /// Entry still present and not yet in a terminal state.
    fn live_entry(&mut self, id: EntryId) -> Option<&mut UploadEntry> {
        match self.entries.get_mut(&id) {
            Some(entry) if !entry.status.is_terminal() => Some(entry),
            Some(_) => {
                log::debug!("ignoring late callback for settled entry {id}");
                None
            }
            None => {
                log::debug!("ignoring callback for removed entry {id}");
                None
            }
        }
    }

    pub fn all_uploaded(&self) -> bool {
        !self.entries.is_empty()
            && self
                .entries
                .values()
                .all(|e| e.status == UploadStatus::Done)
    }

    /// Enter the in-flight state and return the URLs to analyse, or `None`
    /// when an entry is not uploaded yet or an analysis is already running.
    pub fn begin_analyse(&mut self) -> Option<AnalyseTicket> {
        if !self.all_uploaded() || self.is_analysing() {
            return None;
        }
        let pdf_urls = self
            .entries
            .values()
            .filter_map(|e| e.url.clone())
            .collect();
        self.analysis = AnalysisState::InFlight {
            generation: self.generation,
        };
        Some(AnalyseTicket {
            generation: self.generation,
            pdf_urls,
        })
    }

    /// Settle the analysis started with the ticket of `generation`.
    /// A success for a set that changed meanwhile is not recorded.
    pub fn finish_analyse(&mut self, generation: u64, result: Result<(), String>) {
        let started = match self.analysis {
            AnalysisState::InFlight { generation } => generation,
            _ => return,
        };
        if started != generation {
            log::debug!("ignoring result of a stale analysis ticket");
            return;
        }
        self.analysis = match result {
            Ok(()) if generation == self.generation => AnalysisState::Analysed,
            Ok(()) => AnalysisState::Idle,
            Err(message) => AnalysisState::Failed(message),
        };
    }

    pub fn analysis(&self) -> &AnalysisState {
        &self.analysis
    }

    pub fn is_analysed(&self) -> bool {
        self.analysis == AnalysisState::Analysed
    }

    pub fn is_analysing(&self) -> bool {
        matches!(self.analysis, AnalysisState::InFlight { .. })
    }

    pub fn analyse_error(&self) -> Option<&str> {
        match &self.analysis {
            AnalysisState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

fn percent(transferred: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = transferred.min(total) as f64 / total as f64;
    (ratio * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str) -> PendingFile<()> {
        PendingFile {
            name: name.to_string(),
            content_type: PDF_CONTENT_TYPE.to_string(),
            size: 1024,
            blob: (),
        }
    }

    fn text(name: &str) -> PendingFile<()> {
        PendingFile {
            content_type: "text/plain".to_string(),
            ..pdf(name)
        }
    }

    fn uploaded_session(names: &[&str]) -> UploadSession {
        let mut session = UploadSession::new();
        let ids: Vec<EntryId> = session
            .add_files(names.iter().map(|n| pdf(n)).collect())
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        for id in ids {
            session.on_uploaded(id, format!("https://files/{id}"));
        }
        session
    }

    #[test]
    fn test_over_cap_batch_is_rejected_whole() {
        let mut session = UploadSession::new();
        let err = session
            .add_files(vec![pdf("a"), pdf("b"), pdf("c"), pdf("d")])
            .unwrap_err();
        assert_eq!(
            err,
            AddFilesError::TooManyFiles {
                current: 0,
                incoming: 4,
                max: 3
            }
        );
        assert!(session.is_empty());
        assert_eq!(err.to_string(), "You can upload a maximum of 3 PDFs.");
    }

    #[test]
    fn test_cap_counts_existing_entries() {
        let mut session = UploadSession::new();
        session.add_files(vec![pdf("a"), pdf("b")]).unwrap();
        assert!(session.add_files(vec![pdf("c"), pdf("d")]).is_err());
        assert_eq!(session.len(), 2);
        assert_eq!(session.add_files(vec![pdf("c")]).unwrap().len(), 1);
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn test_non_pdf_candidates_are_filtered() {
        let mut session = UploadSession::new();
        let admitted = session
            .add_files(vec![text("notes.txt"), pdf("paper.pdf")])
            .unwrap();
        assert_eq!(admitted.len(), 1);
        assert_eq!(admitted[0].1.name, "paper.pdf");

        let before = session.clone();
        assert!(session.add_files(vec![text("x"), text("y")]).unwrap().is_empty());
        assert_eq!(session, before);
    }

    #[test]
    fn test_new_entries_are_pending_in_selection_order() {
        let mut session = UploadSession::new();
        session.add_files(vec![pdf("one"), pdf("two")]).unwrap();
        session.add_files(vec![pdf("three")]).unwrap();
        let names: Vec<&str> = session.entries().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, ["one", "two", "three"]);
        assert!(session
            .entries()
            .all(|e| e.status == UploadStatus::Pending && e.progress == 0 && e.url.is_none()));
    }

    #[test]
    fn test_interleaved_callbacks_hit_their_own_entry() {
        let mut session = UploadSession::new();
        let ids: Vec<EntryId> = session
            .add_files(vec![pdf("a"), pdf("b"), pdf("c")])
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();

        session.on_progress(ids[2], 1, 4);
        session.on_progress(ids[0], 1, 2);
        session.remove(ids[1]);
        assert!(!session.on_progress(ids[1], 3, 4));
        session.on_uploaded(ids[2], "https://files/c".into());

        let a = session.get(ids[0]).unwrap();
        assert_eq!((a.status, a.progress), (UploadStatus::Uploading, 50));
        let c = session.get(ids[2]).unwrap();
        assert_eq!((c.status, c.progress), (UploadStatus::Done, 100));
        assert_eq!(c.url.as_deref(), Some("https://files/c"));
        assert!(session.get(ids[1]).is_none());
    }

    #[test]
    fn test_progress_rounds_and_handles_zero_total() {
        let mut session = UploadSession::new();
        let (id, _) = session.add_files(vec![pdf("a")]).unwrap().remove(0);
        session.on_progress(id, 1, 3);
        assert_eq!(session.get(id).unwrap().progress, 33);
        session.on_progress(id, 2, 3);
        assert_eq!(session.get(id).unwrap().progress, 67);
        session.on_progress(id, 0, 0);
        assert_eq!(session.get(id).unwrap().progress, 0);
    }

    #[test]
    fn test_settled_entries_ignore_late_ticks() {
        let mut session = UploadSession::new();
        let (id, _) = session.add_files(vec![pdf("a")]).unwrap().remove(0);
        session.on_upload_failed(id);
        assert!(!session.on_progress(id, 1, 2));
        assert!(!session.on_uploaded(id, "late".into()));
        assert_eq!(session.get(id).unwrap().status, UploadStatus::Error);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut session = UploadSession::new();
        let (first, _) = session.add_files(vec![pdf("a")]).unwrap().remove(0);
        session.remove_at(0);
        let (second, _) = session.add_files(vec![pdf("a")]).unwrap().remove(0);
        assert_ne!(first, second);
    }

    #[test]
    fn test_analyse_guard_requires_every_entry_done() {
        assert!(UploadSession::new().begin_analyse().is_none());

        let mut session = uploaded_session(&["a"]);
        session.add_files(vec![pdf("b")]).unwrap();
        assert!(session.begin_analyse().is_none());
        assert!(!session.is_analysing());
    }

    #[test]
    fn test_analyse_success_and_single_flight() {
        let mut session = uploaded_session(&["a", "b"]);
        let ticket = session.begin_analyse().unwrap();
        assert_eq!(ticket.pdf_urls, ["https://files/0", "https://files/1"]);
        assert!(session.is_analysing());
        assert!(session.begin_analyse().is_none());

        session.finish_analyse(ticket.generation, Ok(()));
        assert!(session.is_analysed());
        assert!(!session.is_analysing());
        assert_eq!(session.analyse_error(), None);
    }

    #[test]
    fn test_analyse_failure_is_recoverable() {
        let mut session = uploaded_session(&["a"]);
        let ticket = session.begin_analyse().unwrap();
        session.finish_analyse(ticket.generation, Err("Analysis failed".into()));
        assert!(!session.is_analysed());
        assert!(!session.is_analysing());
        assert_eq!(session.analyse_error(), Some("Analysis failed"));

        let retry = session.begin_analyse().unwrap();
        assert_eq!(session.analyse_error(), None);
        session.finish_analyse(retry.generation, Ok(()));
        assert!(session.is_analysed());
    }

    #[test]
    fn test_mutations_reset_analysed() {
        let mut session = uploaded_session(&["a", "b"]);
        let ticket = session.begin_analyse().unwrap();
        session.finish_analyse(ticket.generation, Ok(()));
        session.remove_at(1);
        assert!(!session.is_analysed());

        let ticket = session.begin_analyse().unwrap();
        session.finish_analyse(ticket.generation, Ok(()));
        session.add_files(vec![pdf("c")]).unwrap();
        assert!(!session.is_analysed());
    }

    #[test]
    fn test_adding_files_clears_analyse_error() {
        let mut session = uploaded_session(&["a"]);
        let ticket = session.begin_analyse().unwrap();
        session.finish_analyse(ticket.generation, Err("boom".into()));
        session.add_files(vec![pdf("b")]).unwrap();
        assert_eq!(session.analyse_error(), None);
    }

    #[test]
    fn test_success_for_changed_set_is_not_recorded() {
        let mut session = uploaded_session(&["a", "b"]);
        let ticket = session.begin_analyse().unwrap();
        session.remove_at(0);
        assert!(session.is_analysing());

        session.finish_analyse(ticket.generation, Ok(()));
        assert!(!session.is_analysing());
        assert!(!session.is_analysed());
    }

    #[test]
    fn test_reset_keeps_ids_unique() {
        let mut session = UploadSession::new();
        let (old_id, _) = session.add_files(vec![pdf("old.pdf")]).unwrap().remove(0);
        session.reset();
        assert!(session.is_empty());

        let (new_id, _) = session.add_files(vec![pdf("new.pdf")]).unwrap().remove(0);
        assert_ne!(old_id, new_id);

        // Completion of the upload started before the reset
        assert!(!session.on_uploaded(old_id, "https://files/OLD.pdf".into()));
        let entry = session.get(new_id).unwrap();
        assert_eq!(entry.status, UploadStatus::Pending);
        assert_eq!(entry.url, None);
    }

    #[test]
    fn test_ticket_from_before_reset_is_ignored() {
        let mut session = uploaded_session(&["a"]);
        let old_ticket = session.begin_analyse().unwrap();
        session.reset();
        assert!(!session.is_analysing());

        let (id, _) = session.add_files(vec![pdf("b")]).unwrap().remove(0);
        session.on_uploaded(id, "https://files/b".into());
        let ticket = session.begin_analyse().unwrap();
        assert_ne!(ticket.generation, old_ticket.generation);

        session.finish_analyse(old_ticket.generation, Ok(()));
        assert!(session.is_analysing());
        session.finish_analyse(ticket.generation, Ok(()));
        assert!(session.is_analysed());
    }
}
