//! Batch import: classify many email files at once.
//!
//! A [`BatchSession`] owns one row per selected file. Classification runs in
//! fixed-size groups: every request of a group is in flight at the same time,
//! and the next group starts only after the whole group has settled. Outcomes
//! are gathered per group and then written to the rows by index, so no
//! completion can overwrite another.
//!
//! Rows live only as long as the session; nothing here is persisted except
//! through promotion, which turns a row into a stored conversation.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::Result;
use crate::classifier::{Classification, ClassifierApi, ClientError, Verdict};
use crate::clock::Clock;
use crate::constants::{DEFAULT_BATCH_SIZE, PREVIEW_CHARS};
use crate::model::{Conversation, Message, Sender};
use crate::store::ConversationStore;

mod errors;
mod loader;
mod preview;
mod sort;

pub use errors::BatchError;
pub use loader::{SelectedFile, read_selection};
pub use preview::make_preview;
pub use sort::{SortKey, SortState, sorted};

/// Classification state of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Pending,
    Spam,
    Ham,
    Error,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Pending => "pending",
            RowStatus::Spam => "spam",
            RowStatus::Ham => "ham",
            RowStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which text is sent to the classifier.
///
/// `Preview` classifies the truncated, whitespace-collapsed preview (what the
/// review tool has always done); `Full` sends the whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifyInput {
    #[default]
    Preview,
    Full,
}

impl std::str::FromStr for ClassifyInput {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "preview" => Ok(ClassifyInput::Preview),
            "full" => Ok(ClassifyInput::Full),
            other => Err(format!("unknown classify input '{other}' (expected preview or full)")),
        }
    }
}

/// Per-file state of a batch import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRow {
    pub name: String,
    pub path: String,
    pub preview: String,
    pub full_text: String,
    pub status: RowStatus,
    pub confidence: Option<f64>,
    pub predicted_class: Option<u8>,
    /// `[ham, spam]`
    pub probabilities: Option<[f64; 2]>,
}

impl FileRow {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        full_text: impl Into<String>,
        preview_chars: usize,
    ) -> Self {
        let full_text = full_text.into();
        Self {
            name: name.into(),
            path: path.into(),
            preview: make_preview(&full_text, preview_chars),
            full_text,
            status: RowStatus::Pending,
            confidence: None,
            predicted_class: None,
            probabilities: None,
        }
    }

    fn reset(&mut self) {
        self.status = RowStatus::Pending;
        self.confidence = None;
        self.predicted_class = None;
        self.probabilities = None;
    }

    fn apply(&mut self, outcome: std::result::Result<Classification, ClientError>) {
        match outcome {
            Ok(classification) => {
                self.status = match classification.verdict {
                    Verdict::Spam => RowStatus::Spam,
                    Verdict::Ham => RowStatus::Ham,
                };
                self.confidence = Some(classification.confidence());
                self.predicted_class = Some(classification.verdict.class());
                self.probabilities = Some(classification.probabilities);
            }
            Err(e) => {
                debug!(path = %self.path, "Classification failed: {e}");
                self.status = RowStatus::Error;
            }
        }
    }

    /// Title for the message created on promotion: the first line of the
    /// preview, or the file name when the preview is empty.
    fn message_title(&self) -> String {
        match self.preview.split('\n').next() {
            Some(line) if !line.is_empty() => line.to_string(),
            _ => self.name.clone(),
        }
    }
}

/// Tuning for a batch session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Requests in flight per group. Zero is treated as one.
    pub batch_size: usize,
    pub preview_chars: usize,
    pub classify_using: ClassifyInput,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            preview_chars: PREVIEW_CHARS,
            classify_using: ClassifyInput::Preview,
        }
    }
}

/// Summary of a `classify_all` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Sequential request groups dispatched.
    pub groups: usize,
    pub spam: usize,
    pub ham: usize,
    pub errors: usize,
}

/// Rows of one batch import.
#[derive(Debug, Clone)]
pub struct BatchSession {
    rows: Vec<FileRow>,
    options: BatchOptions,
}

impl BatchSession {
    /// Build pending rows from already-read files.
    pub fn from_files(files: Vec<SelectedFile>, options: BatchOptions) -> Self {
        let rows = files
            .into_iter()
            .map(|f| FileRow::new(f.name, f.path, f.content, options.preview_chars))
            .collect();
        Self { rows, options }
    }

    /// Read `paths` (files or folders) and build pending rows.
    pub async fn load<P: AsRef<Path>>(paths: &[P], options: BatchOptions) -> Result<Self> {
        let files = read_selection(paths).await?;
        Ok(Self::from_files(files, options))
    }

    pub fn rows(&self) -> &[FileRow] {
        &self.rows
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Row shown in the context view for `path`.
    pub fn row_by_path(&self, path: &str) -> Option<&FileRow> {
        self.rows.iter().find(|r| r.path == path)
    }

    /// Index of the row for `path`.
    pub fn position(&self, path: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.path == path)
    }

    /// Rows in display order.
    pub fn sorted(&self, state: SortState) -> Vec<&FileRow> {
        sorted(&self.rows, state)
    }

    fn input_for(&self, row: &FileRow) -> String {
        match self.options.classify_using {
            ClassifyInput::Preview => row.preview.clone(),
            ClassifyInput::Full => row.full_text.clone(),
        }
    }

    /// Classify every row. See [`classify_all_with_progress`](Self::classify_all_with_progress).
    pub async fn classify_all(&mut self, api: Arc<dyn ClassifierApi>) -> BatchReport {
        self.classify_all_with_progress(api, |_, _| {}).await
    }

    /// Classify every row in sequential groups of `batch_size`.
    ///
    /// All rows are reset to pending first. Failed rows are marked as errors
    /// and not retried. `progress` is called after each group with the number
    /// of rows settled so far and the total.
    pub async fn classify_all_with_progress<F>(
        &mut self,
        api: Arc<dyn ClassifierApi>,
        mut progress: F,
    ) -> BatchReport
    where
        F: FnMut(usize, usize),
    {
        let total = self.rows.len();
        let group_size = self.options.batch_size.max(1);
        let mut report = BatchReport::default();

        for row in &mut self.rows {
            row.reset();
        }

        let mut start = 0;
        while start < total {
            let end = (start + group_size).min(total);
            report.groups += 1;

            let span = info_span!("classify_group", group = report.groups, start, end);
            let outcomes = self
                .run_group(&api, start, end)
                .instrument(span)
                .await;

            for (offset, outcome) in outcomes.into_iter().enumerate() {
                let row = &mut self.rows[start + offset];
                match outcome {
                    Some(outcome) => row.apply(outcome),
                    None => {
                        warn!(path = %row.path, "Classification task did not complete");
                        row.status = RowStatus::Error;
                    }
                }
            }

            progress(end, total);
            start = end;
        }

        for row in &self.rows {
            match row.status {
                RowStatus::Spam => report.spam += 1,
                RowStatus::Ham => report.ham += 1,
                RowStatus::Error => report.errors += 1,
                RowStatus::Pending => {}
            }
        }
        info!(
            files = total,
            groups = report.groups,
            spam = report.spam,
            ham = report.ham,
            errors = report.errors,
            "Batch classification finished"
        );
        report
    }

    /// Dispatch rows `start..end` concurrently and wait for all of them.
    ///
    /// Slot `i` of the result belongs to row `start + i`; `None` means the
    /// task panicked or was cancelled.
    async fn run_group(
        &self,
        api: &Arc<dyn ClassifierApi>,
        start: usize,
        end: usize,
    ) -> Vec<Option<std::result::Result<Classification, ClientError>>> {
        let mut set = JoinSet::new();
        for index in start..end {
            let api = Arc::clone(api);
            let text = self.input_for(&self.rows[index]);
            set.spawn(async move { (index, api.classify(&text).await) });
        }
        debug!(requests = end - start, "Dispatched group");

        let mut outcomes: Vec<Option<_>> = (start..end).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index - start] = Some(outcome),
                Err(e) => warn!("Classification task join error: {e}"),
            }
        }
        outcomes
    }

    /// Turn row `index` into a new conversation holding its full text as a
    /// single scammer message.
    ///
    /// Pending and errored rows cannot be promoted.
    pub async fn promote(
        &self,
        index: usize,
        store: &ConversationStore,
        clock: &dyn Clock,
    ) -> Result<Conversation> {
        let row = self
            .rows
            .get(index)
            .ok_or(BatchError::NoSuchRow { index })?;
        if matches!(row.status, RowStatus::Pending | RowStatus::Error) {
            return Err(BatchError::NotPromotable {
                path: row.path.clone(),
                status: row.status,
            }
            .into());
        }
        promote_row(row, store, clock).await
    }

    /// Promote every row currently marked spam, in row order.
    pub async fn promote_all_spam(
        &self,
        store: &ConversationStore,
        clock: &dyn Clock,
    ) -> Result<Vec<Conversation>> {
        let mut created = Vec::new();
        for row in self.rows.iter().filter(|r| r.status == RowStatus::Spam) {
            created.push(promote_row(row, store, clock).await?);
        }
        info!(count = created.len(), "Added spam emails to conversations");
        Ok(created)
    }
}

async fn promote_row(
    row: &FileRow,
    store: &ConversationStore,
    clock: &dyn Clock,
) -> Result<Conversation> {
    let message = Message::new(Sender::Scammer, row.full_text.clone(), clock.now_millis())
        .with_title(row.message_title());
    let conversation = store
        .create(clock, |id| Conversation {
            id,
            title: row.name.clone(),
            messages: vec![message.clone()],
        })
        .await?;
    debug!(id = %conversation.id, path = %row.path, "Promoted row");
    Ok(conversation)
}
