//! Form status store: a reducer over [`StatusState`] plus a notifier that
//! publishes every change and clears timed messages.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use shared::domain::FileBlob;
use tokio::{sync::watch, task::JoinHandle};
use tracing::debug;

/// How long routine progress messages stay visible.
pub const SHORT_NOTICE: Duration = Duration::from_secs(3);
/// How long results and failures stay visible.
pub const LONG_NOTICE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusState {
    pub processing: bool,
    pub message: String,
    pub file: Option<FileBlob>,
    pub document_url: Option<String>,
    pub verify_file: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusAction {
    SetProcessing,
    ClearProcessing,
    SetMessage(String),
    ClearMessage,
    SetFile(FileBlob),
    ClearFile,
    SetDocumentLocation(String),
    ClearDocumentLocation,
    ToggleVerifyFile,
    ClearVerifyFile,
}

pub fn reduce(state: &StatusState, action: StatusAction) -> StatusState {
    let mut next = state.clone();
    match action {
        StatusAction::SetProcessing => next.processing = true,
        StatusAction::ClearProcessing => {
            next.processing = false;
            next.message.clear();
        }
        StatusAction::SetMessage(message) => next.message = message,
        StatusAction::ClearMessage => next.message.clear(),
        StatusAction::SetFile(file) => next.file = Some(file),
        StatusAction::ClearFile => next.file = None,
        StatusAction::SetDocumentLocation(url) => next.document_url = Some(url),
        StatusAction::ClearDocumentLocation => next.document_url = None,
        StatusAction::ToggleVerifyFile => next.verify_file = !next.verify_file,
        StatusAction::ClearVerifyFile => next.verify_file = false,
    }
    next
}

/// Owns one form's status. At most one message clear and one processing
/// clear are pending at a time; each only replaces its own kind.
pub struct StatusNotifier {
    state: Arc<watch::Sender<StatusState>>,
    message_timer: Mutex<Option<JoinHandle<()>>>,
    processing_timer: Mutex<Option<JoinHandle<()>>>,
}

impl Default for StatusNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusNotifier {
    pub fn new() -> Self {
        let (state, _) = watch::channel(StatusState::default());
        Self {
            state: Arc::new(state),
            message_timer: Mutex::new(None),
            processing_timer: Mutex::new(None),
        }
    }

    pub fn dispatch(&self, action: StatusAction) {
        debug!(?action, "status action");
        self.state
            .send_modify(|state| *state = reduce(state, action));
    }

    pub fn state(&self) -> StatusState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusState> {
        self.state.subscribe()
    }

    /// Shows `message` and clears it after `duration`, replacing any pending message clear.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run_notification(&self, message: impl Into<String>, duration: Duration) {
        self.dispatch(StatusAction::SetMessage(message.into()));
        self.schedule(&self.message_timer, StatusAction::ClearMessage, duration);
    }

    /// Ends the processing phase once the current message has been on screen for `delay`.
    pub fn clear_processing_after(&self, delay: Duration) {
        self.schedule(&self.processing_timer, StatusAction::ClearProcessing, delay);
    }

    fn schedule(
        &self,
        slot: &Mutex<Option<JoinHandle<()>>>,
        action: StatusAction,
        delay: Duration,
    ) {
        let state = Arc::clone(&self.state);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.send_modify(|state| *state = reduce(state, action));
        });
        let previous = slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(timer);
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

impl Drop for StatusNotifier {
    fn drop(&mut self) {
        for slot in [&mut self.message_timer, &mut self.processing_timer] {
            let pending = slot.get_mut().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(pending) = pending {
                pending.abort();
            }
        }
    }
}
