//! Central UI state store
//!
//! One [`UiState`] value, changed only through [`Store::dispatch`]. Reducers
//! run inside `watch::Sender::send_modify`, so dispatches are serialized and
//! applied in the order they are issued. Views subscribe to the watch channel
//! and redraw from a fresh snapshot whenever it changes.

pub mod action;
pub mod app;

use std::sync::Arc;

use tokio::sync::watch;

use crate::comments::CommentsState;
use crate::markup::MarkupState;
use crate::timeline::TimelineState;

pub use action::Action;
pub use app::{AppAction, AppError, AppState, Canvas, Modal, PrimaryPanel, SelectedPanel, Theme, ViewMode};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub app: AppState,
    pub markup: MarkupState,
    pub timeline: TimelineState,
    pub comments: CommentsState,
}

impl UiState {
    pub fn reduce(&mut self, action: Action) {
        match action {
            Action::App(action) => self.app.reduce(action),
            Action::Markup(action) => self.markup.reduce(action),
            Action::Timeline(action) => self.timeline.reduce(action),
            Action::Comments(action) => self.comments.reduce(action),
        }
    }
}

/// Cheaply cloneable handle to the shared state
#[derive(Clone)]
pub struct Store {
    tx: Arc<watch::Sender<UiState>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(UiState::default())
    }
}

impl Store {
    pub fn new(initial: UiState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Apply an action and notify subscribers
    pub fn dispatch(&self, action: impl Into<Action>) {
        let action = action.into();
        tracing::trace!(?action, "dispatch");
        self.tx.send_modify(|state| state.reduce(action));
    }

    /// Read from the current state without cloning it.
    ///
    /// The closure runs under the channel's read lock, so it must not
    /// dispatch.
    pub fn read<R>(&self, f: impl FnOnce(&UiState) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> UiState {
        self.tx.borrow().clone()
    }

    /// Receiver that is marked changed after every dispatch
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.tx.subscribe()
    }
}
