//! Actions accepted by the store
//!
//! Every state change goes through one of these. Each slice of [`UiState`]
//! owns its own action enum; this wraps them for a single dispatch entry.
//!
//! [`UiState`]: super::UiState

use super::app::AppAction;
use crate::comments::CommentsAction;
use crate::markup::MarkupAction;
use crate::timeline::{TimelineAction, TimelineUpdate};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    App(AppAction),
    Markup(MarkupAction),
    Timeline(TimelineAction),
    Comments(CommentsAction),
}

impl From<AppAction> for Action {
    fn from(action: AppAction) -> Self {
        Action::App(action)
    }
}

impl From<MarkupAction> for Action {
    fn from(action: MarkupAction) -> Self {
        Action::Markup(action)
    }
}

impl From<TimelineAction> for Action {
    fn from(action: TimelineAction) -> Self {
        Action::Timeline(action)
    }
}

impl From<TimelineUpdate> for Action {
    fn from(update: TimelineUpdate) -> Self {
        Action::Timeline(TimelineAction::SetState(update))
    }
}

impl From<CommentsAction> for Action {
    fn from(action: CommentsAction) -> Self {
        Action::Comments(action)
    }
}
