use serde::{Deserialize, Serialize};

use crate::protocol::RecordingId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Secondary panel (bottom/right toolbox)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectedPanel {
    #[default]
    Inspector,
    Console,
    Debugger,
}

/// Primary (left) panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryPanel {
    #[default]
    Explorer,
    Debug,
    Comments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Dev,
    NonDev,
}

/// Viewer canvas geometry, in screenshot pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    pub left: f64,
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppError {
    pub message: String,
    pub action: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    Sharing,
    Login,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub recording_id: Option<RecordingId>,
    pub session_id: Option<String>,
    pub expected_error: Option<AppError>,
    pub unexpected_error: Option<AppError>,
    pub theme: Theme,
    pub selected_panel: SelectedPanel,
    pub selected_primary_panel: PrimaryPanel,
    pub initialized_panels: Vec<SelectedPanel>,
    /// Loading progress, 0..=100
    pub loading: u8,
    pub modal: Option<Modal>,
    pub view_mode: ViewMode,
    pub narrow_mode: bool,
    pub is_node_picker_active: bool,
    pub canvas: Option<Canvas>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            recording_id: None,
            session_id: None,
            expected_error: None,
            unexpected_error: None,
            theme: Theme::default(),
            selected_panel: SelectedPanel::default(),
            selected_primary_panel: PrimaryPanel::default(),
            initialized_panels: Vec::new(),
            loading: 4,
            modal: None,
            view_mode: ViewMode::default(),
            narrow_mode: false,
            is_node_picker_active: false,
            canvas: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    SetupApp(RecordingId),
    SetSessionId(String),
    SetExpectedError(Option<AppError>),
    SetUnexpectedError(Option<AppError>),
    UpdateTheme(Theme),
    SetSelectedPanel(SelectedPanel),
    SetSelectedPrimaryPanel(PrimaryPanel),
    SetInitializedPanel(SelectedPanel),
    Loading(u8),
    SetModal(Option<Modal>),
    SetViewMode(ViewMode),
    SetNarrowMode(bool),
    SetIsNodePickerActive(bool),
    SetCanvas(Option<Canvas>),
}

impl AppState {
    pub fn reduce(&mut self, action: AppAction) {
        match action {
            AppAction::SetupApp(recording_id) => self.recording_id = Some(recording_id),
            AppAction::SetSessionId(id) => self.session_id = Some(id),
            AppAction::SetExpectedError(error) => self.expected_error = error,
            AppAction::SetUnexpectedError(error) => self.unexpected_error = error,
            AppAction::UpdateTheme(theme) => self.theme = theme,
            AppAction::SetSelectedPanel(panel) => self.selected_panel = panel,
            AppAction::SetSelectedPrimaryPanel(panel) => self.selected_primary_panel = panel,
            AppAction::SetInitializedPanel(panel) => {
                if !self.initialized_panels.contains(&panel) {
                    self.initialized_panels.push(panel);
                }
            }
            AppAction::Loading(progress) => self.loading = progress.min(100),
            AppAction::SetModal(modal) => self.modal = modal,
            AppAction::SetViewMode(mode) => self.view_mode = mode,
            AppAction::SetNarrowMode(narrow) => self.narrow_mode = narrow,
            AppAction::SetIsNodePickerActive(active) => self.is_node_picker_active = active,
            AppAction::SetCanvas(canvas) => self.canvas = canvas,
        }
    }
}
