use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::{mpsc, watch};

use crate::auth::{ListenerId, TokenManager};
use crate::comments::{CommentEditor, CommentStore};
use crate::config::{Config, KeyContext};
use crate::markup::{render_tree, MarkupLine, NodeId};
use crate::session::DevtoolsSession;
use crate::store::{AppAction, Canvas, Modal, UiState};
use crate::timeline::ZoomRegion;
use crate::ui::action::Action;
use crate::ui::components::{
    keybinding_entries, select_relative, time_at_column, track_area, visible_node_ids,
    CommentBox, Footer, FooterContext, HelpOverlay, LoadingProgress, LoadingSkeleton, MarkupHit,
    MarkupView, MarkupViewState, TimelineBar,
};
use crate::ui::components::theme::{ACCENT_PRIMARY, TEXT_MUTED, TEXT_PRIMARY, TEXT_SECONDARY};
use crate::ui::events::AppEvent;
use crate::ui::terminal_guard::TerminalGuard;

/// Zooming in never shows less than this much of the recording
const MIN_ZOOM_SPAN_MS: f64 = 100.0;

/// Main application state
pub struct App {
    config: Config,
    session: DevtoolsSession,
    editor: CommentEditor,
    tokens: Option<(Arc<TokenManager>, ListenerId)>,
    markup_view: MarkupViewState,
    loading: LoadingProgress,
    /// Footer message and whether it is an error
    status: Option<(String, bool)>,
    should_quit: bool,
    timeline_area: Rect,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    state_rx: watch::Receiver<UiState>,
}

impl App {
    pub fn new(config: Config, session: DevtoolsSession, comments: Arc<dyn CommentStore>) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let editor = CommentEditor::new(session.store().clone(), session.thread(), comments);
        let state_rx = session.store().subscribe();

        Self {
            config,
            session,
            editor,
            tokens: None,
            markup_view: MarkupViewState::new(),
            loading: LoadingProgress::new(),
            status: None,
            should_quit: false,
            timeline_area: Rect::default(),
            event_tx,
            event_rx,
            state_rx,
        }
    }

    /// Report token changes in the footer
    pub fn with_tokens(mut self, tokens: Arc<TokenManager>) -> Self {
        let tx = self.event_tx.clone();
        let id = tokens.add_listener(Arc::new(move |state| {
            let _ = tx.send(AppEvent::TokenChanged(state.clone()));
        }));
        self.tokens = Some((tokens, id));
        self
    }

    pub fn session(&self) -> &DevtoolsSession {
        &self.session
    }

    pub fn editor(&self) -> &CommentEditor {
        &self.editor
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(message, _)| message.as_str())
    }

    /// Load the recording and start the session
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.session.start().await?;
        Ok(())
    }

    /// Run the application main loop
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut guard = TerminalGuard::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        terminal.clear()?;

        // Skeleton is up while the recording loads
        terminal.draw(|f| self.draw(f))?;
        let result = match self.start().await {
            Ok(()) => self.event_loop(&mut terminal).await,
            Err(e) => Err(e),
        };

        self.shutdown();
        guard.cleanup()?;
        terminal.show_cursor()?;
        result
    }

    fn shutdown(&mut self) {
        self.session.shutdown();
        if let Some((tokens, id)) = self.tokens.take() {
            tokens.remove_listener(id);
            tokens.dispose();
        }
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            tokio::select! {
                // Terminal input + tick
                _ = tokio::time::sleep(Duration::from_millis(16)) => {
                    while event::poll(Duration::from_millis(0))? {
                        match event::read()? {
                            Event::Key(key) if key.kind == KeyEventKind::Press => {
                                self.handle_key_event(key);
                            }
                            Event::Mouse(mouse) => self.handle_mouse_event(mouse),
                            _ => {}
                        }
                    }

                    self.tick();
                }

                Some(event) = self.event_rx.recv() => {
                    self.handle_app_event(event);
                }

                // Redraw as soon as the store changes
                Ok(()) = self.state_rx.changed() => {
                    self.state_rx.borrow_and_update();
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Advance the loading bar until the app is shown
    pub fn tick(&mut self) {
        if !self.loading.is_finished() {
            let progress = self.session.store().read(|s| s.app.loading);
            self.loading.tick(progress);
        }
    }

    pub fn is_loading(&self) -> bool {
        !self.loading.is_finished()
    }

    /// Keys go to the comment editor while a comment is pending
    fn key_context(&self) -> KeyContext {
        if self
            .session
            .store()
            .read(|s| s.comments.pending_comment.is_some())
        {
            KeyContext::CommentEditor
        } else {
            KeyContext::Inspector
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let context = self.key_context();
        let action = self.config.keybindings.action_for_event(&key, context);

        match action {
            Some(action) => self.handle_action(action),
            None if context == KeyContext::CommentEditor => {
                if let KeyCode::Char(c) = key.code {
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    {
                        self.editor.insert_char(c);
                    }
                }
            }
            None => {}
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        tracing::debug!(?action, "Action");
        let timeline = self.session.timeline();

        match action {
            Action::Quit => self.should_quit = true,
            Action::ShowHelp => self
                .session
                .store()
                .dispatch(AppAction::SetModal(Some(Modal::Help))),
            Action::Cancel => self.cancel(),

            Action::SelectNext => self.move_selection(1),
            Action::SelectPrev => self.move_selection(-1),
            Action::SelectPageDown => self.move_selection(self.page_size()),
            Action::SelectPageUp => self.move_selection(-self.page_size()),
            Action::Expand => self.expand_selected(),
            Action::Collapse => self.collapse_selected(),
            Action::ShowEventListeners => self.toggle_event_listeners(),
            Action::ToggleWhitespace => {
                let options = &mut self.config.inspector;
                options.show_whitespace_nodes = !options.show_whitespace_nodes;
            }

            Action::TogglePlayback => timeline.toggle_playback(),
            Action::NextPaint => timeline.go_to_next_paint(),
            Action::PrevPaint => timeline.go_to_prev_paint(),
            Action::ReplayPlayback => timeline.replay_playback(),
            Action::ZoomIn => self.zoom_in(),
            Action::ResetZoom => {
                let end = self.session.store().read(|s| {
                    s.timeline
                        .recording_duration
                        .unwrap_or(s.timeline.zoom_region.end_time)
                });
                timeline.set_zoom_region(ZoomRegion::new(0.0, end));
            }

            Action::StartComment => {
                if !self.editor.begin_comment() {
                    self.set_status("No recording loaded", true);
                }
            }
            Action::SubmitComment => self.submit_comment(),
            Action::Backspace => self.editor.backspace(),
        }
    }

    fn cancel(&mut self) {
        let store = self.session.store();
        let (modal, pending, tooltip) = store.read(|s| {
            (
                s.app.modal,
                s.comments.pending_comment.is_some(),
                s.markup.event_tooltip().is_some(),
            )
        });

        if modal.is_some() {
            store.dispatch(AppAction::SetModal(None));
        } else if pending {
            self.editor.cancel();
        } else if tooltip {
            self.session.markup().hide_event_tooltip();
        } else {
            self.status = None;
        }
    }

    fn page_size(&self) -> isize {
        self.markup_view.viewport_height().max(1) as isize
    }

    fn move_selection(&mut self, delta: isize) {
        let snapshot = self.session.store().snapshot();
        let nodes = render_tree(&snapshot.markup, self.config.inspector);
        let rows = visible_node_ids(&nodes);
        if let Some(id) = select_relative(&rows, snapshot.markup.selected_node_id(), delta) {
            self.session.markup().select_node(&id);
        }
    }

    /// Expand a collapsed node, or step into an expanded one
    fn expand_selected(&mut self) {
        let selected = self.session.store().read(|s| {
            s.markup
                .selected_node_id()
                .and_then(|id| s.markup.node(id))
                .map(|node| (node.id.clone(), node.can_expand(), node.is_expanded))
        });

        match selected {
            Some((id, true, false)) => self.session.markup().toggle_node_expanded(&id, false),
            Some(_) => self.move_selection(1),
            None => self.move_selection(1),
        }
    }

    /// Collapse an expanded node, or jump to its parent
    fn collapse_selected(&mut self) {
        let selected = self.session.store().read(|s| {
            let node = s.markup.selected_node_id().and_then(|id| s.markup.node(id))?;
            // The document root has no row to select
            let parent = node
                .parent_id
                .clone()
                .filter(|parent| s.markup.root_node_id() != Some(parent));
            Some((node.id.clone(), node.can_expand() && node.is_expanded, parent))
        });

        let Some((id, is_expanded, parent)) = selected else {
            return;
        };
        if is_expanded {
            self.session.markup().toggle_node_expanded(&id, true);
        } else if let Some(parent) = parent {
            self.session.markup().reveal_node(&parent);
        }
    }

    fn toggle_event_listeners(&mut self) {
        let selected = self.session.store().read(|s| {
            let id = s.markup.selected_node_id()?;
            let showing = s.markup.event_tooltip().map(|t| &t.node_id) == Some(id);
            let has_listeners = s.markup.node(id).is_some_and(|n| n.has_event_listeners);
            Some((id.clone(), showing, has_listeners))
        });

        match selected {
            Some((_, true, _)) => self.session.markup().hide_event_tooltip(),
            Some((id, false, true)) => self.load_event_tooltip(id),
            Some((_, false, false)) => self.set_status("No event listeners on this node", false),
            None => {}
        }
    }

    fn load_event_tooltip(&self, id: NodeId) {
        let markup = self.session.markup().clone();
        tokio::spawn(async move {
            markup.show_event_tooltip(&id).await;
        });
    }

    /// Halve the visible window around the playhead
    fn zoom_in(&mut self) {
        let (current_time, zoom, duration) = self.session.store().read(|s| {
            (
                s.timeline.current_time,
                s.timeline.zoom_region,
                s.timeline.recording_duration.unwrap_or(s.timeline.zoom_region.end_time),
            )
        });

        let span = (zoom.duration() / 2.0).max(MIN_ZOOM_SPAN_MS);
        if span >= zoom.duration() {
            return;
        }
        let start = (current_time - span / 2.0).clamp(0.0, (duration - span).max(0.0));
        let mut region = ZoomRegion::new(start, start + span);
        region.scale = duration / span;
        self.session.timeline().set_zoom_region(region);
    }

    fn submit_comment(&mut self) {
        let Some(target) = self
            .session
            .store()
            .read(|s| s.comments.pending_comment.as_ref().map(|p| p.comment.clone()))
        else {
            return;
        };

        let mut editor = self.editor.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = editor.save(&target).await.map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::CommentSaved(result));
        });
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CommentSaved(Ok(Some(_))) => {
                self.editor.clear();
                self.set_status("Comment saved", false);
            }
            AppEvent::CommentSaved(Ok(None)) => {}
            AppEvent::CommentSaved(Err(e)) => {
                tracing::warn!(error = %e, "Failed to save comment");
                self.set_status(&format!("Comment not saved: {e}"), true);
            }
            AppEvent::TokenChanged(state) => match (state.token, state.error) {
                (_, Some(error)) => self.set_status(&format!("Not signed in: {error}"), true),
                (Some(_), None) => self.set_status("Signed in", false),
                (None, None) => {}
            },
            AppEvent::Status(message) => self.set_status(&message, false),
            AppEvent::Error(message) => {
                tracing::warn!(error = %message, "App error");
                self.set_status(&message, true);
            }
            AppEvent::Quit => self.should_quit = true,
        }
    }

    /// Handle events already queued by background tasks, without waiting
    pub fn handle_pending_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_app_event(event);
        }
    }

    fn set_status(&mut self, message: &str, is_error: bool) {
        self.status = Some((message.to_string(), is_error));
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        let timeline_hit = time_at_column(
            self.timeline_area,
            &self.session.store().read(|s| s.timeline.zoom_region),
            mouse.column,
        )
        .filter(|_| mouse.row == self.timeline_area.y);

        match mouse.kind {
            MouseEventKind::Moved => {
                self.hover_markup(mouse.column, mouse.row);
                match timeline_hit {
                    Some(time) => {
                        let offset = mouse.column.saturating_sub(self.timeline_area.x);
                        self.session
                            .timeline()
                            .set_timeline_to_time(time, f64::from(offset));
                    }
                    None => {
                        if self.session.store().read(|s| s.timeline.hover_time.is_some()) {
                            self.session.timeline().hide_tooltip();
                        }
                    }
                }
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(time) = timeline_hit {
                    self.session.timeline().seek_to_time(time);
                    return;
                }
                match self.markup_view.hit_test(mouse.column, mouse.row) {
                    Some(MarkupHit::Row(id)) => {
                        self.session.markup().select_node(&id);
                    }
                    Some(MarkupHit::Expander(id)) => {
                        let expanded = self.session.store().read(|s| {
                            s.markup.node(&id).is_some_and(|node| node.is_expanded)
                        });
                        self.session.markup().toggle_node_expanded(&id, expanded);
                    }
                    Some(MarkupHit::Badge(id)) => self.load_event_tooltip(id),
                    None => {}
                }
            }
            MouseEventKind::ScrollDown => self.markup_view.offset += 3,
            MouseEventKind::ScrollUp => {
                self.markup_view.offset = self.markup_view.offset.saturating_sub(3)
            }
            _ => {}
        }
    }

    fn hover_markup(&mut self, column: u16, row: u16) {
        let hovered = self
            .session
            .store()
            .read(|s| s.markup.hovered_node_id().cloned());
        let target = match self.markup_view.hit_test(column, row) {
            Some(MarkupHit::Row(id) | MarkupHit::Expander(id) | MarkupHit::Badge(id)) => Some(id),
            None => None,
        };

        if hovered == target {
            return;
        }
        if let Some(previous) = hovered {
            self.session.markup().mouse_leave_node(&previous);
        }
        if let Some(id) = target {
            self.session.markup().mouse_enter_node(&id);
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.area();
        let snapshot = self.session.store().snapshot();

        if !self.loading.is_finished() {
            f.render_widget(
                LoadingSkeleton::new(&self.loading, snapshot.app.loading)
                    .content("Loading recording..."),
                size,
            );
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),    // Markup + details
                Constraint::Length(2), // Timeline
                Constraint::Length(1), // Footer
            ])
            .split(size);

        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[0]);

        self.draw_markup(f, main[0], &snapshot);
        self.draw_details(f, main[1], &snapshot);

        self.timeline_area = chunks[1];
        let track = track_area(chunks[1]);
        let dimensions = snapshot.timeline.timeline_dimensions;
        if dimensions.width != f64::from(track.width)
            || dimensions.left != f64::from(track.x)
            || dimensions.top != f64::from(track.y)
        {
            self.session.timeline().update_timeline_dimensions(
                f64::from(track.width),
                f64::from(track.x),
                f64::from(track.y),
            );
        }
        f.render_widget(TimelineBar::new(&snapshot.timeline), chunks[1]);

        let context = if snapshot.comments.pending_comment.is_some() {
            FooterContext::CommentEditor
        } else {
            FooterContext::Inspector
        };
        let error = snapshot
            .app
            .expected_error
            .as_ref()
            .or(snapshot.app.unexpected_error.as_ref());
        let (status, is_error) = match (&self.status, error) {
            (Some((message, is_error)), _) => (Some(message.as_str()), *is_error),
            (None, Some(error)) => (Some(error.message.as_str()), true),
            (None, None) => (None, false),
        };
        f.render_widget(Footer::new(context).status(status, is_error), chunks[2]);

        if let Some(pending) = &snapshot.comments.pending_comment {
            let area = CommentBox::area(chunks[0]);
            let comment_box = CommentBox::new(pending, self.editor.buffer());
            let (cx, cy) = comment_box.cursor_position(area);
            f.render_widget(comment_box, area);
            f.set_cursor_position((cx, cy));
        }

        if snapshot.app.modal == Some(Modal::Help) {
            let entries = keybinding_entries(&self.config.keybindings, KeyContext::Inspector);
            f.render_widget(HelpOverlay::new(&entries), size);
        }
    }

    fn draw_markup(&mut self, f: &mut Frame, area: Rect, snapshot: &UiState) {
        let nodes = render_tree(&snapshot.markup, self.config.inspector);
        let lines: Vec<MarkupLine<'_>> = nodes.iter().flat_map(|n| n.lines()).collect();

        let block = Block::default()
            .title(" Elements ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(TEXT_MUTED));
        let height = block.inner(area).height as usize;

        if self.markup_view.layout(&lines, height).is_some() {
            self.session.markup().clear_scroll_into_view();
        }

        let view = MarkupView::new(&nodes).block(block);
        f.render_stateful_widget(view, area, &mut self.markup_view);
    }

    /// Viewer stand-in: what is painted, the selected node and its listeners
    fn draw_details(&mut self, f: &mut Frame, area: Rect, snapshot: &UiState) {
        let block = Block::default()
            .title(" Viewer ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(TEXT_MUTED));
        let inner = block.inner(area);

        let canvas = Canvas {
            width: f64::from(inner.width),
            height: f64::from(inner.height),
            scale: 1.0,
            left: f64::from(inner.x),
            top: f64::from(inner.y),
        };
        if snapshot.app.canvas != Some(canvas) {
            self.session
                .store()
                .dispatch(AppAction::SetCanvas(Some(canvas)));
        }

        let label = Style::default().fg(TEXT_SECONDARY);
        let value = Style::default().fg(TEXT_PRIMARY);
        let heading = Style::default()
            .fg(ACCENT_PRIMARY)
            .add_modifier(Modifier::BOLD);

        let mut lines = Vec::new();
        let timeline = &snapshot.timeline;
        lines.push(Line::from(vec![
            Span::styled("Screen  ", label),
            match &timeline.screenshot {
                Some(screen) => Span::styled(screen.hash.clone(), value),
                None => Span::styled("(none)", Style::default().fg(TEXT_MUTED)),
            },
        ]));
        if let Some(mouse) = &timeline.mouse {
            lines.push(Line::from(vec![
                Span::styled("Mouse   ", label),
                Span::styled(
                    format!("{:?} at ({:.0}, {:.0})", mouse.kind, mouse.x, mouse.y),
                    value,
                ),
            ]));
        }

        let markup = &snapshot.markup;
        if let Some(node) = markup.selected_node_id().and_then(|id| markup.node(id)) {
            lines.push(Line::raw(""));
            lines.push(Line::styled(node.display_name.clone(), heading));
            for attr in &node.attributes {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {} ", attr.name), label),
                    Span::styled(attr.value.clone(), value),
                ]));
            }
        }

        if let Some(tooltip) = markup.event_tooltip() {
            lines.push(Line::raw(""));
            lines.push(Line::styled("Event listeners", heading));
            for listener in &tooltip.listeners {
                let mut spans = vec![Span::styled(format!("  {}", listener.event_type), value)];
                if listener.capture {
                    spans.push(Span::styled(" (capture)", label));
                }
                if let Some(handler) = &listener.handler {
                    spans.push(Span::styled(format!("  {handler}"), label));
                }
                lines.push(Line::from(spans));
            }
        }

        f.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }
}
