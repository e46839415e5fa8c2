//! Rendering helpers over Ratatui's TestBackend

use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use replay_devtools::App;

pub fn create_test_terminal_sized(width: u16, height: u16) -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(width, height)).expect("Failed to create test terminal")
}

/// One row of the buffer per line, trailing spaces trimmed
pub fn buffer_to_trimmed_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut lines = Vec::with_capacity(area.height as usize);
    for y in area.y..area.y + area.height {
        let mut line = String::new();
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                line.push_str(cell.symbol());
            }
        }
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

/// Draw the app twice: the first frame reports canvas and timeline sizes
/// back to the store, the second shows their effect
pub fn render_app(app: &mut App, width: u16, height: u16) -> String {
    let mut terminal = create_test_terminal_sized(width, height);
    for _ in 0..2 {
        terminal.draw(|f| app.draw(f)).expect("draw");
    }
    buffer_to_trimmed_string(terminal.backend().buffer())
}

/// Screen row containing `text`, if any
pub fn row_of(screen: &str, text: &str) -> Option<u16> {
    screen
        .lines()
        .position(|line| line.contains(text))
        .map(|row| row as u16)
}
