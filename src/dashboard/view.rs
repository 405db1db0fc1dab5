use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table},
};
use tracing::warn;

use crate::model::attendance::AttendanceRecord;

/// The three things a dashboard can change on screen.
pub trait DashboardView {
    /// Replaces every displayed row.
    fn show_rows(&mut self, rows: &[AttendanceRecord]);
    /// Sets the "last scan" status text.
    fn show_scan_info(&mut self, text: &str);
}

/// Full-screen board drawn with ratatui.
pub struct TerminalView<B: Backend> {
    terminal: Terminal<B>,
    rows: Vec<AttendanceRecord>,
    scan_info: String,
}

impl<B: Backend> TerminalView<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        TerminalView {
            terminal,
            rows: Vec::new(),
            scan_info: "Waiting for scans…".to_string(),
        }
    }

    fn redraw(&mut self) {
        let rows = &self.rows;
        let scan_info = &self.scan_info;
        if let Err(e) = self
            .terminal
            .draw(|frame| render(frame, rows, scan_info))
        {
            warn!(error = %e, "Failed to draw board");
        }
    }
}

impl<B: Backend> DashboardView for TerminalView<B> {
    fn show_rows(&mut self, rows: &[AttendanceRecord]) {
        self.rows = rows.to_vec();
        self.redraw();
    }

    fn show_scan_info(&mut self, text: &str) {
        self.scan_info = text.to_string();
        self.redraw();
    }
}

/// Students still in the library stand out; everyone else is plain.
pub fn row_style(record: &AttendanceRecord) -> Style {
    if record.is_in_library() {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

pub fn render(frame: &mut Frame, rows: &[AttendanceRecord], scan_info: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Last scan
            Constraint::Min(4),    // Table
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_scan_info(frame, scan_info, chunks[0]);
    render_table(frame, rows, chunks[1]);
    render_footer(frame, chunks[2]);
}

fn render_scan_info(frame: &mut Frame, scan_info: &str, area: Rect) {
    let info = Paragraph::new(Line::from(vec![
        Span::raw(" Last scan: "),
        Span::styled(
            scan_info,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" LIBRARY ATTENDANCE "),
    );

    frame.render_widget(info, area);
}

fn render_table(frame: &mut Frame, rows: &[AttendanceRecord], area: Rect) {
    let header = Row::new(vec![
        " Roll", "Name", "Class", "Date", "In Time", "Out Time", "Status",
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
    .height(1);

    let body: Vec<Row> = rows
        .iter()
        .map(|r| {
            Row::new(vec![
                format!(" {}", r.roll),
                r.name.clone(),
                r.class_name.clone(),
                r.date.clone(),
                r.in_time.clone(),
                r.out_time.clone(),
                r.status.clone(),
            ])
            .style(row_style(r))
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Min(16),
        Constraint::Length(7),
        Constraint::Length(11),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(11),
    ];

    let table = Table::new(body, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Attendance ({}) ", rows.len()))
            .border_style(Style::default().fg(Color::Blue)),
    );

    frame.render_widget(table, area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled(" r", Style::default().fg(Color::Yellow)),
        Span::raw(" + Enter: refresh   "),
        Span::styled("Ctrl+C", Style::default().fg(Color::Yellow)),
        Span::raw(": quit"),
    ]));

    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn record(roll: &str, status: &str) -> AttendanceRecord {
        AttendanceRecord {
            roll: roll.into(),
            name: format!("Student {roll}"),
            status: status.into(),
            ..Default::default()
        }
    }

    fn screen(view: &TerminalView<TestBackend>) -> (Vec<String>, Vec<Color>) {
        let buffer = view.terminal.backend().buffer();
        let width = buffer.area.width as usize;
        let lines: Vec<String> = buffer
            .content
            .chunks(width)
            .map(|cells| cells.iter().map(|c| c.symbol()).collect())
            .collect();
        let colors: Vec<Color> = buffer.content.iter().map(|c| c.fg).collect();
        (lines, colors)
    }

    /// Foreground colour of the first cell of `needle` on screen.
    fn color_of(view: &TerminalView<TestBackend>, needle: &str) -> Color {
        let (lines, colors) = screen(view);
        let width = view.terminal.backend().buffer().area.width as usize;
        let (y, line) = lines
            .iter()
            .enumerate()
            .find(|(_, l)| l.contains(needle))
            .unwrap();
        let x = line[..line.find(needle).unwrap()].chars().count();
        colors[y * width + x]
    }

    #[test]
    fn board_draws_rows_and_status() {
        let terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        let mut view = TerminalView::new(terminal);

        view.show_rows(&[record("R5", "In Library"), record("R6", "Completed")]);
        view.show_scan_info("R5 — Walk-In @ now");

        let (lines, _) = screen(&view);
        let text = lines.join("\n");
        assert!(text.contains("Last scan: R5 — Walk-In @ now"));
        assert!(text.contains("Attendance (2)"));
        assert!(text.contains("Student R6"));
    }

    #[test]
    fn present_students_are_highlighted() {
        let terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        let mut view = TerminalView::new(terminal);

        view.show_rows(&[record("R5", "In Library"), record("R6", "Completed")]);

        assert_eq!(color_of(&view, "Student R5"), Color::Green);
        assert_ne!(color_of(&view, "Student R6"), Color::Green);
    }
}
