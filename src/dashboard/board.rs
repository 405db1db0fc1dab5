use std::io::{self, Stdout};

use anyhow::{Context, Result, anyhow, bail};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::dashboard::controller::Dashboard;
use crate::dashboard::source::HttpAttendanceSource;
use crate::dashboard::view::TerminalView;
use crate::push::PushEvent;

type BoardView = TerminalView<CrosstermBackend<Stdout>>;

/// Terminal attendance board for a remote desk server.
///
/// Loads the table, then follows the push stream until it closes. A line
/// starting with `r` on stdin forces a refresh.
pub async fn run_board(base_url: &str) -> Result<()> {
    let base_url = base_url.trim_end_matches('/');
    let client = reqwest::Client::new();

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut board = Dashboard::new(
        HttpAttendanceSource::new(client.clone(), base_url),
        TerminalView::new(terminal),
    );
    let result = follow(&mut board, &client, base_url).await;

    execute!(io::stdout(), LeaveAlternateScreen)?;
    result
}

async fn follow(
    board: &mut Dashboard<HttpAttendanceSource, BoardView>,
    client: &reqwest::Client,
    base_url: &str,
) -> Result<()> {
    let _ = board.load_attendance().await;

    let events_url = format!("{base_url}/api/events");
    let resp = client
        .get(&events_url)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .with_context(|| format!("Failed to open push channel at {events_url}"))?;
    info!(url = %events_url, "Push channel open");

    let mut events = resp.bytes_stream().eventsource();
    let mut commands = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = events.next() => {
                let Some(event) = event else {
                    bail!("Push channel closed by server");
                };
                let event = event.map_err(|e| anyhow!("Push channel read failed: {e}"))?;
                match PushEvent::from_wire(&event.event, &event.data) {
                    Ok(Some(push)) => board.handle(push).await,
                    Ok(None) => {}
                    Err(e) => warn!(event = %event.event, error = %e, "Malformed push message"),
                }
            }
            line = commands.next_line(), if stdin_open => {
                match line? {
                    Some(cmd) if cmd.trim().starts_with('r') => {
                        let _ = board.load_attendance().await;
                    }
                    Some(_) => {}
                    None => stdin_open = false,
                }
            }
        }
    }
}
