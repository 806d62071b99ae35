//! TUI implementation for parley

use std::time::Instant;

use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::mpsc;

use parley_chat::{ERROR_PREFIX, Session, SessionEvent};
use parley_client::{Message, Role};
use parley_tui::{
    Theme,
    input::{Action, key_to_action},
    widgets::{ChatMessage, InputBox, MessageList, Spinner, message_list::transcript_height},
};

/// Messages sent from UI state to the main loop
#[derive(Debug)]
enum UiMessage {
    /// User submitted the current input
    Submit,
    /// User requested quit
    Quit,
}

/// TUI application state
struct TuiState {
    /// Rendered transcript, fed by session events
    messages: Vec<ChatMessage>,
    /// Input box
    input: InputBox,
    /// Current scroll position in lines
    scroll: usize,
    /// Whether a request is in flight
    is_pending: bool,
    /// Current status line text
    status: String,
    /// Theme
    theme: Theme,
    /// Endpoint shown in the title bar
    endpoint: String,
    /// Channel to the main loop
    ui_tx: mpsc::Sender<UiMessage>,
    /// Spinner start time for animation
    spinner_start: Instant,
}

impl TuiState {
    fn new(endpoint: &str, ui_tx: mpsc::Sender<UiMessage>) -> Self {
        let mut input = InputBox::new().with_placeholder("Type your message...");
        input.set_focused(true);

        Self {
            messages: vec![],
            input,
            scroll: 0,
            is_pending: false,
            status: "Ready".to_string(),
            theme: Theme::dark(),
            endpoint: endpoint.to_string(),
            ui_tx,
            spinner_start: Instant::now(),
        }
    }

    /// Append a transcript message to the render list
    fn push_message(&mut self, message: &Message) {
        let rendered = match message.role {
            Role::User => ChatMessage::user(&message.content),
            Role::Assistant if message.content.starts_with(ERROR_PREFIX) => {
                ChatMessage::error(&message.content)
            }
            Role::Assistant => ChatMessage::assistant(&message.content),
        };
        self.messages.push(rendered);
        self.scroll_to_bottom();
    }

    /// Handle session events
    fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::MessageAppended { message } => {
                self.push_message(&message);
            }
            SessionEvent::PendingChanged { pending } => {
                self.is_pending = pending;
                if pending {
                    self.spinner_start = Instant::now();
                    self.status = "Waiting for reply...".to_string();
                } else {
                    self.status = "Ready".to_string();
                }
            }
        }
    }

    fn scroll_to_bottom(&mut self) {
        // Clamped to the actual content height during render
        self.scroll = usize::MAX;
    }

    /// Handle a keyboard action; returns false to quit
    async fn handle_action(&mut self, action: Action, width: u16) -> bool {
        match action {
            Action::Submit => {
                if !self.is_pending && !self.input.content().trim().is_empty() {
                    let _ = self.ui_tx.send(UiMessage::Submit).await;
                }
                true
            }
            Action::Quit | Action::Interrupt | Action::Eof => {
                let _ = self.ui_tx.send(UiMessage::Quit).await;
                false
            }
            Action::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                true
            }
            Action::Down => {
                self.scroll = self.scroll.saturating_add(1);
                true
            }
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                true
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                true
            }
            _ => {
                self.input.handle_action(&action, width);
                true
            }
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Layout: transcript (flex), status bar (1), input (3)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(size);

        self.render_messages(frame, chunks[0]);
        self.render_status(frame, chunks[1]);
        self.input
            .render(chunks[2], frame.buffer_mut(), &self.theme);
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let title = format!(" parley │ {} ", self.endpoint);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(title);

        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let content_height = transcript_height(&self.messages, inner.width as usize);
        let max_scroll = content_height.saturating_sub(inner.height as usize);
        self.scroll = self.scroll.min(max_scroll);

        let list = MessageList::new(&self.messages, &self.theme).scroll(self.scroll);
        frame.render_widget(list, inner);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.is_pending {
            let spinner =
                Spinner::new(&self.status, &self.theme).with_start_time(self.spinner_start);
            frame.render_widget(spinner, area);
            return;
        }

        let left = self.status.clone();
        let right = "Enter: send │ PgUp/Dn: scroll │ Ctrl+C: quit";
        let left_width = left.chars().count();
        let right_width = right.chars().count();
        let available = area.width as usize;

        let line = if left_width + right_width + 2 <= available {
            let spacing = available - left_width - right_width;
            Line::from(vec![
                Span::styled(left, self.theme.dim_style()),
                Span::raw(" ".repeat(spacing)),
                Span::styled(right, Style::default().fg(self.theme.dim)),
            ])
        } else {
            Line::from(Span::styled(left, self.theme.dim_style()))
        };

        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Run the TUI application
pub async fn run_tui(session: &Session, endpoint: &str) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (ui_tx, mut ui_rx) = mpsc::channel::<UiMessage>(32);
    let mut state = TuiState::new(endpoint, ui_tx);

    // Seed the render list with the existing transcript (the greeting)
    for message in session.messages() {
        state.push_message(&message);
    }

    let mut session_rx = session.subscribe();
    let mut event_stream = EventStream::new();

    // Tick interval for spinner animation
    let mut tick_interval = tokio::time::interval(std::time::Duration::from_millis(80));

    // Set when the user submits; processed at the top of the next iteration
    let mut submit_requested = false;

    let result = loop {
        if submit_requested {
            submit_requested = false;

            // The session's draft is authoritative: hand it the input text,
            // then clear the editing surface.
            session.set_draft(state.input.content());
            state.input.clear();

            let mut submit_future = std::pin::pin!(session.submit());

            // Poll the round trip alongside rendering so the spinner keeps
            // animating and typing stays possible while waiting.
            loop {
                terminal.draw(|frame| state.render(frame))?;
                let area_width = terminal.size()?.width;

                tokio::select! {
                    biased;

                    outcome = &mut submit_future => {
                        // Rejections need no surfacing here; the guard ran
                        // before anything became visible.
                        let _ = outcome;
                        break;
                    }

                    event = session_rx.recv() => {
                        if let Ok(session_event) = event {
                            state.handle_session_event(session_event);
                        }
                    }

                    event = event_stream.next() => {
                        match event {
                            Some(Ok(Event::Key(key))) => {
                                match key_to_action(key) {
                                    // A dispatched turn always runs to
                                    // completion; quitting and re-submitting
                                    // wait until it resolves.
                                    Action::Submit
                                    | Action::Quit
                                    | Action::Interrupt
                                    | Action::Eof => {}
                                    action => {
                                        state.input.handle_action(&action, area_width);
                                    }
                                }
                            }
                            Some(Ok(Event::Paste(text))) => {
                                state.input.handle_action(&Action::Paste(text), area_width);
                            }
                            // Input errors can wait; the round trip must
                            // resolve before the loop is allowed to exit.
                            Some(Err(_)) | None => {}
                            _ => {}
                        }
                    }

                    _ = tick_interval.tick() => {}
                }
            }

            // Drain any remaining session events after the turn completes
            while let Ok(session_event) = session_rx.try_recv() {
                state.handle_session_event(session_event);
            }

            terminal.draw(|frame| state.render(frame))?;
            continue;
        }

        terminal.draw(|frame| state.render(frame))?;
        let area_width = terminal.size()?.width;

        tokio::select! {
            biased;

            event = session_rx.recv() => {
                if let Ok(session_event) = event {
                    state.handle_session_event(session_event);
                }
            }

            event = event_stream.next() => {
                match event {
                    Some(Ok(Event::Key(key))) => {
                        let action = key_to_action(key);
                        if !state.handle_action(action, area_width).await {
                            break Ok(());
                        }
                        // The presentation layer feeds draft changes into
                        // the session as they happen.
                        session.set_draft(state.input.content());
                    }
                    Some(Ok(Event::Paste(text))) => {
                        state.handle_action(Action::Paste(text), area_width).await;
                        session.set_draft(state.input.content());
                    }
                    Some(Ok(Event::Resize(_, _))) => {}
                    Some(Err(e)) => {
                        break Err(anyhow::anyhow!("Event error: {}", e));
                    }
                    None => {
                        break Ok(());
                    }
                    _ => {}
                }
            }

            _ = tick_interval.tick() => {}

            msg = ui_rx.recv() => {
                match msg {
                    Some(UiMessage::Submit) => {
                        submit_requested = true;
                    }
                    Some(UiMessage::Quit) | None => {
                        break Ok(());
                    }
                }
            }
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
