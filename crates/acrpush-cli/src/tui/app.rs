use std::time::Duration;

use acrpush_build::build_and_push;
use acrpush_cloud::{GatewayEvent, RealExecutor};
use acrpush_core::{BuildPlan, WorkflowError};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::terminal::Tui;
use super::view;
use crate::wizard::{Activation, NodePath, Row, Wizard};

const TICK: Duration = Duration::from_millis(50);
const LOG_CAPACITY: usize = 2000;

type BuildResult = Result<(), WorkflowError>;

/// What a key press asks the loop to do.
#[derive(Debug, PartialEq, Eq)]
enum Action {
    None,
    Quit,
    Activate(NodePath),
}

pub struct App {
    wizard: Wizard<RealExecutor>,
    events: UnboundedReceiver<GatewayEvent>,
    build_tx: UnboundedSender<BuildResult>,
    build_rx: UnboundedReceiver<BuildResult>,
    cursor: NodePath,
    input: String,
    log: Vec<String>,
}

impl App {
    pub fn new(wizard: Wizard<RealExecutor>, events: UnboundedReceiver<GatewayEvent>) -> Self {
        let (build_tx, build_rx) = mpsc::unbounded_channel();
        Self {
            wizard,
            events,
            build_tx,
            build_rx,
            cursor: NodePath::root(),
            input: String::new(),
            log: Vec::new(),
        }
    }

    pub fn wizard(&self) -> &Wizard<RealExecutor> {
        &self.wizard
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Index of the cursor among the visible rows.
    pub fn cursor_index(&self, rows: &[Row]) -> usize {
        rows.iter()
            .position(|r| r.path == self.cursor)
            .unwrap_or_default()
    }

    pub async fn run(&mut self, terminal: &mut Tui) -> anyhow::Result<()> {
        self.draw(terminal)?;
        self.wizard.start().await;
        self.focus_first_child();

        loop {
            self.drain();
            self.draw(terminal)?;

            if !event::poll(TICK)? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match self.on_key(key) {
                Action::None => {}
                Action::Quit => return Ok(()),
                Action::Activate(path) => self.activate(&path, terminal).await?,
            }
        }
    }

    fn draw(&self, terminal: &mut Tui) -> anyhow::Result<()> {
        terminal.draw(|frame| view::draw(frame, self))?;
        Ok(())
    }

    fn on_key(&mut self, key: KeyEvent) -> Action {
        if self.wizard.prompt().is_some() {
            match key.code {
                KeyCode::Esc => {
                    self.wizard.cancel_input();
                    self.input.clear();
                }
                KeyCode::Enter => {
                    if !matches!(
                        self.wizard.submit_input(&self.input),
                        Activation::AwaitingInput
                    ) {
                        self.input.clear();
                    }
                }
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Action::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_cursor(-1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_cursor(1);
                Action::None
            }
            KeyCode::Enter if !self.wizard.is_busy() => Action::Activate(self.cursor.clone()),
            _ => Action::None,
        }
    }

    async fn activate(&mut self, path: &NodePath, terminal: &mut Tui) -> anyhow::Result<()> {
        if self.wizard.mark_loading(path) {
            self.draw(terminal)?;
        }
        match self.wizard.activate(path).await {
            Activation::StartBuild(plan) => self.spawn_build(plan),
            Activation::AwaitingInput => self.input.clear(),
            Activation::Done => {}
        }
        Ok(())
    }

    fn spawn_build(&mut self, plan: BuildPlan) {
        self.log.clear();
        self.push_log("Starting build and push...".to_owned());
        self.push_log(self.wizard.summary());

        let gateway = self.wizard.gateway();
        let done = self.build_tx.clone();
        tokio::spawn(async move {
            let result = build_and_push(gateway.as_ref(), &plan).await.map(|_| ());
            if done.send(result).is_err() {
                tracing::debug!("build finished after the UI closed");
            }
        });
    }

    /// Move pending gateway output and build results into the UI state.
    fn drain(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                GatewayEvent::Command(command) => self.push_log(format!("$ {command}")),
                GatewayEvent::Output(line) if !line.is_empty() => self.push_log(line),
                GatewayEvent::Output(_) => {}
            }
        }
        while let Ok(result) = self.build_rx.try_recv() {
            self.push_log(match &result {
                Ok(()) => "Build and push completed.".to_owned(),
                Err(e) => format!("Build failed: {e}"),
            });
            self.wizard.build_finished(result);
        }
    }

    fn push_log(&mut self, line: String) {
        self.log.push(line);
        if self.log.len() > LOG_CAPACITY {
            let excess = self.log.len() - LOG_CAPACITY;
            self.log.drain(..excess);
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let rows = self.wizard.rows();
        if rows.is_empty() {
            return;
        }
        let index = self
            .cursor_index(&rows)
            .saturating_add_signed(delta)
            .min(rows.len() - 1);
        self.cursor = rows[index].path.clone();
    }

    fn focus_first_child(&mut self) {
        if let Some(row) = self.wizard.rows().get(1) {
            self.cursor = row.path.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use acrpush_cloud::{Gateway, OutputSink};
    use acrpush_core::Settings;
    use crossterm::event::KeyModifiers;

    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> (App, OutputSink) {
        let (sink, events) = OutputSink::channel();
        let wizard = Wizard::new(
            Arc::new(Gateway::new()),
            Settings::default(),
            PathBuf::from("."),
        );
        (App::new(wizard, events), sink)
    }

    #[test]
    fn quit_keys_end_the_loop() {
        let (mut app, _sink) = app();
        assert_eq!(app.on_key(press(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.on_key(press(KeyCode::Esc)), Action::Quit);
    }

    #[test]
    fn busy_tree_ignores_enter() {
        let (mut app, _sink) = app();
        assert!(app.wizard.is_busy());
        assert_eq!(app.on_key(press(KeyCode::Enter)), Action::None);
    }

    #[test]
    fn cursor_stays_within_visible_rows() {
        let (mut app, _sink) = app();
        app.on_key(press(KeyCode::Down));
        app.on_key(press(KeyCode::Char('k')));
        app.on_key(press(KeyCode::Up));
        assert_eq!(app.cursor, NodePath::root());
    }

    #[test]
    fn gateway_events_reach_the_log() {
        let (mut app, sink) = app();
        sink.command("docker", &["info".to_owned()]);
        sink.output("");
        sink.output("Server Version: 27.0.0");

        app.drain();

        assert_eq!(app.log(), ["$ docker info", "Server Version: 27.0.0"]);
    }

    #[test]
    fn build_result_is_logged_and_releases_the_tree() {
        let (mut app, _sink) = app();
        app.build_tx
            .send(Err(WorkflowError::Tool("Docker build failed".to_owned())))
            .unwrap();

        app.drain();

        assert_eq!(app.log(), ["Build failed: Docker build failed"]);
        assert_eq!(app.wizard.status(), "Build failed: Docker build failed");
    }

    #[test]
    fn log_is_bounded() {
        let (mut app, _sink) = app();
        for i in 0..LOG_CAPACITY + 5 {
            app.push_log(i.to_string());
        }
        assert_eq!(app.log().len(), LOG_CAPACITY);
        assert_eq!(app.log()[0], "5");
    }
}
