use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use playlist_core::{update, AppState, Msg};
use playlist_engine::ArtifactEntry;

use super::commands::{self, Command, HELP};
use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ui::render::{render, render_files};

const RENDER_INTERVAL: Duration = Duration::from_millis(250);

/// Everything the main loop reacts to, in arrival order.
#[derive(Debug)]
pub(super) enum Inbox {
    Ui(Msg),
    Line(String),
    Files(Result<Vec<ArtifactEntry>, String>),
    InputClosed,
}

pub fn run_app(config: AppConfig, initial_url: Option<String>) -> anyhow::Result<()> {
    let (inbox_tx, inbox_rx) = mpsc::channel::<Inbox>();
    let runner = EffectRunner::new(config.engine_settings(), inbox_tx.clone())?;

    spawn_stdin_reader(inbox_tx.clone());
    // Progress can arrive many times a second; redraws are coalesced on ticks.
    thread::spawn(move || {
        while inbox_tx.send(Inbox::Ui(Msg::Tick)).is_ok() {
            thread::sleep(RENDER_INTERVAL);
        }
    });

    let mut app = App::new(runner);
    println!("Job runner: {} (type help for commands)", config.server_url);
    if let Some(url) = initial_url {
        app.run_command(Command::Start(url));
    }

    while let Ok(input) = inbox_rx.recv() {
        if app.handle(input).is_break() {
            break;
        }
    }

    engine_info!("Shutting down");
    app.runner.shutdown();
    Ok(())
}

fn spawn_stdin_reader(tx: mpsc::Sender<Inbox>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Inbox::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    engine_warn!("Reading stdin failed: {}", err);
                    break;
                }
            }
        }
        let _ = tx.send(Inbox::InputClosed);
    });
}

struct App {
    state: AppState,
    runner: EffectRunner,
    input_closed: bool,
}

impl App {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            input_closed: false,
        }
    }

    fn handle(&mut self, input: Inbox) -> ControlFlow<()> {
        match input {
            Inbox::Ui(Msg::Tick) => {
                self.dispatch(Msg::Tick);
                self.render_if_dirty();
            }
            Inbox::Ui(msg) => self.dispatch(msg),
            Inbox::Line(line) => self.run_command(commands::parse(&line))?,
            Inbox::Files(Ok(files)) => print_out(&render_files(&files)),
            Inbox::Files(Err(err)) => print_out(&format!("Could not list files: {err}\n")),
            Inbox::InputClosed => self.input_closed = true,
        }
        // Without a terminal, stay around until the running job settles.
        if self.input_closed && !self.state.status().is_live() {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }

    fn run_command(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Start(url) => {
                if self.state.status().is_live() {
                    print_out("A job is already running; stop it first.\n");
                    return ControlFlow::Continue(());
                }
                self.dispatch(Msg::InputChanged(url));
                self.dispatch(Msg::UrlSubmitted);
            }
            Command::Stop => {
                if self.state.view().can_stop {
                    self.dispatch(Msg::StopClicked);
                } else {
                    print_out("Nothing to stop.\n");
                }
            }
            Command::Toggle(item) => match item.resolve(&self.state.view()) {
                Some(filename) => self.dispatch(Msg::ItemToggled { filename }),
                None => print_out(&format!("No completed item {item}.\n")),
            },
            Command::SelectAll => self.dispatch(Msg::SelectAllToggled),
            Command::Export => {
                if self.state.selection().is_empty() {
                    print_out("Nothing selected.\n");
                } else {
                    self.dispatch(Msg::ExportSelectedClicked);
                }
            }
            Command::Get(item) => match item.resolve(&self.state.view()) {
                Some(filename) => self.dispatch(Msg::RetrieveClicked { filename }),
                None => print_out(&format!("No completed item {item}.\n")),
            },
            Command::Files => self.runner.list_artifacts(),
            Command::Status => {
                self.state.consume_dirty();
                print_out(&render(&self.state.view()));
            }
            Command::Help => print_out(&format!("{HELP}\n")),
            Command::Quit => return ControlFlow::Break(()),
            Command::Empty => {}
            Command::Invalid(message) => print_out(&format!("{message}\n")),
        }
        ControlFlow::Continue(())
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    fn render_if_dirty(&mut self) {
        if self.state.consume_dirty() {
            print_out(&render(&self.state.view()));
        }
    }
}

fn print_out(text: &str) {
    let mut stdout = io::stdout().lock();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}
