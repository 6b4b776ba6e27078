//! Parsing of the line-oriented terminal commands.

use std::fmt;

use playlist_core::AppViewModel;

/// A completed item, by its 1-based row number or its filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    Row(usize),
    Name(String),
}

impl ItemRef {
    fn parse(arg: &str) -> Self {
        match arg.parse::<usize>() {
            Ok(row) => ItemRef::Row(row),
            Err(_) => ItemRef::Name(arg.to_string()),
        }
    }

    /// Looks the item up among the completed rows currently shown.
    pub fn resolve(&self, view: &AppViewModel) -> Option<String> {
        match self {
            ItemRef::Row(row) => row
                .checked_sub(1)
                .and_then(|index| view.completed.get(index))
                .map(|row| row.filename.clone()),
            ItemRef::Name(name) => view
                .completed
                .iter()
                .find(|row| row.filename == *name)
                .map(|row| row.filename.clone()),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Row(row) => write!(f, "#{row}"),
            ItemRef::Name(name) => write!(f, "{name:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start(String),
    Stop,
    Toggle(ItemRef),
    SelectAll,
    Export,
    Get(ItemRef),
    Files,
    Status,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub fn parse(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match (word.to_ascii_lowercase().as_str(), rest) {
        ("start", "") => Command::Invalid("usage: start <playlist url>".to_string()),
        ("start", url) => Command::Start(url.to_string()),
        ("stop", _) => Command::Stop,
        ("toggle" | "t", "") => Command::Invalid("usage: toggle <n|filename>".to_string()),
        ("toggle" | "t", arg) => Command::Toggle(ItemRef::parse(arg)),
        ("all", _) => Command::SelectAll,
        ("export", _) => Command::Export,
        ("get", "") => Command::Invalid("usage: get <n|filename>".to_string()),
        ("get", arg) => Command::Get(ItemRef::parse(arg)),
        ("files", _) => Command::Files,
        ("status" | "s", _) => Command::Status,
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit" | "q", _) => Command::Quit,
        _ if rest.is_empty() && looks_like_url(word) => Command::Start(word.to_string()),
        (other, _) => Command::Invalid(format!("unknown command {other:?}, try help")),
    }
}

fn looks_like_url(word: &str) -> bool {
    word.starts_with("http://") || word.starts_with("https://")
}

pub const HELP: &str = "\
Commands:
  start <url>         submit a playlist (a bare URL works too)
  stop                stop the running job
  toggle <n|name>     select or unselect a completed item
  all                 select all / deselect all
  export              download every selected item
  get <n|name>        download one completed item
  files               list files the runner can serve
  status              redraw the current state
  quit                exit";
