use std::fmt::Write;

use playlist_core::{
    AppViewModel, BatchStatus, ChannelStatus, ProgressSnapshot, SessionOutcome, SessionStatus,
};
use playlist_engine::ArtifactEntry;

/// Renders the whole view as terminal text.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", status_line(view));
    if let Some(batch) = &view.batch {
        let _ = writeln!(out, "  {}", batch_line(batch));
    }
    if let Some(progress) = &view.progress {
        let _ = writeln!(out, "  {}", progress_line(progress));
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "  Error: {error}");
    }

    if !view.completed.is_empty() {
        let _ = writeln!(
            out,
            "Completed ({}, {} selected):",
            view.completed.len(),
            view.selected_count
        );
        for (index, row) in view.completed.iter().enumerate() {
            let mark = if row.selected { 'x' } else { ' ' };
            let _ = writeln!(out, "  {:>3}. [{mark}] {} ({})", index + 1, row.title, row.filename);
        }
    }
    if !view.failed.is_empty() {
        let _ = writeln!(out, "Failed ({}):", view.failed.len());
        for entry in &view.failed {
            let _ = writeln!(out, "  - {entry}");
        }
    }
    if let Some(notice) = &view.last_notice {
        let _ = writeln!(out, "> {notice}");
    }
    let _ = writeln!(out, "{}", hint_line(view));
    out
}

fn status_line(view: &AppViewModel) -> String {
    let session = match view.status {
        SessionStatus::Idle => match view.outcome {
            Some(SessionOutcome::Completed) => "Done",
            Some(SessionOutcome::Stopped) => "Stopped",
            Some(SessionOutcome::Failed) => "Failed",
            None => "Idle",
        },
        SessionStatus::Starting => "Starting",
        SessionStatus::Active => "Downloading",
        SessionStatus::Stopping => "Stopping",
    };
    let channel = match &view.channel {
        ChannelStatus::Connecting => "connecting".to_string(),
        ChannelStatus::Connected => "connected".to_string(),
        ChannelStatus::Disconnected { reason } => format!("disconnected ({reason})"),
    };
    match &view.job_id {
        Some(job_id) => format!("Session: {session} [job {job_id}] | Channel: {channel}"),
        None => format!("Session: {session} | Channel: {channel}"),
    }
}

fn batch_line(batch: &BatchStatus) -> String {
    format!(
        "Item {}/{}: {}",
        batch.current_index, batch.total_count, batch.current_title
    )
}

fn progress_line(progress: &ProgressSnapshot) -> String {
    let mut line = match progress.percent() {
        Some(percent) => format!("{percent:5.1}%"),
        None => "  ?  %".to_string(),
    };
    match (progress.downloaded_bytes, progress.total_bytes) {
        (Some(done), Some(total)) => {
            let _ = write!(line, " {} / {}", format_bytes(done), format_bytes(total));
        }
        (Some(done), None) => {
            let _ = write!(line, " {}", format_bytes(done));
        }
        _ => {}
    }
    if let Some(speed) = progress.speed_bytes_per_sec {
        let _ = write!(line, " at {}/s", format_bytes(speed));
    }
    if let Some(eta) = progress.eta_seconds {
        let _ = write!(line, ", ETA {}", format_eta(eta));
    }
    line
}

fn hint_line(view: &AppViewModel) -> String {
    let mut hints = Vec::new();
    if view.can_start {
        hints.push("start <url>");
    }
    if view.can_stop {
        hints.push("stop");
    }
    if !view.completed.is_empty() {
        hints.push("toggle <n>");
        hints.push(if view.all_selected {
            "all (deselect all)"
        } else {
            "all (select all)"
        });
        if view.selected_count > 0 {
            hints.push("export");
        }
        hints.push("get <n>");
    }
    hints.push("help");
    format!("[{}]", hints.join(" | "))
}

/// Lists what the runner can serve.
pub fn render_files(files: &[ArtifactEntry]) -> String {
    if files.is_empty() {
        return "The runner has no files to serve.\n".to_string();
    }
    let mut out = format!("Runner files ({}):\n", files.len());
    for entry in files {
        let _ = writeln!(out, "  {:>10}  {}", format_bytes(entry.size), entry.filename);
    }
    out
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

pub fn format_eta(seconds: u64) -> String {
    let (hours, rest) = (seconds / 3600, seconds % 3600);
    let (minutes, seconds) = (rest / 60, rest % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
