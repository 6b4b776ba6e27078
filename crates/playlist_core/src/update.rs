use engine_logging::{engine_info, engine_warn};

use crate::{AppState, Effect, Msg, SessionStatus};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::UrlSubmitted => {
            let url = state.input().trim().to_string();
            if url.is_empty() {
                return (state, Vec::new());
            }
            // Single active job: a second start waits until the first one is Idle again.
            if state.status() != SessionStatus::Idle {
                engine_warn!("Start rejected while session is {:?}", state.status());
                return (state, Vec::new());
            }
            let generation = state.start_session();
            vec![Effect::StartJob { generation, url }]
        }
        Msg::StopClicked => match state.request_stop() {
            Some((generation, job_id)) => vec![Effect::StopJob { generation, job_id }],
            None => Vec::new(),
        },
        Msg::StartResolved { generation, result } => {
            state.apply_start_resolved(generation, result);
            Vec::new()
        }
        Msg::StopResolved { generation, result } => {
            state.apply_stop_resolved(generation, result);
            Vec::new()
        }
        Msg::Channel {
            generation,
            job_id,
            event,
        } => {
            state.apply_event(generation, job_id.as_ref(), event);
            Vec::new()
        }
        Msg::ChannelChanged(channel) => {
            state.set_channel(channel);
            Vec::new()
        }
        Msg::ItemToggled { filename } => {
            let (selection, results) = state.selection_mut();
            if selection.toggle(&filename, results) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SelectAllToggled => {
            // Button policy: everything selected flips to Deselect All.
            let (selection, results) = state.selection_mut();
            if selection.covers(results) {
                selection.clear();
            } else {
                selection.select_all(results);
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::ExportSelectedClicked => {
            let effects = state.selection().export_selected();
            if !effects.is_empty() {
                engine_info!("Exporting {} selected items", effects.len());
            }
            effects
        }
        Msg::RetrieveClicked { filename } => {
            if state.results().contains(&filename) {
                vec![Effect::RetrieveArtifact { filename }]
            } else {
                Vec::new()
            }
        }
        Msg::ArtifactRetrieved { filename, result } => {
            match result {
                Ok(path) => state.set_notice(format!("Saved {filename} to {path}")),
                Err(message) => state.set_notice(format!("Could not retrieve {filename}: {message}")),
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
