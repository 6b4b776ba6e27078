use std::sync::Once;

use playlist_core::{
    update, AppState, BatchStatus, CompletedItem, Effect, Generation, JobEvent, JobId, Msg,
    ProgressSnapshot, SessionStatus, TransferPhase,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn start_active(state: AppState, url: &str, job: &str) -> (AppState, Generation) {
    let (state, _) = update(state, Msg::InputChanged(url.to_string()));
    let (state, effects) = update(state, Msg::UrlSubmitted);
    let Some(Effect::StartJob { generation, .. }) = effects.first().cloned() else {
        panic!("expected StartJob, got {effects:?}");
    };
    let (state, _) = update(
        state,
        Msg::StartResolved {
            generation,
            result: Ok(JobId::new(job)),
        },
    );
    (state, generation)
}

fn channel(generation: Generation, job_id: Option<&str>, event: JobEvent) -> Msg {
    Msg::Channel {
        generation,
        job_id: job_id.map(JobId::new),
        event,
    }
}

fn every_event() -> Vec<JobEvent> {
    vec![
        JobEvent::Progress(ProgressSnapshot {
            downloaded_bytes: Some(7),
            total_bytes: Some(9),
            speed_bytes_per_sec: None,
            eta_seconds: None,
            phase: TransferPhase::Downloading,
        }),
        JobEvent::Status(BatchStatus {
            current_index: 3,
            total_count: 4,
            current_title: "stale".to_string(),
        }),
        JobEvent::ItemCompleted(CompletedItem {
            filename: "stale.m4a".to_string(),
            title: "stale".to_string(),
        }),
        JobEvent::Complete {
            failed: vec!["stale".to_string()],
        },
        JobEvent::Error {
            message: "stale".to_string(),
        },
        JobEvent::Stopped,
    ]
}

/// Runs a first job to completion and starts a second one.
fn second_session() -> (AppState, Generation, Generation) {
    let (state, first) = start_active(AppState::new(), "https://first.example", "J1");
    let (state, _) = update(state, channel(first, None, JobEvent::Stopped));
    let (state, second) = start_active(state, "https://second.example", "J2");
    (state, first, second)
}

#[test]
fn stale_generation_events_change_nothing() {
    init_logging();
    let (mut state, first, second) = second_session();
    assert_eq!(second, first + 1);
    state.consume_dirty();
    let before = state.view();

    for event in every_event() {
        let (mut next, effects) = update(state.clone(), channel(first, None, event));
        assert!(effects.is_empty());
        assert_eq!(next.view(), before);
        assert!(!next.consume_dirty());
    }
}

#[test]
fn mismatched_job_id_is_dropped() {
    init_logging();
    let (state, _first, second) = second_session();
    let before = state.view();

    for event in every_event() {
        let (next, _) = update(state.clone(), channel(second, Some("J1"), event));
        assert_eq!(next.view(), before);
    }

    let (next, _) = update(state, channel(second, Some("J2"), JobEvent::Stopped));
    assert_eq!(next.status(), SessionStatus::Idle);
}

#[test]
fn stale_start_response_is_ignored() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::InputChanged("https://a.example".into()));
    let (state, _) = update(state, Msg::UrlSubmitted);
    let (state, _) = update(
        state,
        Msg::StartResolved {
            generation: 1,
            result: Err("refused".to_string()),
        },
    );
    let (state, _) = update(state, Msg::UrlSubmitted);
    assert_eq!(state.session().generation(), 2);

    // Response for the first attempt arrives late.
    let (state, _) = update(
        state,
        Msg::StartResolved {
            generation: 1,
            result: Ok(JobId::new("ghost")),
        },
    );
    assert_eq!(state.status(), SessionStatus::Starting);
    assert!(state.session().job_id().is_none());
}

#[test]
fn stale_stop_failure_does_not_surface() {
    init_logging();
    let (state, first, _second) = second_session();
    let (state, _) = update(
        state,
        Msg::StopResolved {
            generation: first,
            result: Err("Download not found".to_string()),
        },
    );
    assert_eq!(state.view().last_notice, None);
    assert_eq!(state.status(), SessionStatus::Active);
}

#[test]
fn events_after_terminal_transition_are_ignored() {
    init_logging();
    let (state, generation) = start_active(AppState::new(), "https://a.example", "J1");
    let (state, _) = update(state, channel(generation, None, JobEvent::Complete { failed: vec![] }));
    let before = state.view();

    for event in every_event() {
        let (next, _) = update(state.clone(), channel(generation, None, event));
        assert_eq!(next.view(), before);
    }
}
