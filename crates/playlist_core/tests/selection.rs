use std::collections::HashSet;
use std::sync::Once;

use playlist_core::{
    update, AppState, CompletedItem, Effect, Generation, JobEvent, JobId, Msg,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn with_completed(names: &[&str]) -> (AppState, Generation) {
    let (state, _) = update(AppState::new(), Msg::InputChanged("https://a.example".into()));
    let (state, _) = update(state, Msg::UrlSubmitted);
    let (mut state, _) = update(
        state,
        Msg::StartResolved {
            generation: 1,
            result: Ok(JobId::new("J1")),
        },
    );
    for name in names {
        let (next, _) = update(
            state,
            Msg::Channel {
                generation: 1,
                job_id: None,
                event: JobEvent::ItemCompleted(CompletedItem {
                    filename: (*name).to_string(),
                    title: name.to_uppercase(),
                }),
            },
        );
        state = next;
    }
    (state, 1)
}

fn toggle(state: AppState, filename: &str) -> AppState {
    update(
        state,
        Msg::ItemToggled {
            filename: filename.to_string(),
        },
    )
    .0
}

fn selected(state: &AppState) -> HashSet<String> {
    state.selection().iter().map(ToOwned::to_owned).collect()
}

fn assert_subset(state: &AppState) {
    let known = state.results().filenames();
    assert!(state.selection().iter().all(|name| known.contains(name)));
}

#[test]
fn toggle_twice_restores_membership() {
    init_logging();
    let (state, _) = with_completed(&["a.m4a", "b.m4a"]);
    let state = toggle(state, "b.m4a");
    let before = selected(&state);

    let state = toggle(toggle(state, "a.m4a"), "a.m4a");
    assert_eq!(selected(&state), before);
    let state = toggle(toggle(state, "b.m4a"), "b.m4a");
    assert_eq!(selected(&state), before);
}

#[test]
fn toggle_unknown_filename_is_noop() {
    init_logging();
    let (mut state, _) = with_completed(&["a.m4a"]);
    state.consume_dirty();

    let (mut state, effects) = update(
        state,
        Msg::ItemToggled {
            filename: "other.m4a".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert!(state.selection().is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn select_all_button_flips_to_clear_when_everything_selected() {
    init_logging();
    let (state, _) = with_completed(&["a.m4a", "b.m4a", "c.m4a"]);

    let (state, _) = update(state, Msg::SelectAllToggled);
    assert_eq!(state.selection().len(), 3);
    assert!(state.view().all_selected);
    assert_subset(&state);

    let (state, _) = update(state, Msg::SelectAllToggled);
    assert!(state.selection().is_empty());
    assert!(!state.view().all_selected);
}

#[test]
fn partial_selection_then_select_all_selects_everything() {
    init_logging();
    let (state, _) = with_completed(&["a.m4a", "b.m4a"]);
    let state = toggle(state, "a.m4a");

    let (state, _) = update(state, Msg::SelectAllToggled);
    assert_eq!(state.selection().len(), 2);
}

#[test]
fn duplicate_filenames_collapse_in_selection() {
    init_logging();
    let (state, _) = with_completed(&["a.m4a", "a.m4a", "b.m4a"]);
    let (state, _) = update(state, Msg::SelectAllToggled);

    assert_eq!(state.results().completed().len(), 3);
    assert_eq!(state.selection().len(), 2);
    assert!(state.view().all_selected);
}

#[test]
fn export_emits_one_retrieval_per_selected_item() {
    init_logging();
    let (state, _) = with_completed(&["a.m4a", "b.m4a", "c.m4a"]);
    let state = toggle(toggle(state, "a.m4a"), "c.m4a");

    let (state, effects) = update(state, Msg::ExportSelectedClicked);
    let requested: HashSet<_> = effects
        .into_iter()
        .map(|effect| match effect {
            Effect::RetrieveArtifact { filename } => filename,
            other => panic!("unexpected effect {other:?}"),
        })
        .collect();

    assert_eq!(
        requested,
        HashSet::from(["a.m4a".to_string(), "c.m4a".to_string()])
    );
    assert_eq!(state.selection().len(), 2);
}

#[test]
fn export_with_empty_selection_does_nothing() {
    init_logging();
    let (state, _) = with_completed(&["a.m4a"]);
    let (_state, effects) = update(state, Msg::ExportSelectedClicked);
    assert!(effects.is_empty());
}

#[test]
fn single_retrieval_requires_known_item() {
    init_logging();
    let (state, _) = with_completed(&["a.m4a"]);
    let (state, effects) = update(
        state,
        Msg::RetrieveClicked {
            filename: "a.m4a".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::RetrieveArtifact {
            filename: "a.m4a".to_string()
        }]
    );

    let (_state, effects) = update(
        state,
        Msg::RetrieveClicked {
            filename: "missing.m4a".to_string(),
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn selection_survives_completion_but_clears_on_new_session() {
    init_logging();
    let (state, generation) = with_completed(&["a.m4a", "b.m4a"]);
    let (state, _) = update(state, Msg::SelectAllToggled);
    let (state, _) = update(
        state,
        Msg::Channel {
            generation,
            job_id: None,
            event: JobEvent::Complete { failed: vec![] },
        },
    );
    assert_eq!(state.selection().len(), 2);

    let (state, _) = update(state, Msg::UrlSubmitted);
    assert!(state.selection().is_empty());
    assert!(state.results().completed().is_empty());
    assert_subset(&state);
}

#[test]
fn retrieval_result_becomes_notice() {
    init_logging();
    let (state, _) = with_completed(&["a.m4a"]);
    let (state, _) = update(
        state,
        Msg::ArtifactRetrieved {
            filename: "a.m4a".to_string(),
            result: Err("File not found".to_string()),
        },
    );
    assert_eq!(
        state.view().last_notice.as_deref(),
        Some("Could not retrieve a.m4a: File not found")
    );
}
