//! Property-based tests for the conversation state machine
//!
//! Invariants checked here:
//! - Every accepted submission is answered by exactly one bot entry
//! - Each event is accepted or rejected exactly as the guards dictate
//! - Failures never replace the visible results

use super::transition::*;
use super::*;
use crate::protocol::{
    AuthInfo, IntentResponse, IntentTemplate, Project, ProjectSearchResult, ResponseMetadata,
    ResponsePayload,
};
use crate::transport::TransportErrorKind;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> ConvContext {
    ConvContext::new("test-conv", IntentTemplate::new(AuthInfo::token("tok")))
}

/// Observable effect of applying transitions, without a runtime
#[derive(Debug, Default)]
struct Model {
    state: ConvState,
    users: usize,
    bots: usize,
    results: Vec<String>,
}

impl Model {
    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::AppendMessage {
                    kind: MessageKind::User,
                    ..
                } => self.users += 1,
                Effect::AppendMessage {
                    kind: MessageKind::Bot,
                    ..
                } => self.bots += 1,
                Effect::ReplaceResults { results } => {
                    self.results = results.into_iter().map(|r| r.project.name).collect();
                }
                Effect::Dispatch { .. } | Effect::NotifyState => {}
            }
        }
    }
}

fn results_response(names: &[String]) -> IntentResponse {
    let results = (1u32..)
        .zip(names)
        .map(|(rank, name)| ProjectSearchResult {
            project: Project {
                name: name.clone(),
                ..Project::default()
            },
            relevance_score: 1.0 / f64::from(rank),
            highlighted_snippet: None,
            matching_features: vec![],
        })
        .collect();
    IntentResponse::new("req", ResponsePayload::Results(results), ResponseMetadata::default())
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_submit() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-z][a-z ]{0,15}".prop_map(Event::submit),
        "[ \t]{0,3}".prop_map(Event::submit),
    ]
}

fn arb_transport_kind() -> impl Strategy<Value = TransportErrorKind> {
    prop_oneof![
        Just(TransportErrorKind::Network),
        Just(TransportErrorKind::Timeout),
        Just(TransportErrorKind::ServerError),
    ]
}

fn arb_failure() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_transport_kind().prop_map(FailureReason::Transport),
        Just(FailureReason::Decode),
        Just(FailureReason::Schema),
    ]
    .prop_map(|reason| Event::failed(reason, "boom"))
}

fn arb_success() -> impl Strategy<Value = Event> {
    prop_oneof![
        proptest::collection::vec("[a-z]{3,8}", 0..4)
            .prop_map(|names| results_response(&names)),
        "[a-z ]{1,20}".prop_map(|message| IntentResponse::new(
            "req",
            ResponsePayload::Error(message),
            ResponseMetadata::default()
        )),
    ]
    .prop_map(|response| Event::DispatchSucceeded {
        response,
        from_cache: false,
    })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![arb_submit(), arb_success(), arb_failure()]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn user_and_bot_entries_pair_up(events in proptest::collection::vec(arb_event(), 0..40)) {
        let context = test_context();
        let mut model = Model::default();

        for event in events {
            if let Ok(result) = transition(&model.state, &context, event) {
                model.state = result.new_state;
                model.apply(result.effects);
            }

            if model.state.is_dispatching() {
                prop_assert_eq!(model.users, model.bots + 1);
            } else {
                prop_assert_eq!(model.users, model.bots);
            }
        }
    }

    #[test]
    fn guards_decide_acceptance(events in proptest::collection::vec(arb_event(), 0..40)) {
        let context = test_context();
        let mut model = Model::default();

        for event in events {
            let blank_submit = matches!(&event, Event::Submit { query } if query.trim().is_empty());
            let resolution = event.is_resolution();
            let was_dispatching = model.state.is_dispatching();

            match (transition(&model.state, &context, event), was_dispatching) {
                (Ok(result), true) => {
                    prop_assert!(resolution);
                    prop_assert_eq!(&result.new_state, &ConvState::Idle);
                    model.state = result.new_state;
                    model.apply(result.effects);
                }
                (Ok(result), false) => {
                    prop_assert!(!resolution && !blank_submit);
                    prop_assert!(result.new_state.is_dispatching());
                    model.state = result.new_state;
                    model.apply(result.effects);
                }
                (Err(TransitionError::Busy), true) => prop_assert!(!resolution),
                (Err(TransitionError::EmptyQuery), false) => prop_assert!(blank_submit),
                (Err(TransitionError::Unexpected { .. }), false) => prop_assert!(resolution),
                (Err(e), dispatching) => {
                    return Err(TestCaseError::fail(format!(
                        "unexpected rejection {e:?} (dispatching: {dispatching})"
                    )));
                }
            }
        }
    }

    #[test]
    fn failure_keeps_results(
        names in proptest::collection::vec("[a-z]{3,8}", 1..4),
        failure in arb_failure(),
    ) {
        let context = test_context();
        let mut model = Model::default();

        for event in [
            Event::submit("first"),
            Event::DispatchSucceeded { response: results_response(&names), from_cache: false },
            Event::submit("second"),
            failure,
        ] {
            let result = transition(&model.state, &context, event).unwrap();
            model.state = result.new_state;
            model.apply(result.effects);
        }

        prop_assert_eq!(model.state, ConvState::Idle);
        prop_assert_eq!(model.results, names);
        prop_assert_eq!(model.bots, 2);
    }

    #[test]
    fn busy_submit_has_no_effects(first in "[a-z]{1,10}", second in "[a-z]{1,10}") {
        let context = test_context();
        let dispatching = transition(&ConvState::Idle, &context, Event::submit(first)).unwrap();
        let err = transition(&dispatching.new_state, &context, Event::submit(second)).unwrap_err();
        prop_assert!(matches!(err, TransitionError::Busy));
    }
}
