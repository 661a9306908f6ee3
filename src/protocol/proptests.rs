//! Property-based tests for the intent codec
//!
//! Invariants checked here:
//! - Search intents carry the trimmed query verbatim
//! - Requests survive a JSON round-trip field for field
//! - Responses with anything but exactly one populated arm are rejected

use super::*;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::BTreeMap;

// ============================================================================
// Strategies
// ============================================================================

fn arb_padding() -> impl Strategy<Value = String> {
    "[ \t\n]{0,4}"
}

/// Query text with at least one non-whitespace character
fn arb_query() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9çãéí][a-zA-Z0-9çãéí ]{0,40}"
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Buscar),
        Just(Action::Criar),
        Just(Action::Atualizar),
        Just(Action::Deletar),
    ]
}

fn arb_auth() -> impl Strategy<Value = AuthInfo> {
    prop_oneof![
        "[a-zA-Z0-9._-]{0,32}".prop_map(AuthInfo::Token),
        ("0x[0-9a-f]{8}", "[0-9]{1,6}", "0x[0-9a-f]{8}").prop_map(
            |(contract_address, token_id, wallet_address)| AuthInfo::NftAuth(NftAuth {
                contract_address,
                token_id,
                wallet_address,
            })
        ),
    ]
}

fn arb_request() -> impl Strategy<Value = IntentRequest> {
    (
        "[0-9]\\.[0-9]",
        arb_action(),
        "[a-z_]{1,12}",
        proptest::collection::btree_map("[a-z_]{1,10}", "[a-zA-Z0-9 ]{0,20}", 0..5),
        arb_query(),
        arb_auth(),
    )
        .prop_map(|(version, action, scope, mut parameters, query, auth_info)| {
            parameters.insert(QUERY_PARAM.to_string(), query);
            IntentRequest {
                version,
                action,
                scope,
                parameters,
                response_format: RESPONSE_FORMAT_JSON.to_string(),
                auth_info,
            }
        })
}

/// All four arms as JSON fragments
fn arm_fragments() -> Vec<(&'static str, Value)> {
    vec![
        ("manifest", json!({ "name": "p" })),
        ("error", json!("failure")),
        ("raw_data", json!("AAEC")),
        ("results", json!([])),
    ]
}

fn envelope(arms: &BTreeMap<&'static str, Value>) -> Value {
    json!({
        "request_id": "req",
        "response": arms,
        "metadata": { "source": "s", "timestamp": 0, "ttl": 0, "extra": {} }
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn search_query_is_trimmed_input(
        left in arb_padding(),
        query in arb_query(),
        right in arb_padding(),
        token in "[a-z]{0,8}",
    ) {
        let raw = format!("{left}{query}{right}");
        let request = build_search_intent(&raw, &token).unwrap();
        prop_assert_eq!(request.query(), Some(raw.trim()));
        prop_assert_eq!(request.action, Action::Buscar);
        prop_assert_eq!(request.parameters.len(), 1);
    }

    #[test]
    fn whitespace_only_query_is_rejected(blank in "[ \t\n\r]{0,10}") {
        let result = build_search_intent(&blank, "t");
        prop_assert!(matches!(result, Err(CodecError::Validation(_))));
    }

    #[test]
    fn request_json_round_trip(request in arb_request()) {
        let bytes = encode_request(&request).unwrap();
        let decoded = decode_request(&bytes).unwrap();
        prop_assert_eq!(decoded, request);
    }

    #[test]
    fn arm_count_decides_validity(mask in 0u8..16) {
        let arms: BTreeMap<_, _> = arm_fragments()
            .into_iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, arm)| arm)
            .collect();

        let result = decode_response_value(envelope(&arms));
        if arms.len() == 1 {
            let response = result.unwrap();
            let only = arms.keys().next().copied().unwrap();
            prop_assert_eq!(response.response.arm(), only);
        } else {
            prop_assert!(matches!(result, Err(CodecError::Schema(_))));
        }
    }
}
