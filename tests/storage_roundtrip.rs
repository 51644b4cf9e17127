//! Property-based tests for state persistence
//!
//! Any state the session can reach must come back unchanged from a
//! save/load cycle, whichever backend holds it.

use proptest::prelude::*;
use shopping_session::storage::{JsonSessionStorage, MemoryStorage, Storage};
use shopping_session::{AppState, Outcome, ShoppingItem};

/// Generate arbitrary outcome, covering every variant
fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        Just(Outcome::Idle),
        any::<String>().prop_map(Outcome::Succeeded),
        any::<String>().prop_map(Outcome::Failed),
    ]
}

/// Generate arbitrary item with finite, non-negative numbers
fn arb_item() -> impl Strategy<Value = ShoppingItem> {
    (
        any::<String>(),
        any::<String>(),
        0u32..20_000,
        0u32..10_000_000,
    )
        .prop_map(|(id, item_type, half_units, cents)| ShoppingItem {
            id,
            item_type,
            count: f64::from(half_units) / 2.0,
            price: f64::from(cents) / 100.0,
        })
}

/// Generate arbitrary session state
fn arb_state() -> impl Strategy<Value = AppState> {
    (
        prop::collection::vec(arb_item(), 0..8),
        any::<bool>(),
        any::<String>(),
        any::<bool>(),
        arb_outcome(),
        any::<String>(),
    )
        .prop_map(|(list, is_logged, token, loading, outcome, user)| AppState {
            list,
            is_logged,
            token,
            loading,
            outcome,
            user,
        })
}

proptest! {
    #[test]
    fn memory_round_trip(state in arb_state()) {
        let mut storage = MemoryStorage::default();
        storage.save(&state).unwrap();

        prop_assert_eq!(storage.load().unwrap(), Some(state));
    }

    #[test]
    fn memory_keeps_only_the_last_save(first in arb_state(), second in arb_state()) {
        let mut storage = MemoryStorage::default();
        storage.save(&first).unwrap();
        storage.save(&second).unwrap();

        prop_assert_eq!(storage.load().unwrap(), Some(second));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn json_file_round_trip(state in arb_state()) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session-prop.json");

        let mut storage = JsonSessionStorage::open(path.clone()).unwrap();
        storage.save(&state).unwrap();
        prop_assert_eq!(storage.load().unwrap(), Some(state.clone()));

        let reopened = JsonSessionStorage::open(path).unwrap();
        prop_assert_eq!(reopened.load().unwrap(), Some(state));
    }
}
