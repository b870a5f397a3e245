/// End-to-end reducer behavior through a `Store`.
///
/// Each test drives a store the way a storefront does: `Load` when a request
/// starts, exactly one `Success` or `Fail` when it settles.
use std::sync::Arc;

use turbo_state::prelude::*;
use turbo_state::DomainError;

const CART: &str = "cart";

#[derive(Debug, Clone, PartialEq)]
struct CartTotals {
    total: u32,
}

type CartStore = Store<EntityProcessesLoaderState<CartTotals>, EntityAction<CartTotals>>;

fn cart_store() -> CartStore {
    Store::new(
        EntityProcessesLoaderState::new(),
        |state: &EntityProcessesLoaderState<CartTotals>, action: &EntityAction<CartTotals>| {
            processes_loader::reduce_entities(state, action, CART)
        },
    )
}

fn meta(id: &str) -> EntityMeta {
    EntityMeta::new(CART, id)
}

#[test]
fn test_load_then_success() {
    let store = cart_store();

    store.dispatch(EntityAction::load(meta("cart-1"))).unwrap();
    assert!(store.select(|s| selectors::is_loading(s, "cart-1")));

    store
        .dispatch(EntityAction::success(meta("cart-1"), CartTotals { total: 10 }))
        .unwrap();
    assert!(!store.select(|s| selectors::is_loading(s, "cart-1")));
    assert!(store.select(|s| selectors::is_success(s, "cart-1")));
    assert_eq!(
        store.select(|s| selectors::value(s, "cart-1").map(|c| c.total)),
        Some(10)
    );
}

#[test]
fn test_repeated_load_then_fail() {
    let store = cart_store();

    store.dispatch(EntityAction::load(meta("cart-1"))).unwrap();
    store.dispatch(EntityAction::load(meta("cart-1"))).unwrap();
    store
        .dispatch(EntityAction::fail(
            meta("cart-1"),
            Some(DomainError::from("network error")),
        ))
        .unwrap();

    let state = store.state();
    assert!(selectors::has_error(state.as_ref(), "cart-1"));
    assert!(!selectors::is_loading(state.as_ref(), "cart-1"));
    assert_eq!(
        selectors::error(state.as_ref(), "cart-1").and_then(DomainError::as_str),
        Some("network error")
    );
}

#[test]
fn test_process_count_never_negative() {
    let store = cart_store();

    for _ in 0..3 {
        store.dispatch(EntityAction::increment(meta("cart-1"))).unwrap();
    }
    for _ in 0..5 {
        store.dispatch(EntityAction::decrement(meta("cart-1"))).unwrap();
    }
    assert_eq!(store.select(|s| selectors::processes_count(s, "cart-1")), 0);
    assert!(store.select(|s| selectors::is_stable(s, "cart-1")));
}

#[test]
fn test_scopes_settle_independently() {
    let store: Store<EntityScopedLoaderState<u32>, EntityAction<u32>> = Store::new(
        EntityScopedLoaderState::new(),
        |state: &EntityScopedLoaderState<u32>, action: &EntityAction<u32>| {
            scoped::reduce_entities(state, action, CART)
        },
    );

    store
        .dispatch(EntityAction::load(meta("cart-1").with_scope("summary")))
        .unwrap();
    store
        .dispatch(EntityAction::load(meta("cart-1").with_scope("details")))
        .unwrap();
    assert!(store.select(|s| selectors::scoped_is_loading(s, "cart-1", Some("summary"))));
    assert!(store.select(|s| selectors::scoped_is_loading(s, "cart-1", Some("details"))));

    store
        .dispatch(EntityAction::success(meta("cart-1").with_scope("summary"), 3))
        .unwrap();
    let state = store.state();
    assert!(!selectors::scoped_is_loading(state.as_ref(), "cart-1", Some("summary")));
    assert_eq!(
        selectors::scoped_value(state.as_ref(), "cart-1", Some("summary")),
        Some(&3)
    );
    assert!(selectors::scoped_is_loading(state.as_ref(), "cart-1", Some("details")));
    assert!(!selectors::scoped_is_loading(state.as_ref(), "cart-1", None));
}

#[test]
fn test_remove_forgets_entity() {
    let store = cart_store();

    store.dispatch(EntityAction::load(meta("cart-1"))).unwrap();
    store
        .dispatch(EntityAction::success(meta("cart-1"), CartTotals { total: 10 }))
        .unwrap();
    store.dispatch(EntityAction::remove(meta("cart-1"))).unwrap();

    let state = store.state();
    assert_eq!(selectors::value(state.as_ref(), "cart-1"), None);
    assert!(!selectors::is_success(state.as_ref(), "cart-1"));
    assert!(!state.contains("cart-1"));
}

#[test]
fn test_unrelated_entity_keeps_identity() {
    let store = cart_store();
    store.dispatch(EntityAction::load(meta("cart-1"))).unwrap();
    let before = store.state();
    let cart_1 = Arc::clone(before.get_shared("cart-1").unwrap());

    store.dispatch(EntityAction::load(meta("cart-2"))).unwrap();
    let after = store.state();
    assert!(Arc::ptr_eq(&cart_1, after.get_shared("cart-1").unwrap()));
    assert!(!after.same_as(&before));
}

#[test]
fn test_reset_is_idempotent() {
    let store = cart_store();
    store
        .dispatch(EntityAction::success(meta("cart-1"), CartTotals { total: 5 }))
        .unwrap();

    let once = store.dispatch(EntityAction::reset(meta("cart-1"))).unwrap();
    let twice = store.dispatch(EntityAction::reset(meta("cart-1"))).unwrap();
    assert_eq!(once, twice);
    assert!(twice.same_as(&once));
    assert_eq!(selectors::value(twice.as_ref(), "cart-1"), None);
}

#[test]
fn test_other_entity_type_is_ignored() {
    let store = cart_store();
    let before = store.state();
    store
        .dispatch(EntityAction::load(EntityMeta::new("product", "p-1")))
        .unwrap();
    assert!(store.state().same_as(&before));
}

#[test]
fn test_multi_target_load() {
    let store = cart_store();
    store
        .dispatch(EntityAction::load(EntityMeta::new(
            CART,
            vec!["cart-1".to_string(), "cart-2".to_string()],
        )))
        .unwrap();
    assert!(store.select(|s| selectors::is_loading(s, "cart-1")));
    assert!(store.select(|s| selectors::is_loading(s, "cart-2")));
}

#[test]
fn test_blank_scope_is_rejected() {
    let state = EntityScopedLoaderState::<u32>::new();
    let result = scoped::reduce_entities(
        &state,
        &EntityAction::load(meta("cart-1").with_scope("")),
        CART,
    );
    assert!(matches!(result, Err(StateError::MissingScope { .. })));
}
