//! Store notification and no-op properties.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use storefront_core::reducer::pure_fn;
use storefront_runtime::{create_store, use_store, shallow, Store, Subscription};
use storefront_testing::{init_test_tracing, NotificationProbe};

#[derive(Debug, Clone, Default, PartialEq)]
struct Cart {
    items: Vec<u32>,
    open: bool,
}

#[derive(Debug, Clone)]
enum CartAction {
    Add(u32),
    SetOpen(bool),
    Ignored,
}

fn cart_reducer(state: &Arc<Cart>, action: CartAction) -> Arc<Cart> {
    match action {
        CartAction::Add(item) => {
            let mut next = Cart::clone(state);
            next.items.push(item);
            Arc::new(next)
        }
        CartAction::SetOpen(open) if open == state.open => Arc::clone(state),
        CartAction::SetOpen(open) => Arc::new(Cart {
            open,
            ..Cart::clone(state)
        }),
        CartAction::Ignored => Arc::clone(state),
    }
}

type CartReducer = storefront_core::reducer::PureReducer<
    fn(&Arc<Cart>, CartAction) -> Arc<Cart>,
    Cart,
    CartAction,
>;

fn cart_store() -> Store<CartReducer> {
    create_store(
        pure_fn(cart_reducer as fn(&Arc<Cart>, CartAction) -> Arc<Cart>),
        Cart::default(),
    )
}

fn noop_action() -> impl Strategy<Value = CartAction> {
    prop_oneof![
        Just(CartAction::Ignored),
        Just(CartAction::SetOpen(false)),
    ]
}

proptest! {
    #[test]
    fn prop_noop_sequences_keep_reference_and_stay_silent(
        actions in prop::collection::vec(noop_action(), 0..32)
    ) {
        let store = cart_store();
        let probe = NotificationProbe::new();
        let _subscription = store.subscribe(probe.listener("view"));
        let before = store.get_state();

        for action in actions {
            store.dispatch(action).unwrap();
        }

        prop_assert!(Arc::ptr_eq(&before, &store.get_state()));
        prop_assert_eq!(probe.count(), 0);
    }

    #[test]
    fn prop_each_change_notifies_every_listener_once(
        items in prop::collection::vec(any::<u32>(), 1..16)
    ) {
        let store = cart_store();
        let probe = NotificationProbe::new();
        let _first = store.subscribe(probe.listener("first"));
        let _second = store.subscribe(probe.listener("second"));

        for item in &items {
            store.dispatch(CartAction::Add(*item)).unwrap();
        }

        prop_assert_eq!(probe.count_of("first"), items.len());
        prop_assert_eq!(probe.count_of("second"), items.len());
        prop_assert_eq!(&store.get_state().items, &items);
    }
}

#[test]
fn test_listeners_run_in_registration_order() {
    init_test_tracing();
    let store = cart_store();
    let probe = NotificationProbe::new();
    let _a = store.subscribe(probe.listener("a"));
    let _b = store.subscribe(probe.listener("b"));
    let _c = store.subscribe(probe.listener("c"));

    store.dispatch(CartAction::Add(1)).unwrap();

    assert_eq!(probe.calls(), vec!["a", "b", "c"]);
}

#[test]
fn test_unsubscribe_during_notification_keeps_round_complete() {
    let store = cart_store();
    let probe = NotificationProbe::new();
    let later: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

    let _first = store.subscribe({
        let later = Arc::clone(&later);
        let record = probe.listener("first");
        move || {
            record();
            if let Some(subscription) = later.lock().unwrap().as_ref() {
                subscription.unsubscribe();
            }
        }
    });
    *later.lock().unwrap() = Some(store.subscribe(probe.listener("second")));

    store.dispatch(CartAction::Add(1)).unwrap();
    assert_eq!(probe.calls(), vec!["first", "second"]);

    store.dispatch(CartAction::Add(2)).unwrap();
    assert_eq!(probe.calls(), vec!["first", "second", "first"]);
}

#[test]
fn test_subscribe_during_notification_joins_next_round() {
    let store = cart_store();
    let probe = NotificationProbe::new();
    let added: Arc<Mutex<Vec<Subscription>>> = Arc::new(Mutex::new(Vec::new()));

    let _first = store.subscribe({
        let store = store.clone();
        let probe = probe.clone();
        let added = Arc::clone(&added);
        move || {
            let mut added = added.lock().unwrap();
            if added.is_empty() {
                added.push(store.subscribe(probe.listener("late")));
            }
        }
    });

    store.dispatch(CartAction::Add(1)).unwrap();
    assert_eq!(probe.count_of("late"), 0);

    store.dispatch(CartAction::Add(2)).unwrap();
    assert_eq!(probe.count_of("late"), 1);
}

#[test]
fn test_binding_rerenders_only_for_selected_changes() {
    let store = cart_store();
    let binding = Arc::new(use_store(
        store.clone(),
        shallow(|cart: &Cart| (cart.items.len(),)),
    ));
    let probe = NotificationProbe::new();
    let record = probe.listener("render");
    let _subscription = binding.connect(move |_| record());

    store.dispatch(CartAction::SetOpen(true)).unwrap();
    store.dispatch(CartAction::SetOpen(false)).unwrap();
    assert_eq!(probe.count(), 0);

    store.dispatch(CartAction::Add(7)).unwrap();
    assert_eq!(probe.count(), 1);
    assert_eq!(binding.get_snapshot().0, 1);
}

#[test]
fn test_dispatch_from_many_threads_applies_every_action() {
    let store = cart_store();

    let handles: Vec<_> = (0..8)
        .map(|thread| {
            let store = store.clone();
            std::thread::spawn(move || {
                for item in 0..25 {
                    store.dispatch(CartAction::Add(thread * 100 + item)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.get_state().items.len(), 200);
}
