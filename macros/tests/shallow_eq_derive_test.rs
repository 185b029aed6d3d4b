//! Tests for #[derive(ShallowEq)] macro

use std::sync::Arc;
use storefront_core::ShallowEq as _;
use storefront_macros::ShallowEq;

#[derive(ShallowEq, Clone, Debug)]
struct ListView {
    products: Arc<Vec<String>>,
    total_count: usize,
    loading: bool,
    error: Option<String>,
}

#[derive(ShallowEq, Clone, Debug)]
struct Pair(u32, Arc<str>);

#[derive(ShallowEq, Clone, Debug)]
struct Tagged {
    id: u64,
    #[shallow(skip)]
    #[allow(dead_code)]
    render_count: u64,
}

#[derive(ShallowEq, Clone, Debug)]
struct Wrapper<T> {
    inner: Arc<T>,
}

#[derive(ShallowEq)]
struct Marker;

fn list_view(products: &Arc<Vec<String>>) -> ListView {
    ListView {
        products: Arc::clone(products),
        total_count: 2,
        loading: false,
        error: None,
    }
}

#[test]
fn test_equal_when_fields_share_allocations() {
    let products = Arc::new(vec!["a".to_string(), "b".to_string()]);

    assert!(list_view(&products).shallow_eq(&list_view(&products)));
}

#[test]
fn test_not_equal_when_nested_value_is_reallocated() {
    let products = Arc::new(vec!["a".to_string(), "b".to_string()]);
    let copy = Arc::new(products.as_ref().clone());

    assert!(!list_view(&products).shallow_eq(&list_view(&copy)));
}

#[test]
fn test_scalar_field_difference_is_detected() {
    let products = Arc::new(Vec::new());
    let mut loading = list_view(&products);
    loading.loading = true;

    assert!(!list_view(&products).shallow_eq(&loading));
}

#[test]
fn test_tuple_struct() {
    let name: Arc<str> = Arc::from("name");

    assert!(Pair(1, Arc::clone(&name)).shallow_eq(&Pair(1, Arc::clone(&name))));
    assert!(!Pair(1, Arc::clone(&name)).shallow_eq(&Pair(2, name)));
}

#[test]
fn test_skipped_field_is_ignored() {
    let a = Tagged { id: 1, render_count: 1 };
    let b = Tagged { id: 1, render_count: 99 };

    assert!(a.shallow_eq(&b));
}

#[test]
fn test_generic_struct() {
    let inner = Arc::new(5_u8);
    let a = Wrapper { inner: Arc::clone(&inner) };
    let b = Wrapper { inner };

    assert!(a.shallow_eq(&b));
}

#[test]
fn test_unit_struct_is_always_equal() {
    assert!(Marker.shallow_eq(&Marker));
}
