//! Shallow equality for selector memoization
//!
//! Two traits split the comparison into its two levels:
//!
//! - [`SameValue`]: the per-field test. Scalars and strings compare by value,
//!   shared pointers (`Arc`, `Rc`, references) compare by identity.
//! - [`ShallowEq`]: the top-level test. A struct is shallow-equal to another
//!   when every field is [`SameValue`]. Nested values are never walked.
//!
//! Struct impls are normally generated with `#[derive(ShallowEq)]` from
//! `storefront-macros`.
//!
//! Collections that are rebuilt on every selector run should be held as
//! `Arc<[T]>`/`Arc<Vec<T>>` inside state so the identity check can succeed.
//! A bare `Vec<T>` is [`ShallowEq`] (element-wise [`SameValue`]) but is not a
//! [`SameValue`] field itself, since a fresh `Vec` has no identity to compare.

use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

/// Identity-or-primitive equality for a single field
pub trait SameValue {
    /// Returns `true` when both values are the same primitive value or the
    /// same shared allocation
    fn same_value(&self, other: &Self) -> bool;
}

/// One-level-deep equality
pub trait ShallowEq {
    /// Returns `true` when every top-level component of `self` is
    /// [`SameValue`] with the matching component of `other`
    fn shallow_eq(&self, other: &Self) -> bool;
}

macro_rules! impl_by_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SameValue for $ty {
                #[inline]
                fn same_value(&self, other: &Self) -> bool {
                    self == other
                }
            }

            impl ShallowEq for $ty {
                #[inline]
                fn shallow_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_by_value!(
    (), bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, String, str,
    &'static str,
);

// Floats follow `Object.is`: NaN equals NaN, +0 and -0 differ.
macro_rules! impl_float {
    ($($ty:ty),*) => {
        $(
            impl SameValue for $ty {
                #[inline]
                fn same_value(&self, other: &Self) -> bool {
                    self.to_bits() == other.to_bits() || (self.is_nan() && other.is_nan())
                }
            }

            impl ShallowEq for $ty {
                #[inline]
                fn shallow_eq(&self, other: &Self) -> bool {
                    self.same_value(other)
                }
            }
        )*
    };
}

impl_float!(f32, f64);

impl<T: ?Sized> SameValue for Arc<T> {
    #[inline]
    fn same_value(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> ShallowEq for Arc<T> {
    #[inline]
    fn shallow_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> SameValue for Rc<T> {
    #[inline]
    fn same_value(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: SameValue> SameValue for Option<T> {
    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same_value(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: ShallowEq> ShallowEq for Option<T> {
    fn shallow_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.shallow_eq(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: SameValue> ShallowEq for Vec<T> {
    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.same_value(b))
    }
}

impl<T: SameValue> ShallowEq for [T] {
    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.same_value(b))
    }
}

impl<K: Ord, V: SameValue> ShallowEq for BTreeMap<K, V> {
    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|((ka, va), (kb, vb))| ka == kb && va.same_value(vb))
    }
}

macro_rules! impl_tuple {
    ($(($($name:ident . $idx:tt),+)),* $(,)?) => {
        $(
            impl<$($name: SameValue),+> ShallowEq for ($($name,)+) {
                fn shallow_eq(&self, other: &Self) -> bool {
                    $(self.$idx.same_value(&other.$idx))&&+
                }
            }
        )*
    };
}

impl_tuple!(
    (A.0),
    (A.0, B.1),
    (A.0, B.1, C.2),
    (A.0, B.1, C.2, D.3),
    (A.0, B.1, C.2, D.3, E.4),
    (A.0, B.1, C.2, D.3, E.4, F.5),
);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_arc_compares_by_identity() {
        let a = Arc::new(vec![1, 2, 3]);
        let b = Arc::new(vec![1, 2, 3]);

        assert!(a.same_value(&Arc::clone(&a)));
        assert!(!a.same_value(&b));
    }

    #[test]
    fn test_tuple_is_one_level_deep() {
        let shared = Arc::new(String::from("shared"));
        let left = (1_u32, Arc::clone(&shared));
        let right = (1_u32, Arc::clone(&shared));
        let fresh = (1_u32, Arc::new(String::from("shared")));

        assert!(left.shallow_eq(&right));
        assert!(!left.shallow_eq(&fresh));
    }

    #[test]
    fn test_float_follows_object_is() {
        assert!(f64::NAN.same_value(&f64::NAN));
        assert!(!0.0_f64.same_value(&-0.0_f64));
    }

    #[test]
    fn test_map_requires_same_keys() {
        let value = Arc::new(1);
        let mut a = BTreeMap::new();
        a.insert("x", Arc::clone(&value));
        let mut b = BTreeMap::new();
        b.insert("y", Arc::clone(&value));

        assert!(!a.shallow_eq(&b));
        b.remove("y");
        b.insert("x", value);
        assert!(a.shallow_eq(&b));
    }

    proptest! {
        #[test]
        fn prop_scalar_vec_matches_partial_eq(a in prop::collection::vec(any::<i64>(), 0..8),
                                              b in prop::collection::vec(any::<i64>(), 0..8)) {
            prop_assert_eq!(a.shallow_eq(&b), a == b);
        }
    }
}
