//! Derive macros for the storefront state container
//!
//! # Available Macros
//!
//! - `#[derive(ShallowEq)]` - One-level-deep equality for selector outputs
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use storefront_core::ShallowEq as _;
//! use storefront_macros::ShallowEq;
//!
//! #[derive(ShallowEq)]
//! struct ListView {
//!     products: Arc<[Product]>,
//!     total_count: usize,
//!     loading: bool,
//! }
//!
//! // Generated:
//! // impl ShallowEq for ListView {
//! //     fn shallow_eq(&self, other: &Self) -> bool {
//! //         SameValue::same_value(&self.products, &other.products)
//! //             && SameValue::same_value(&self.total_count, &other.total_count)
//! //             && SameValue::same_value(&self.loading, &other.loading)
//! //     }
//! // }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Fields, Index};

/// Derive macro for `storefront_core::shallow::ShallowEq`
///
/// Every field must implement `storefront_core::shallow::SameValue`:
/// scalars and strings compare by value, `Arc`/`Rc` fields by identity.
///
/// # Attributes
///
/// - `#[shallow(skip)]` - Leave a field out of the comparison
///
/// # Errors
///
/// Produces a compile error (not a runtime panic) if:
/// - Applied to an enum or union
/// - A `#[shallow(...)]` attribute has an unknown argument
///
/// # Example
///
/// ```ignore
/// #[derive(ShallowEq)]
/// struct DetailView {
///     product: Option<Arc<Product>>,
///     related: Arc<[Product]>,
///     #[shallow(skip)]
///     rendered_at: Instant,
/// }
/// ```
#[proc_macro_derive(ShallowEq, attributes(shallow))]
pub fn derive_shallow_eq(input: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(input as DeriveInput);
    let name = input.ident.clone();

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new_spanned(
            &input.ident,
            "#[derive(ShallowEq)] can only be used on structs"
        )
        .to_compile_error()
        .into();
    };

    let mut comparisons = Vec::new();
    let mut bounded_types = Vec::new();

    match &data_struct.fields {
        Fields::Named(fields) => {
            for field in &fields.named {
                match is_skipped(&field.attrs) {
                    Ok(true) => continue,
                    Ok(false) => {},
                    Err(err) => return err.to_compile_error().into(),
                }
                let ident = &field.ident;
                comparisons.push(quote! {
                    ::storefront_core::shallow::SameValue::same_value(&self.#ident, &other.#ident)
                });
                bounded_types.push(field.ty.clone());
            }
        },
        Fields::Unnamed(fields) => {
            for (position, field) in fields.unnamed.iter().enumerate() {
                match is_skipped(&field.attrs) {
                    Ok(true) => continue,
                    Ok(false) => {},
                    Err(err) => return err.to_compile_error().into(),
                }
                let index = Index::from(position);
                comparisons.push(quote! {
                    ::storefront_core::shallow::SameValue::same_value(&self.#index, &other.#index)
                });
                bounded_types.push(field.ty.clone());
            }
        },
        Fields::Unit => {},
    }

    if !input.generics.params.is_empty() {
        let where_clause = input.generics.make_where_clause();
        for ty in &bounded_types {
            where_clause
                .predicates
                .push(parse_quote!(#ty: ::storefront_core::shallow::SameValue));
        }
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::storefront_core::shallow::ShallowEq for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn shallow_eq(&self, other: &Self) -> bool {
                true #(&& #comparisons)*
            }
        }
    };

    TokenStream::from(expanded)
}

/// Returns `Ok(true)` when the field carries `#[shallow(skip)]`
fn is_skipped(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut skipped = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("shallow")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skipped = true;
                Ok(())
            } else {
                Err(meta.error("unsupported shallow attribute, expected `skip`"))
            }
        })?;
    }
    Ok(skipped)
}
