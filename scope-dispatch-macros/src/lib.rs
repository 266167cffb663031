//! Procedural macros for scope-dispatch

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<ActionVariant, ()>,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<syn::Field>,

    /// Variant wraps a feature's action: generate `From` and `extract_*`
    #[darling(default)]
    embed: bool,
}

/// Convert PascalCase to snake_case
fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

/// Derive macro for the Action trait
///
/// Generates a `name()` method that returns the variant name as a static string.
///
/// Variants marked `#[action(embed)]` must be tuple variants with exactly one
/// field, holding a feature's own action type. For each of them the macro
/// also generates:
/// - `impl From<Inner> for Outer`, the embed direction used by scoped stores
/// - `fn extract_{variant}(self) -> Option<Inner>`, the extract direction
///   used by `pullback`
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum AppAction {
///     #[action(embed)]
///     Counter(CounterAction),
///     Reset,
/// }
///
/// let action: AppAction = CounterAction::Increment.into();
/// assert_eq!(action.name(), "Counter");
/// assert!(action.extract_counter().is_some());
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let name_arms = variants.iter().map(|v| {
        let variant_name = &v.ident;
        let variant_str = variant_name.to_string();

        match &v.fields.style {
            darling::ast::Style::Unit => quote! {
                #name::#variant_name => #variant_str
            },
            darling::ast::Style::Tuple => quote! {
                #name::#variant_name(..) => #variant_str
            },
            darling::ast::Style::Struct => quote! {
                #name::#variant_name { .. } => #variant_str
            },
        }
    });

    let mut embeds = Vec::new();
    for v in variants.iter().filter(|v| v.embed) {
        let variant_name = &v.ident;
        let inner = match (&v.fields.style, v.fields.fields.as_slice()) {
            (darling::ast::Style::Tuple, [field]) => &field.ty,
            _ => {
                return syn::Error::new_spanned(
                    variant_name,
                    "#[action(embed)] requires a tuple variant with exactly one field",
                )
                .to_compile_error()
                .into();
            }
        };

        let extract_fn = format_ident!("extract_{}", to_snake_case(&variant_name.to_string()));
        let doc = format!(
            "Returns the wrapped action if this is `{}::{}`.",
            name, variant_name
        );

        embeds.push(quote! {
            impl #impl_generics ::core::convert::From<#inner> for #name #ty_generics #where_clause {
                fn from(action: #inner) -> Self {
                    #name::#variant_name(action)
                }
            }

            impl #impl_generics #name #ty_generics #where_clause {
                #[doc = #doc]
                #[allow(unreachable_patterns)]
                pub fn #extract_fn(self) -> ::core::option::Option<#inner> {
                    match self {
                        #name::#variant_name(action) => ::core::option::Option::Some(action),
                        _ => ::core::option::Option::None,
                    }
                }
            }
        });
    }

    let expanded = quote! {
        impl #impl_generics scope_dispatch::Action for #name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }
        }

        #(#embeds)*
    };

    TokenStream::from(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Counter"), "counter");
        assert_eq!(to_snake_case("PrimeModal"), "prime_modal");
        assert_eq!(to_snake_case("NthPrime"), "nth_prime");
    }
}
