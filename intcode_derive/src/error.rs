//! Derive macro for error types.
//!
//! ```ignore
//! use intcode_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum VMError {
//!     #[error("unknown opcode {opcode} at ip {ip}")]
//!     UnknownOpcode { opcode: i64, ip: usize },
//!
//!     #[error("bad token: {0}")]
//!     BadToken(String),
//!
//!     #[error("output queue is empty")]
//!     EmptyOutputPop,
//! }
//! ```
//!
//! Fields are passed to `write!` as named arguments. Tuple fields are
//! referenced as `{0}`, `{1}`, ... and renamed to `{f0}`, `{f1}`, ... internally.
//! Fields that the message never mentions are not forwarded, so a variant may
//! carry context that only shows up through `Debug`.

use proc_macro::TokenStream;
use proc_macro2::{Ident, TokenStream as TokenStream2};
use quote::{ToTokens, format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, Lit, Meta, parse_macro_input};

pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Enum(data) => {
            let arms = data
                .variants
                .iter()
                .map(|variant| {
                    let ident = &variant.ident;
                    let message = message_from_attrs(
                        &variant.attrs,
                        ident,
                        &format!("variant `{}`", ident),
                    )?;
                    Ok(variant_arm(ident, &variant.fields, &message))
                })
                .collect::<syn::Result<Vec<_>>>()?;

            quote! {
                match self {
                    #(#arms)*
                }
            }
        }
        Data::Struct(data) => {
            let message =
                message_from_attrs(&input.attrs, name, &format!("type `{}`", name))?;
            struct_body(&data.fields, &message)
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Error cannot be derived for unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                #body
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
    })
}

/// Builds one `match` arm writing the message of an enum variant.
fn variant_arm(ident: &Ident, fields: &Fields, message: &str) -> TokenStream2 {
    match fields {
        Fields::Unit => quote! {
            Self::#ident => write!(f, #message),
        },
        Fields::Unnamed(unnamed) => {
            let count = unnamed.unnamed.len();
            let format = positional_to_named(message, count);
            let bindings: Vec<Ident> = (0..count).map(|i| format_ident!("f{}", i)).collect();
            let used: Vec<&Ident> = bindings
                .iter()
                .filter(|b| mentions(&format, &b.to_string()))
                .collect();
            quote! {
                #[allow(unused_variables)]
                Self::#ident(#(#bindings),*) => write!(f, #format, #(#used = #used),*),
            }
        }
        Fields::Named(named) => {
            let bindings: Vec<&Ident> = named.named.iter().filter_map(|f| f.ident.as_ref()).collect();
            let used: Vec<&Ident> = bindings
                .iter()
                .copied()
                .filter(|b| mentions(message, &b.to_string()))
                .collect();
            quote! {
                #[allow(unused_variables)]
                Self::#ident { #(#bindings),* } => write!(f, #message, #(#used = #used),*),
            }
        }
    }
}

/// Builds the `fmt` body of a struct error.
fn struct_body(fields: &Fields, message: &str) -> TokenStream2 {
    match fields {
        Fields::Unit => quote! { write!(f, #message) },
        Fields::Named(named) => {
            let used: Vec<&Ident> = named
                .named
                .iter()
                .filter_map(|f| f.ident.as_ref())
                .filter(|b| mentions(message, &b.to_string()))
                .collect();
            quote! { write!(f, #message, #(#used = self.#used),*) }
        }
        Fields::Unnamed(unnamed) => {
            let count = unnamed.unnamed.len();
            let format = positional_to_named(message, count);
            let (names, indices): (Vec<Ident>, Vec<syn::Index>) = (0..count)
                .map(|i| (format_ident!("f{}", i), syn::Index::from(i)))
                .filter(|(name, _)| mentions(&format, &name.to_string()))
                .unzip();
            quote! { write!(f, #format, #(#names = self.#indices),*) }
        }
    }
}

/// Reads the string literal of the `#[error("...")]` attribute.
fn message_from_attrs<T: ToTokens>(
    attrs: &[Attribute],
    target: &T,
    description: &str,
) -> syn::Result<String> {
    let Some(attr) = attrs.iter().find(|a| a.path().is_ident("error")) else {
        return Err(syn::Error::new_spanned(
            target,
            format!("missing #[error(\"...\")] attribute on {}", description),
        ));
    };

    let Meta::List(list) = &attr.meta else {
        return Err(syn::Error::new_spanned(
            &attr.meta,
            "expected #[error(\"message\")]",
        ));
    };

    match syn::parse2::<Lit>(list.tokens.clone()) {
        Ok(Lit::Str(lit)) => Ok(lit.value()),
        _ => Err(syn::Error::new_spanned(
            &attr.meta,
            "#[error] message must be a string literal, e.g. #[error(\"negative address {address}\")]",
        )),
    }
}

/// Returns true if `format` contains a `{name}` or `{name:...}` placeholder.
fn mentions(format: &str, name: &str) -> bool {
    let plain = format!("{{{}}}", name);
    let spec = format!("{{{}:", name);
    format.contains(&plain) || format.contains(&spec)
}

/// Rewrites `{0}`, `{1:?}`, ... into `{f0}`, `{f1:?}`, ...
fn positional_to_named(format: &str, count: usize) -> String {
    let mut result = format.to_string();
    for i in (0..count).rev() {
        result = result
            .replace(&format!("{{{}}}", i), &format!("{{f{}}}", i))
            .replace(&format!("{{{}:", i), &format!("{{f{}:", i));
    }
    result
}
