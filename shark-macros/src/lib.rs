use proc_macro::TokenStream;
use syn::DeriveInput;

mod entity;

/// Derive the `Entity` trait from a struct declaration.
///
/// Recognized attributes:
///
/// - `#[sql("table")]` on the struct overrides the table name.
/// - `#[sql(primary_key, auto_increment, not_null, unique, length = N,
///   name = "...")]` on a field, in any combination.
#[proc_macro_derive(Entity, attributes(sql))]
pub fn entity(input: TokenStream) -> TokenStream {
    match entity::entity(syn::parse_macro_input!(input as DeriveInput)) {
        Ok(ok) => ok,
        Err(err) => err.into_compile_error().into(),
    }
}
