//! Derive macros for repokit
//!
//! Provides `#[derive(Entity)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod entity;
mod sql_ident;

/// Derive `TableNamer`, `Getter` and `Mutator` for a struct.
///
/// # Example
///
/// ```ignore
/// use repokit::Entity;
///
/// #[derive(Default, Entity)]
/// #[repo(table = "users")]
/// struct User {
///     #[repo(skip_insert)]
///     id: i64,
///     username: String,
///     #[repo(column = "email_address")]
///     email: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[repo(table = "name")]` - Table name, optionally schema-qualified (required)
/// - `#[repo(column = "name")]` - Map field to a different column name
/// - `#[repo(skip_insert)]` - Scan the field but leave it out of INSERTs
///
/// Every field type must implement `repokit::FromValue`; inserted fields must
/// also be `Clone` and convertible into `repokit::Value`.
#[proc_macro_derive(Entity, attributes(repo))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
