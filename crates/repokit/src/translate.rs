//! Field translation: API-level filter, sort and update requests to query-model values.
//!
//! Every API field name goes through an [`ApiToDbFields`] allow-list; anything
//! not on it is rejected with a typed [`TranslateError`]. Translation is pure.
//!
//! ```ignore
//! use repokit::translate::{ApiOrders, ApiSelectors, ApiToDbFields, parse_get_input};
//!
//! let fields = ApiToDbFields::new()
//!     .field("age", "users", "age")
//!     .field("name", "users", "name");
//! let selectors: ApiSelectors = serde_json::from_str(r#"{"age": {"predicate": "ge", "value": 18}}"#)?;
//! let orders = ApiOrders::new().add("name", "asc");
//!
//! let input = parse_get_input(&fields, &selectors, &orders, None, 100, false)?;
//! let users = repo.get_many(&conn, User::default, &input.get_options()).await?;
//! ```

mod error;
mod fields;
mod parsed;
mod predicate;

pub use error::TranslateError;
pub use fields::{ApiOrders, ApiSelector, ApiSelectors, ApiToDbFields, ApiUpdates, DbField};
pub use parsed::{
    ParsedDeleteInput, ParsedGetInput, ParsedUpdateInput, parse_delete_input, parse_get_input,
    parse_update_input,
};
pub use predicate::{PredicateSet, parse_direction, parse_predicate};

#[cfg(test)]
mod tests;
