//! Implementación Diesel del trait `ActivityStore`.
//! Este archivo expone el módulo `schema` y reexporta el almacén y sus
//! constructores. La implementación detallada está en `activity_store.rs`.

mod activity_store;
pub mod schema;

#[cfg(not(feature = "pg"))]
pub use activity_store::new_sqlite_for_test;
pub use activity_store::{new_from_env, DieselActivityStore};
