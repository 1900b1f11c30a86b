//! Crate `activity`: publicación y lectura de actividades desnormalizadas
//!
//! Una actividad ("el usuario X publicó la foto Y en el álbum Z") se guarda
//! como un registro por receptor que embebe instantáneas de las entidades
//! participantes, de modo que leer un stream no requiere más consultas.
//!
//! Piezas:
//! - `DefinitionDsl` / `DefinitionRegistry`: esquema por verbo (qué tipos
//!   ocupan cada rol y qué campos se cachean).
//! - `snapshot`: render de una entidad a `{type, id, cache...}`.
//! - `ActivityPublisher`: fan-out por receptor con escritura en lotes.
//! - `StreamQuery`: consultas de stream por receptor y verbo.
//! - `ActivityStore`, `FollowerSource`, `EntityResolver`: colaboradores.
//!
//! Ejemplo rápido:
//! ```rust
//! use activity::{ActivityPublisher, DefinitionRegistry, InMemoryActivityStore};
//! use std::sync::Arc;
//! let registry = Arc::new(DefinitionRegistry::new());
//! registry.define("new_photo", |d| {
//!     d.actor("user", &["full_name"]).object("photo", &["file"]);
//! });
//! let store = Arc::new(InMemoryActivityStore::new());
//! let publisher = ActivityPublisher::new(registry, store);
//! ```
pub mod definition;
pub mod dsl;
pub mod entity;
pub mod errors;
pub mod publisher;
pub mod query;
pub mod record;
pub mod registry;
pub mod repository;
pub mod service;
pub mod snapshot;
pub mod stubs;

pub use definition::*;
pub use dsl::*;
pub use entity::*;
pub use errors::*;
pub use publisher::*;
pub use query::*;
pub use record::*;
pub use registry::*;
pub use repository::*;
pub use service::*;
pub use stubs::*;
