// Archivo: repository.rs
// Propósito: contratos de los colaboradores externos del motor:
// almacenamiento de registros (`ActivityStore`), resolución de receptores
// por defecto (`FollowerSource`) y carga de entidades vivas
// (`EntityResolver`).
use crate::entity::ActivityEntity;
use crate::errors::Result;
use crate::query::StreamQuery;
use crate::record::ActivityRecord;
use std::sync::Arc;
use uuid::Uuid;

/// Stream de receptores usado cuando el payload no indica ninguno.
pub const DEFAULT_STREAM: &str = "followers";

/// Almacenamiento de registros de actividad.
pub trait ActivityStore: Send + Sync {
    /// Persiste un registro individual.
    fn insert_one(&self, record: &ActivityRecord) -> Result<()>;

    /// Persiste un lote en una sola llamada. Se aplica completo o falla
    /// completo; no hay éxito parcial dentro de un lote.
    fn insert_batch(&self, records: &[ActivityRecord]) -> Result<()>;

    /// Ejecuta una consulta de stream. Los resultados respetan el orden de
    /// la consulta (`created_at` descendente).
    fn find(&self, query: &StreamQuery) -> Result<Vec<ActivityRecord>>;

    /// Obtiene un registro por id.
    fn get(&self, id: &Uuid) -> Result<Option<ActivityRecord>>;

    /// Reemplaza un registro existente (mismo `id`). `NotFound` si no existe.
    fn replace(&self, record: &ActivityRecord) -> Result<()>;

    /// Número total de registros.
    fn count(&self) -> Result<usize>;
}

/// Resuelve los receptores de un actor para un stream con nombre
/// (`followers`, `friends`...).
pub trait FollowerSource: Send + Sync {
    fn receivers_of(&self, actor: &dyn ActivityEntity, stream: &str) -> Result<Vec<Arc<dyn ActivityEntity>>>;
}

/// Carga la entidad viva referenciada por un fragmento `(type, id)`.
pub trait EntityResolver: Send + Sync {
    fn resolve(&self, kind: &str, id: &str) -> Result<Option<Arc<dyn ActivityEntity>>>;
}
