// Archivo: stubs.rs
// Propósito: implementaciones en memoria para pruebas y wiring rápido.
//
// Incluye un almacén de actividades en memoria (`InMemoryActivityStore`) y
// fuentes de receptores (`StaticFollowers`, `NoFollowers`). No son durables.
use crate::entity::ActivityEntity;
use crate::errors::{ActivityError, Result};
use crate::query::StreamQuery;
use crate::record::ActivityRecord;
use crate::repository::{ActivityStore, FollowerSource};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Almacén en memoria. Conserva el orden de inserción y registra el tamaño
/// de cada lote para inspección en pruebas.
pub struct InMemoryActivityStore {
    records: Mutex<Vec<ActivityRecord>>,
    /// Tamaño de cada llamada `insert_batch` aceptada.
    batch_sizes: Mutex<Vec<usize>>,
    single_inserts: Mutex<usize>,
    /// Si es `Some(n)`, los lotes a partir del n-ésimo (0-based) fallan.
    fail_after_batches: Mutex<Option<usize>>,
    /// Igual para `insert_one`: falla a partir de la n-ésima inserción.
    fail_after_inserts: Mutex<Option<usize>>,
}

impl InMemoryActivityStore {
    pub fn new() -> Self {
        Self { records: Mutex::new(Vec::new()),
               batch_sizes: Mutex::new(Vec::new()),
               single_inserts: Mutex::new(0),
               fail_after_batches: Mutex::new(None),
               fail_after_inserts: Mutex::new(None) }
    }

    /// Helper para mapear `Mutex::lock()` en un `Result` con
    /// `ActivityError::Storage`.
    fn lock<'a, T>(&'a self, m: &'a Mutex<T>) -> Result<MutexGuard<'a, T>> {
        m.lock().map_err(|e| ActivityError::Storage(format!("mutex poisoned: {:?}", e)))
    }

    /// Hace fallar los lotes posteriores a los `n` primeros aceptados.
    pub fn fail_after_batches(&self, n: usize) {
        *self.fail_after_batches.lock().unwrap_or_else(|e| e.into_inner()) = Some(n);
    }

    /// Hace fallar las inserciones individuales posteriores a las `n`
    /// primeras aceptadas.
    pub fn fail_after_inserts(&self, n: usize) {
        *self.fail_after_inserts.lock().unwrap_or_else(|e| e.into_inner()) = Some(n);
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn single_inserts(&self) -> usize {
        *self.single_inserts.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copia de todos los registros en orden de inserción.
    pub fn all(&self) -> Vec<ActivityRecord> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for InMemoryActivityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityStore for InMemoryActivityStore {
    fn insert_one(&self, record: &ActivityRecord) -> Result<()> {
        let mut inserted = self.lock(&self.single_inserts)?;
        if let Some(limit) = *self.lock(&self.fail_after_inserts)? {
            if *inserted >= limit {
                return Err(ActivityError::Storage(format!("inserción {} rechazada", *inserted)));
            }
        }
        record.validate()?;
        self.lock(&self.records)?.push(record.clone());
        *inserted += 1;
        Ok(())
    }

    /// Todo o nada: si algún registro no valida no se inserta ninguno.
    fn insert_batch(&self, records: &[ActivityRecord]) -> Result<()> {
        let mut sizes = self.lock(&self.batch_sizes)?;
        if let Some(limit) = *self.lock(&self.fail_after_batches)? {
            if sizes.len() >= limit {
                return Err(ActivityError::Storage(format!("lote {} rechazado", sizes.len())));
            }
        }
        for r in records {
            r.validate()?;
        }
        self.lock(&self.records)?.extend(records.iter().cloned());
        sizes.push(records.len());
        Ok(())
    }

    /// Filtra por criterios y ordena por `created_at` descendente. El orden
    /// es estable: a igual timestamp se respeta el orden de inserción.
    fn find(&self, query: &StreamQuery) -> Result<Vec<ActivityRecord>> {
        let records = self.lock(&self.records)?;
        let mut out: Vec<ActivityRecord> = records.iter().filter(|r| query.matches(r)).cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    fn get(&self, id: &Uuid) -> Result<Option<ActivityRecord>> {
        let records = self.lock(&self.records)?;
        Ok(records.iter().find(|r| &r.id == id).cloned())
    }

    fn replace(&self, record: &ActivityRecord) -> Result<()> {
        let mut records = self.lock(&self.records)?;
        let slot = records.iter_mut()
                          .find(|r| r.id == record.id)
                          .ok_or_else(|| ActivityError::NotFound(format!("actividad {}", record.id)))?;
        *slot = record.clone();
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.lock(&self.records)?.len())
    }
}

/// Fuente de receptores que nunca devuelve ninguno.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFollowers;

impl FollowerSource for NoFollowers {
    fn receivers_of(&self, _actor: &dyn ActivityEntity, _stream: &str) -> Result<Vec<Arc<dyn ActivityEntity>>> {
        Ok(Vec::new())
    }
}

/// Mapa fijo `(tipo, id, stream)` -> receptores.
#[derive(Default)]
pub struct StaticFollowers {
    streams: Mutex<HashMap<(String, String, String), Vec<Arc<dyn ActivityEntity>>>>,
}

impl StaticFollowers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define los receptores de `actor` para `stream`.
    pub fn set(&self, actor: &dyn ActivityEntity, stream: &str, receivers: Vec<Arc<dyn ActivityEntity>>) {
        self.streams
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((actor.kind().to_string(), actor.id(), stream.to_string()), receivers);
    }
}

impl FollowerSource for StaticFollowers {
    fn receivers_of(&self, actor: &dyn ActivityEntity, stream: &str) -> Result<Vec<Arc<dyn ActivityEntity>>> {
        let streams = self.streams
                          .lock()
                          .map_err(|e| ActivityError::Storage(format!("mutex poisoned: {:?}", e)))?;
        Ok(streams.get(&(actor.kind().to_string(), actor.id(), stream.to_string()))
                  .cloned()
                  .unwrap_or_default())
    }
}
