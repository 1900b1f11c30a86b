// Archivo: publisher.rs
// Propósito: pipeline de publicación. Resuelve receptores, construye un
// registro desnormalizado por receptor y los escribe de uno en uno o en
// lotes acotados.
use crate::definition::Definition;
use crate::entity::ActivityEntity;
use crate::errors::{ActivityError, Result};
use crate::record::{ActivityRecord, Fragment, Role};
use crate::registry::DefinitionRegistry;
use crate::repository::{ActivityStore, FollowerSource, DEFAULT_STREAM};
use crate::snapshot;
use crate::stubs::NoFollowers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Opciones de publicación.
///
/// `batch_size` sólo acota el tamaño de cada escritura; no limita la
/// cantidad de lotes que genera una publicación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOptions {
    #[serde(default = "default_use_batch_insert")]
    pub use_batch_insert: bool,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_use_batch_insert() -> bool {
    true
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self { use_batch_insert: true,
               batch_size: DEFAULT_BATCH_SIZE }
    }
}

impl PublishOptions {
    pub fn batched(batch_size: usize) -> Self {
        Self { use_batch_insert: true,
               batch_size }
    }

    pub fn one_by_one() -> Self {
        Self { use_batch_insert: false,
               ..Self::default() }
    }

    /// Lee `ACTIVITY_BATCH_INSERT` y `ACTIVITY_BATCH_SIZE` (tras cargar
    /// `.env` si existe). Las variables ausentes toman el valor por defecto.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut options = Self::default();
        if let Ok(raw) = std::env::var("ACTIVITY_BATCH_INSERT") {
            options.use_batch_insert = match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(ActivityError::Validation(format!("ACTIVITY_BATCH_INSERT inválido: {}", other)));
                }
            };
        }
        if let Ok(raw) = std::env::var("ACTIVITY_BATCH_SIZE") {
            options.batch_size =
                raw.trim()
                   .parse()
                   .map_err(|_| ActivityError::Validation(format!("ACTIVITY_BATCH_SIZE inválido: {}", raw)))?;
        }
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ActivityError::Validation("batch_size debe ser mayor que cero".into()));
        }
        Ok(())
    }
}

/// Datos de una publicación: una entidad por rol más la selección de
/// receptores.
#[derive(Clone, Default)]
pub struct Payload {
    actor: Option<Arc<dyn ActivityEntity>>,
    object: Option<Arc<dyn ActivityEntity>>,
    target_object: Option<Arc<dyn ActivityEntity>>,
    receiver: Option<Arc<dyn ActivityEntity>>,
    receivers: Option<Vec<Arc<dyn ActivityEntity>>>,
    stream: Option<String>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actor(mut self, entity: Arc<dyn ActivityEntity>) -> Self {
        self.actor = Some(entity);
        self
    }

    pub fn object(mut self, entity: Arc<dyn ActivityEntity>) -> Self {
        self.object = Some(entity);
        self
    }

    pub fn target_object(mut self, entity: Arc<dyn ActivityEntity>) -> Self {
        self.target_object = Some(entity);
        self
    }

    pub fn target(self, entity: Arc<dyn ActivityEntity>) -> Self {
        self.target_object(entity)
    }

    /// Receptor único explícito. Tiene prioridad sobre `receivers` y sobre
    /// los seguidores del actor.
    pub fn receiver(mut self, entity: Arc<dyn ActivityEntity>) -> Self {
        self.receiver = Some(entity);
        self
    }

    /// Colección explícita de receptores.
    pub fn receivers(mut self, entities: Vec<Arc<dyn ActivityEntity>>) -> Self {
        self.receivers = Some(entities);
        self
    }

    /// Stream con nombre del que se obtienen los receptores cuando no se
    /// indican explícitamente (por defecto `followers`).
    pub fn stream(mut self, name: impl Into<String>) -> Self {
        self.stream = Some(name.into());
        self
    }

    pub fn get(&self, role: Role) -> Option<&Arc<dyn ActivityEntity>> {
        match role {
            Role::Actor => self.actor.as_ref(),
            Role::Object => self.object.as_ref(),
            Role::TargetObject => self.target_object.as_ref(),
            Role::Receiver => self.receiver.as_ref(),
        }
    }

    /// Modo de selección de receptores que se evaluará.
    pub fn selection(&self) -> ReceiverSelection {
        if self.receiver.is_some() {
            ReceiverSelection::Single
        } else if self.receivers.is_some() {
            ReceiverSelection::Explicit
        } else {
            ReceiverSelection::Stream(self.stream.clone().unwrap_or_else(|| DEFAULT_STREAM.to_string()))
        }
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Payload")
         .field("actor", &self.actor)
         .field("object", &self.object)
         .field("target_object", &self.target_object)
         .field("selection", &self.selection())
         .finish()
    }
}

/// Modo de selección de receptores, en orden de prioridad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverSelection {
    Single,
    Explicit,
    Stream(String),
}

/// Resumen de una publicación. No contiene los registros creados.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSummary {
    pub verb: String,
    /// Registros escritos.
    pub records: usize,
    /// Llamadas `insert_batch` realizadas (0 en modo individual).
    pub batches: usize,
    /// Registros descartados por validación (sólo en modo individual).
    pub rejected: usize,
    pub created_at: DateTime<Utc>,
}

/// Pipeline de publicación.
pub struct ActivityPublisher<S>
    where S: ActivityStore + ?Sized
{
    registry: Arc<DefinitionRegistry>,
    store: Arc<S>,
    followers: Arc<dyn FollowerSource>,
}

impl<S> ActivityPublisher<S> where S: ActivityStore + ?Sized
{
    /// Publicador sin fuente de seguidores: las publicaciones sin receptores
    /// explícitos no generan registros.
    pub fn new(registry: Arc<DefinitionRegistry>, store: Arc<S>) -> Self {
        Self::with_followers(registry, store, Arc::new(NoFollowers))
    }

    pub fn with_followers(registry: Arc<DefinitionRegistry>, store: Arc<S>, followers: Arc<dyn FollowerSource>) -> Self {
        Self { registry,
               store,
               followers }
    }

    pub fn registry(&self) -> &Arc<DefinitionRegistry> {
        &self.registry
    }

    /// Publica `verb` con `payload`.
    ///
    /// Todos los registros de una llamada comparten el mismo par
    /// `created_at`/`updated_at`. En modo lote los campos de cache de todos
    /// los receptores se verifican antes de escribir; después, el primer
    /// error aborta la llamada y los lotes ya escritos permanecen. En modo individual un
    /// registro que no valida se descarta y se continúa; cualquier otro
    /// error aborta.
    pub fn publish(&self, verb: &str, payload: &Payload, options: &PublishOptions) -> Result<PublishSummary> {
        let definition = self.registry.find(verb)?;
        options.validate()?;

        let receivers = self.resolve_receivers(payload)?;
        let timestamp = Utc::now();
        let template = self.template(&definition, payload, timestamp)?;

        let mut summary = PublishSummary { verb: verb.to_string(),
                                           records: 0,
                                           batches: 0,
                                           rejected: 0,
                                           created_at: timestamp };

        if options.use_batch_insert {
            // Todos los receptores se comprueban antes del primer lote: un
            // `InvalidField` no deja registros de esta llamada.
            for receiver in receivers.iter() {
                snapshot::verify(Role::Receiver, &definition, receiver.as_ref())?;
            }
            let mut batch: Vec<ActivityRecord> = Vec::with_capacity(options.batch_size.min(receivers.len()));
            for receiver in receivers.iter() {
                let record = self.build(&definition, &template, receiver.as_ref())?;
                record.validate()?;
                batch.push(record);
                if batch.len() >= options.batch_size {
                    self.flush(&mut batch, &mut summary)?;
                }
            }
            if !batch.is_empty() {
                self.flush(&mut batch, &mut summary)?;
            }
        } else {
            for receiver in receivers.iter() {
                let record = self.build(&definition, &template, receiver.as_ref())?;
                if let Err(e) = record.validate() {
                    log::warn!("'{}': registro para {:?} descartado: {}", verb, receiver, e);
                    summary.rejected += 1;
                    continue;
                }
                self.store.insert_one(&record)?;
                summary.records += 1;
            }
        }

        log::info!("'{}' publicado: {} registros, {} lotes, {} descartados",
                   verb, summary.records, summary.batches, summary.rejected);
        Ok(summary)
    }

    /// Prioridad: receptor único > colección explícita > stream del actor.
    fn resolve_receivers(&self, payload: &Payload) -> Result<Vec<Arc<dyn ActivityEntity>>> {
        match payload.selection() {
            ReceiverSelection::Single => Ok(payload.receiver.iter().cloned().collect()),
            ReceiverSelection::Explicit => Ok(payload.receivers.clone().unwrap_or_default()),
            ReceiverSelection::Stream(stream) => {
                let actor = payload.actor
                                   .as_ref()
                                   .ok_or_else(|| ActivityError::Validation("sin actor no hay receptores por defecto".into()))?;
                self.followers.receivers_of(actor.as_ref(), &stream)
            }
        }
    }

    /// Registro base con los roles comunes ya renderizados. Se verifican y
    /// copian una sola vez por llamada.
    fn template(&self, definition: &Definition, payload: &Payload, timestamp: DateTime<Utc>) -> Result<ActivityRecord> {
        let mut record = ActivityRecord::new(definition.verb(), timestamp);
        for role in [Role::Actor, Role::Object, Role::TargetObject] {
            if let Some(entity) = payload.get(role) {
                snapshot::verify(role, definition, entity.as_ref())?;
                record.set_role(role, Some(snapshot::render(role, definition, entity.as_ref())?));
            }
        }
        Ok(record)
    }

    fn build(&self, definition: &Definition, template: &ActivityRecord, receiver: &dyn ActivityEntity) -> Result<ActivityRecord> {
        let fragment: Fragment = snapshot::render(Role::Receiver, definition, receiver)?;
        let mut record = template.clone();
        record.id = uuid::Uuid::new_v4();
        record.receiver = Some(fragment);
        Ok(record)
    }

    fn flush(&self, batch: &mut Vec<ActivityRecord>, summary: &mut PublishSummary) -> Result<()> {
        log::debug!("'{}': escribiendo lote de {} registros", summary.verb, batch.len());
        self.store.insert_batch(batch.as_slice())?;
        summary.records += batch.len();
        summary.batches += 1;
        batch.clear();
        Ok(())
    }
}
