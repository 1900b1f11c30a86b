// Archivo: service.rs
// Propósito: implementar `ActivityService`, una capa orquestadora que
// expone las operaciones de alto nivel (definir verbos, publicar, leer
// streams, recargar instancias y refrescar cachés).
use crate::definition::Definition;
use crate::dsl::DefinitionDsl;
use crate::entity::ActivityEntity;
use crate::errors::{ActivityError, Result};
use crate::publisher::{ActivityPublisher, Payload, PublishOptions, PublishSummary};
use crate::query::{StreamOptions, StreamQuery};
use crate::record::{ActivityRecord, Role};
use crate::registry::DefinitionRegistry;
use crate::repository::{ActivityStore, EntityResolver, FollowerSource};
use crate::snapshot;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Servicio de alto nivel sobre actividades.
///
/// Orquesta el registro de definiciones, el publicador y el almacén. Las
/// opciones de publicación por defecto se fijan al construir el servicio.
pub struct ActivityService<S>
    where S: ActivityStore + ?Sized
{
    registry: Arc<DefinitionRegistry>,
    store: Arc<S>,
    publisher: ActivityPublisher<S>,
    resolver: Option<Arc<dyn EntityResolver>>,
    options: PublishOptions,
}

impl<S> ActivityService<S> where S: ActivityStore + ?Sized
{
    pub fn new(registry: Arc<DefinitionRegistry>, store: Arc<S>, followers: Arc<dyn FollowerSource>) -> Self {
        let publisher = ActivityPublisher::with_followers(registry.clone(), store.clone(), followers);
        Self { registry,
               store,
               publisher,
               resolver: None,
               options: PublishOptions::default() }
    }

    /// Inyecta el resolvedor de entidades usado por `load_instance` y
    /// `refresh`.
    pub fn with_resolver(mut self, resolver: Arc<dyn EntityResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_options(mut self, options: PublishOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Arc<DefinitionRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Define y registra un verbo.
    pub fn define<F>(&self, verb: &str, block: F) -> Arc<Definition>
        where F: FnOnce(&mut DefinitionDsl)
    {
        self.registry.define(verb, block)
    }

    pub fn register(&self, definition: Definition) -> Arc<Definition> {
        self.registry.register(definition)
    }

    /// Publica con las opciones del servicio.
    pub fn publish(&self, verb: &str, payload: &Payload) -> Result<PublishSummary> {
        self.publisher.publish(verb, payload, &self.options)
    }

    pub fn publish_with(&self, verb: &str, payload: &Payload, options: &PublishOptions) -> Result<PublishSummary> {
        self.publisher.publish(verb, payload, options)
    }

    /// Stream de `actor` como receptor, más reciente primero.
    pub fn stream_for(&self, actor: &dyn ActivityEntity, options: &StreamOptions) -> Result<Vec<ActivityRecord>> {
        StreamQuery::stream_for(actor, options).fetch(self.store.as_ref())
    }

    /// Actividades que `actor` originó y además recibió.
    pub fn actor_stream_for(&self, actor: &dyn ActivityEntity, options: &StreamOptions) -> Result<Vec<ActivityRecord>> {
        StreamQuery::actor_stream_for(actor, options).fetch(self.store.as_ref())
    }

    /// Carga la entidad viva referenciada por `role` en `record`.
    pub fn load_instance(&self, record: &ActivityRecord, role: Role) -> Result<Arc<dyn ActivityEntity>> {
        let fragment = record.role(role)
                             .ok_or_else(|| ActivityError::NotFound(format!("rol {} vacío en {}", role, record.id)))?;
        self.resolver()?
            .resolve(&fragment.kind, &fragment.id)?
            .ok_or_else(|| ActivityError::NotFound(format!("{} {}", fragment.kind, fragment.id)))
    }

    /// Vuelve a renderizar los roles de un registro guardado a partir de las
    /// entidades vivas y lo reemplaza. Conserva `created_at`.
    pub fn refresh(&self, id: &Uuid) -> Result<ActivityRecord> {
        let mut record = self.store
                             .get(id)?
                             .ok_or_else(|| ActivityError::NotFound(format!("actividad {}", id)))?;
        let definition = self.registry.find(&record.verb)?;
        for role in record.populated_roles() {
            let entity = self.load_instance(&record, role)?;
            let fragment = snapshot::render(role, &definition, entity.as_ref())?;
            record.set_role(role, Some(fragment));
        }
        record.updated_at = Utc::now();
        self.store.replace(&record)?;
        log::debug!("actividad {} refrescada", id);
        Ok(record)
    }

    fn resolver(&self) -> Result<&Arc<dyn EntityResolver>> {
        self.resolver
            .as_ref()
            .ok_or_else(|| ActivityError::Validation("no hay EntityResolver configurado".into()))
    }
}
