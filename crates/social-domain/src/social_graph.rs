use crate::DomainError;
use activity::{ActivityEntity, ActivityError, EntityResolver, FollowerSource};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub const FOLLOWERS: &str = "followers";
pub const FRIENDS: &str = "friends";

type EntityKey = (String, String);

fn key_of(entity: &dyn ActivityEntity) -> EntityKey {
  (entity.kind().to_string(), entity.id())
}

/// Grafo social en memoria para tests y desarrollo.
///
/// Guarda las entidades por `(tipo, id)` y las relaciones por stream:
/// `followers` (dirigida) y `friends` (simétrica). Sirve como
/// `FollowerSource` y como `EntityResolver` del motor de actividades.
pub struct SocialGraph {
  entities: Mutex<HashMap<EntityKey, Arc<dyn ActivityEntity>>>,
  // (stream, destino) -> receptores en orden de alta
  edges: Mutex<HashMap<(String, EntityKey), Vec<EntityKey>>>,
}

impl SocialGraph {
  pub fn new() -> Self {
    Self { entities: Mutex::new(HashMap::new()), edges: Mutex::new(HashMap::new()) }
  }

  // Helper to map poisoned mutex errors into DomainError
  fn lock_map<'a, T>(&'a self, m: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>, DomainError> {
    m.lock().map_err(|e| DomainError::ValidationError(format!("Mutex '{}' poisoned: {}", name, e)))
  }

  /// Inserta o reemplaza la versión viva de una entidad.
  pub fn upsert(&self, entity: Arc<dyn ActivityEntity>) -> Result<(), DomainError> {
    let mut entities = self.lock_map(&self.entities, "entities")?;
    entities.insert(key_of(entity.as_ref()), entity);
    Ok(())
  }

  pub fn remove(&self, entity: &dyn ActivityEntity) -> Result<(), DomainError> {
    let mut entities = self.lock_map(&self.entities, "entities")?;
    entities.remove(&key_of(entity));
    Ok(())
  }

  pub fn get(&self, kind: &str, id: &str) -> Result<Option<Arc<dyn ActivityEntity>>, DomainError> {
    let entities = self.lock_map(&self.entities, "entities")?;
    Ok(entities.get(&(kind.to_string(), id.to_string())).cloned())
  }

  /// `follower` pasa a seguir a `followed`. Ambos deben estar registrados.
  pub fn follow(&self, follower: &dyn ActivityEntity, followed: &dyn ActivityEntity) -> Result<(), DomainError> {
    self.link(FOLLOWERS, followed, follower)
  }

  /// Relación de amistad (en ambos sentidos).
  pub fn befriend(&self, a: &dyn ActivityEntity, b: &dyn ActivityEntity) -> Result<(), DomainError> {
    self.link(FRIENDS, a, b)?;
    self.link(FRIENDS, b, a)
  }

  fn link(&self, stream: &str, target: &dyn ActivityEntity, receiver: &dyn ActivityEntity) -> Result<(), DomainError> {
    {
      let entities = self.lock_map(&self.entities, "entities")?;
      for e in [target, receiver] {
        if !entities.contains_key(&key_of(e)) {
          return Err(DomainError::NotFound(format!("{} {}", e.kind(), e.id())));
        }
      }
    }
    let mut edges = self.lock_map(&self.edges, "edges")?;
    let list = edges.entry((stream.to_string(), key_of(target))).or_default();
    let receiver_key = key_of(receiver);
    if !list.contains(&receiver_key) {
      list.push(receiver_key);
    }
    Ok(())
  }

  /// Receptores de `entity` en `stream`. Las entidades eliminadas del grafo
  /// se omiten.
  pub fn members(&self, entity: &dyn ActivityEntity, stream: &str) -> Result<Vec<Arc<dyn ActivityEntity>>, DomainError> {
    let keys = {
      let edges = self.lock_map(&self.edges, "edges")?;
      edges.get(&(stream.to_string(), key_of(entity))).cloned().unwrap_or_default()
    };
    let entities = self.lock_map(&self.entities, "entities")?;
    Ok(keys.iter().filter_map(|k| entities.get(k).cloned()).collect())
  }
}

impl Default for SocialGraph {
  fn default() -> Self {
    Self::new()
  }
}

impl FollowerSource for SocialGraph {
  fn receivers_of(&self, actor: &dyn ActivityEntity, stream: &str) -> Result<Vec<Arc<dyn ActivityEntity>>, ActivityError> {
    Ok(self.members(actor, stream)?)
  }
}

impl EntityResolver for SocialGraph {
  fn resolve(&self, kind: &str, id: &str) -> Result<Option<Arc<dyn ActivityEntity>>, ActivityError> {
    Ok(self.get(kind, id)?)
  }
}
