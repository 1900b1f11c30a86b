// Archivo: record.rs
// Propósito: tipos persistidos. `ActivityRecord` es la unidad desnormalizada
// que se guarda por receptor; `Fragment` es la instantánea de una entidad
// dentro del registro. El layout JSON es el formato de almacenamiento.
use crate::errors::{ActivityError, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Ranuras fijas a las que una actividad puede vincular entidades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Actor,
    Object,
    #[serde(alias = "target")]
    TargetObject,
    Receiver,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Actor, Role::Object, Role::TargetObject, Role::Receiver];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Actor => "actor",
            Role::Object => "object",
            Role::TargetObject => "target_object",
            Role::Receiver => "receiver",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "actor" => Ok(Role::Actor),
            "object" => Ok(Role::Object),
            "target_object" | "target" => Ok(Role::TargetObject),
            "receiver" => Ok(Role::Receiver),
            other => Err(ActivityError::Validation(format!("rol desconocido: {}", other))),
        }
    }
}

/// Instantánea `{type, id, campos cacheados...}` de una entidad.
///
/// Los valores cacheados son copias congeladas en el momento de publicar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(flatten)]
    pub cached: IndexMap<String, JsonValue>,
}

impl Fragment {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self { kind: kind.into(),
               id: id.into(),
               cached: IndexMap::new() }
    }

    /// Valor cacheado de un campo, si existe.
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.cached.get(field)
    }

    /// Indica si el fragmento referencia a la entidad `(kind, id)`.
    pub fn refers_to(&self, kind: &str, id: &str) -> bool {
        self.kind == kind && self.id == id
    }
}

/// Registro de actividad persistido (uno por receptor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub verb: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Fragment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Fragment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_object: Option<Fragment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Fragment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ActivityRecord {
    /// Crea un registro vacío para `verb` con el par de timestamps dado.
    pub fn new(verb: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self { id: Uuid::new_v4(),
               verb: verb.into(),
               actor: None,
               object: None,
               target_object: None,
               receiver: None,
               created_at: timestamp,
               updated_at: timestamp }
    }

    pub fn role(&self, role: Role) -> Option<&Fragment> {
        match role {
            Role::Actor => self.actor.as_ref(),
            Role::Object => self.object.as_ref(),
            Role::TargetObject => self.target_object.as_ref(),
            Role::Receiver => self.receiver.as_ref(),
        }
    }

    pub fn set_role(&mut self, role: Role, fragment: Option<Fragment>) {
        let slot = match role {
            Role::Actor => &mut self.actor,
            Role::Object => &mut self.object,
            Role::TargetObject => &mut self.target_object,
            Role::Receiver => &mut self.receiver,
        };
        *slot = fragment;
    }

    /// Roles poblados, en el orden canónico.
    pub fn populated_roles(&self) -> Vec<Role> {
        Role::ALL.iter().copied().filter(|r| self.role(*r).is_some()).collect()
    }

    /// `verb` y `actor` son obligatorios.
    pub fn validate(&self) -> Result<()> {
        if self.verb.trim().is_empty() {
            return Err(ActivityError::Validation("verb no puede estar vacío".into()));
        }
        if self.actor.is_none() {
            return Err(ActivityError::Validation(format!("actividad '{}' sin actor", self.verb)));
        }
        Ok(())
    }

    /// Documento JSON con el layout de almacenamiento.
    pub fn to_document(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_document(doc: JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(doc)?)
    }
}
