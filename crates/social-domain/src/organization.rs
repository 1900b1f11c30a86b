// organization.rs
use crate::DomainError;
use activity::ActivityEntity;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

/// Organización: puede ocupar el rol de actor con una proyección distinta a
/// la de `User`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
  id: Uuid,
  name: String,
  logo: Option<String>,
}

impl Organization {
  pub fn new(name: &str, logo: Option<&str>) -> Result<Self, DomainError> {
    if name.trim().is_empty() {
      return Err(DomainError::ValidationError("el nombre de la organización no puede estar vacío".to_string()));
    }
    Ok(Self { id: Uuid::new_v4(), name: name.trim().to_string(), logo: logo.map(|l| l.to_string()) })
  }

  pub fn name(&self) -> &str {
    &self.name
  }
}

impl ActivityEntity for Organization {
  fn kind(&self) -> &str {
    "Organization"
  }

  fn id(&self) -> String {
    self.id.to_string()
  }

  fn field(&self, name: &str) -> Option<JsonValue> {
    match name {
      "name" => Some(json!(self.name)),
      "logo" => Some(json!(self.logo)),
      _ => None,
    }
  }
}
