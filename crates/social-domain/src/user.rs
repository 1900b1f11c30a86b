// user.rs
use crate::DomainError;
use activity::ActivityEntity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  id: Uuid,
  full_name: String,
  nickname: Option<String>,
  created_at: DateTime<Utc>,
}

impl User {
  pub fn new(full_name: &str) -> Result<Self, DomainError> {
    Self::with_id(Uuid::new_v4(), full_name)
  }

  pub fn with_id(id: Uuid, full_name: &str) -> Result<Self, DomainError> {
    if full_name.trim().is_empty() {
      return Err(DomainError::ValidationError("full_name no puede estar vacío".to_string()));
    }
    Ok(Self { id, full_name: full_name.trim().to_string(), nickname: None, created_at: Utc::now() })
  }

  pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
    self.nickname = Some(nickname.into());
    self
  }

  /// Cambia el nombre. Los registros ya publicados conservan el anterior.
  pub fn rename(&mut self, full_name: &str) -> Result<(), DomainError> {
    if full_name.trim().is_empty() {
      return Err(DomainError::ValidationError("full_name no puede estar vacío".to_string()));
    }
    self.full_name = full_name.trim().to_string();
    Ok(())
  }

  pub fn uuid(&self) -> Uuid {
    self.id
  }

  pub fn full_name(&self) -> &str {
    &self.full_name
  }

  pub fn nickname(&self) -> Option<&str> {
    self.nickname.as_deref()
  }
}

impl ActivityEntity for User {
  fn kind(&self) -> &str {
    "User"
  }

  fn id(&self) -> String {
    self.id.to_string()
  }

  /// `nickname` existe aunque esté vacío: se cachea como `null`.
  fn field(&self, name: &str) -> Option<JsonValue> {
    match name {
      "full_name" => Some(json!(self.full_name)),
      "nickname" => Some(json!(self.nickname)),
      "created_at" => Some(json!(self.created_at.to_rfc3339())),
      _ => None,
    }
  }
}

impl fmt::Display for User {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "User({}, {})", self.full_name, self.id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exposes_declared_fields_only() {
    let u = User::new("Christos").unwrap();
    assert_eq!(u.field("full_name"), Some(json!("Christos")));
    assert_eq!(u.field("nickname"), Some(JsonValue::Null));
    assert!(u.exposes("nickname"));
    assert!(!u.exposes("email"));
    assert_eq!(u.kind(), "User");
    assert_eq!(u.id(), u.uuid().to_string());
  }

  #[test]
  fn nickname_is_cached_when_present() {
    let u = User::new("Christos").unwrap().with_nickname("chris");
    assert_eq!(u.nickname(), Some("chris"));
    assert_eq!(u.field("nickname"), Some(json!("chris")));
  }

  #[test]
  fn rejects_blank_names() {
    assert!(matches!(User::new("  "), Err(DomainError::ValidationError(_))));
    let mut u = User::new("Ana").unwrap();
    assert!(u.rename("").is_err());
    u.rename("Ana María").unwrap();
    assert_eq!(u.full_name(), "Ana María");
  }
}
