// media.rs
use crate::DomainError;
use activity::ActivityEntity;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
  id: Uuid,
  file: String,
  comment: Option<String>,
}

impl Photo {
  pub fn new(file: &str) -> Result<Self, DomainError> {
    if file.trim().is_empty() {
      return Err(DomainError::ValidationError("file no puede estar vacío".to_string()));
    }
    Ok(Self { id: Uuid::new_v4(), file: file.to_string(), comment: None })
  }

  pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
    self.comment = Some(comment.into());
    self
  }

  pub fn file(&self) -> &str {
    &self.file
  }
}

impl ActivityEntity for Photo {
  fn kind(&self) -> &str {
    "Photo"
  }

  fn id(&self) -> String {
    self.id.to_string()
  }

  fn field(&self, name: &str) -> Option<JsonValue> {
    match name {
      "file" => Some(json!(self.file)),
      "comment" => Some(json!(self.comment)),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
  id: Uuid,
  title: String,
}

impl Album {
  pub fn new(title: &str) -> Result<Self, DomainError> {
    if title.trim().is_empty() {
      return Err(DomainError::ValidationError("title no puede estar vacío".to_string()));
    }
    Ok(Self { id: Uuid::new_v4(), title: title.to_string() })
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn retitle(&mut self, title: &str) {
    self.title = title.to_string();
  }
}

impl ActivityEntity for Album {
  fn kind(&self) -> &str {
    "Album"
  }

  fn id(&self) -> String {
    self.id.to_string()
  }

  fn field(&self, name: &str) -> Option<JsonValue> {
    match name {
      "title" => Some(json!(self.title)),
      _ => None,
    }
  }
}
