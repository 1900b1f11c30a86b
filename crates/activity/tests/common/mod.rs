// Entidades de prueba con campos mutables para los tests de integración.
#![allow(dead_code)]
use activity::ActivityEntity;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct TestEntity {
  kind: String,
  id: String,
  fields: Mutex<HashMap<String, JsonValue>>,
}

impl TestEntity {
  pub fn new(kind: &str, id: &str, fields: &[(&str, JsonValue)]) -> Arc<Self> {
    let map = fields.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    Arc::new(Self { kind: kind.to_string(), id: id.to_string(), fields: Mutex::new(map) })
  }

  pub fn set(&self, name: &str, value: JsonValue) {
    self.fields.lock().unwrap().insert(name.to_string(), value);
  }
}

impl ActivityEntity for TestEntity {
  fn kind(&self) -> &str {
    &self.kind
  }
  fn id(&self) -> String {
    self.id.clone()
  }
  fn field(&self, name: &str) -> Option<JsonValue> {
    self.fields.lock().unwrap().get(name).cloned()
  }
}

pub fn user(id: &str, full_name: &str) -> Arc<TestEntity> {
  TestEntity::new("User", id, &[("full_name", serde_json::json!(full_name))])
}

pub fn users(prefix: &str, n: usize) -> Vec<Arc<dyn ActivityEntity>> {
  (0..n).map(|i| user(&format!("{}{}", prefix, i), &format!("Receiver {}", i)) as Arc<dyn ActivityEntity>).collect()
}
