// errors.rs
use activity::ActivityError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DomainError {
  #[error("Error de validación: {0}")]
  ValidationError(String),
  #[error("Entidad no encontrada: {0}")]
  NotFound(String),
}

impl From<DomainError> for ActivityError {
  fn from(e: DomainError) -> Self {
    match e {
      DomainError::ValidationError(m) => ActivityError::Validation(m),
      DomainError::NotFound(m) => ActivityError::NotFound(m),
    }
  }
}
