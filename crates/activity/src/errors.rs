// Archivo: errors.rs
// Propósito: definir los errores del motor de actividades y el alias
// Result<T> usado por las APIs del crate.
use thiserror::Error;

/// Errores del motor de publicación y lectura de actividades.
///
/// - `UnknownDefinition`: el verbo no tiene una `Definition` registrada.
/// - `InvalidField`: la definición declara un campo de cache que la entidad
///   no expone.
/// - `Validation`: un registro (o una opción) no cumple las reglas mínimas.
/// - `Storage`: error propagado tal cual desde el almacenamiento.
/// - `NotFound`: entidad o registro inexistente.
/// - `Serialization`: error de serialización JSON.
#[derive(Error, Debug)]
pub enum ActivityError {
    /// No existe definición registrada para el verbo. Es un error de
    /// programación del llamador, nunca se reintenta.
    #[error("Definición desconocida: {0}")]
    UnknownDefinition(String),
    /// La definición y el contrato de la entidad divergen.
    #[error("Campo inválido '{field}' para el tipo '{kind}'")]
    InvalidField { kind: String, field: String },
    /// Falta el verbo o el rol `actor`, o una opción tiene un valor inválido.
    #[error("Error de validación: {0}")]
    Validation(String),
    /// Error del almacenamiento (BD, driver, pool...).
    #[error("Error de almacenamiento: {0}")]
    Storage(String),
    /// Registro o entidad no encontrada.
    #[error("No encontrado: {0}")]
    NotFound(String),
    #[error("Error de serialización: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ActivityError {
    pub fn invalid_field(kind: &str, field: &str) -> Self {
        Self::InvalidField { kind: kind.to_string(),
                             field: field.to_string() }
    }
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, ActivityError>;
