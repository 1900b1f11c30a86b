// Archivo: query.rs
// Propósito: construir las consultas de lectura del stream de un receptor.
// Una `StreamQuery` es una descripción (criterios + orden); la ejecuta el
// almacenamiento, puede reutilizarse y no materializa nada por sí misma.
use crate::entity::ActivityEntity;
use crate::errors::Result;
use crate::record::{ActivityRecord, Role};
use crate::repository::ActivityStore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Opciones de lectura. `type` filtra por verbo exacto.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamOptions {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,
}

impl StreamOptions {
    pub fn of_type(verb: impl Into<String>) -> Self {
        Self { verb: Some(verb.into()) }
    }
}

/// Campo sobre el que filtra un criterio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Verb,
    RoleId(Role),
    RoleType(Role),
}

impl Field {
    /// Ruta con notación de punto, como en el documento almacenado.
    pub fn path(&self) -> String {
        match self {
            Field::Verb => "verb".to_string(),
            Field::RoleId(role) => format!("{}.id", role),
            Field::RoleType(role) => format!("{}.type", role),
        }
    }

    fn read<'a>(&self, record: &'a ActivityRecord) -> Option<&'a str> {
        match self {
            Field::Verb => Some(record.verb.as_str()),
            Field::RoleId(role) => record.role(*role).map(|f| f.id.as_str()),
            Field::RoleType(role) => record.role(*role).map(|f| f.kind.as_str()),
        }
    }
}

/// Criterio de igualdad exacta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub field: Field,
    pub value: String,
}

/// Orden de los resultados. Los streams siempre van por `created_at`
/// descendente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    CreatedAtDesc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamQuery {
    criteria: Vec<Criterion>,
    sort: SortOrder,
}

impl StreamQuery {
    /// Actividades cuyo receptor es `actor`, opcionalmente de un verbo.
    pub fn stream_for(actor: &dyn ActivityEntity, options: &StreamOptions) -> Self {
        let mut query = Self { criteria: Vec::new(),
                               sort: SortOrder::CreatedAtDesc };
        query.push(Field::RoleId(Role::Receiver), actor.id());
        query.push(Field::RoleType(Role::Receiver), actor.kind().to_string());
        if let Some(verb) = &options.verb {
            query.push(Field::Verb, verb.clone());
        }
        query
    }

    /// Como `stream_for`, restringido a las actividades que `actor` originó.
    pub fn actor_stream_for(actor: &dyn ActivityEntity, options: &StreamOptions) -> Self {
        let mut query = Self::stream_for(actor, options);
        query.push(Field::RoleId(Role::Actor), actor.id());
        query.push(Field::RoleType(Role::Actor), actor.kind().to_string());
        query
    }

    fn push(&mut self, field: Field, value: String) {
        self.criteria.push(Criterion { field, value });
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Verbo filtrado, si la consulta lo restringe.
    pub fn verb(&self) -> Option<&str> {
        self.criteria
            .iter()
            .find(|c| c.field == Field::Verb)
            .map(|c| c.value.as_str())
    }

    /// Evalúa los criterios sobre un registro ya cargado.
    pub fn matches(&self, record: &ActivityRecord) -> bool {
        self.criteria
            .iter()
            .all(|c| c.field.read(record) == Some(c.value.as_str()))
    }

    /// Documento de filtro con rutas de punto (`{"receiver.id": ..}`), útil
    /// para almacenes documentales.
    pub fn to_document(&self) -> JsonValue {
        let mut filter = Map::new();
        for c in &self.criteria {
            filter.insert(c.field.path(), JsonValue::String(c.value.clone()));
        }
        let mut doc = Map::new();
        doc.insert("filter".into(), JsonValue::Object(filter));
        doc.insert("sort".into(), serde_json::json!({"created_at": -1}));
        JsonValue::Object(doc)
    }

    /// Ejecuta la consulta contra `store`.
    pub fn fetch<S>(&self, store: &S) -> Result<Vec<ActivityRecord>>
        where S: ActivityStore + ?Sized
    {
        store.find(self)
    }
}
