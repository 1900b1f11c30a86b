// Archivo: definition.rs
// Propósito: esquema de un tipo de actividad. Para cada rol indica qué tipos
// de entidad se aceptan y qué campos de cada tipo se cachean.
use crate::entity::normalize_kind;
use crate::record::Role;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Configuración de un tipo de entidad dentro de un rol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSchema {
    /// Campos a cachear, en orden. Vacío = sólo `type` e `id`.
    #[serde(default)]
    pub cache: Vec<String>,
}

/// Tipo de entidad normalizado -> configuración. Un rol puede aceptar
/// varios tipos (por ejemplo `user` y `organization` como actor).
pub type RoleSchema = IndexMap<String, KindSchema>;

/// Definición registrada de un verbo. Inmutable una vez registrada.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    verb: String,
    roles: IndexMap<Role, RoleSchema>,
}

impl Definition {
    pub(crate) fn new(verb: String, roles: IndexMap<Role, RoleSchema>) -> Self {
        Self { verb, roles }
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// Esquema completo de un rol, si se declaró alguno.
    pub fn role(&self, role: Role) -> Option<&RoleSchema> {
        self.roles.get(&role)
    }

    pub fn roles(&self) -> impl Iterator<Item = (&Role, &RoleSchema)> {
        self.roles.iter()
    }

    /// Configuración de `kind` en `role`. Acepta el nombre crudo del tipo;
    /// se normaliza antes de buscar.
    pub fn kind_schema(&self, role: Role, kind: &str) -> Option<&KindSchema> {
        self.roles.get(&role).and_then(|r| r.get(&normalize_kind(kind)))
    }

    /// Campos cacheados para `kind` en `role` (vacío si no se declaró).
    pub fn cache_fields(&self, role: Role, kind: &str) -> &[String] {
        self.kind_schema(role, kind).map(|k| k.cache.as_slice()).unwrap_or(&[])
    }

    /// Indica si `kind` está declarado para `role`.
    pub fn accepts(&self, role: Role, kind: &str) -> bool {
        self.kind_schema(role, kind).is_some()
    }
}
