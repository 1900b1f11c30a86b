// Archivo: dsl.rs
// Propósito: construcción declarativa de una `Definition`.
//
// Ejemplo:
// ```rust
// use activity::DefinitionDsl;
// let def = DefinitionDsl::define("photo_post", |d| {
//     d.actor("user", &["full_name"])
//      .object("photo", &["file"])
//      .target_object("album", &["title"]);
// });
// assert_eq!(def.verb(), "photo_post");
// ```
use crate::definition::{Definition, KindSchema, RoleSchema};
use crate::entity::normalize_kind;
use crate::record::Role;
use indexmap::IndexMap;

/// Constructor de definiciones. No registra nada: el registro es un paso
/// explícito posterior (`DefinitionRegistry::register`).
#[derive(Debug, Clone)]
pub struct DefinitionDsl {
    verb: String,
    roles: IndexMap<Role, RoleSchema>,
}

impl DefinitionDsl {
    pub fn new(verb: impl Into<String>) -> Self {
        Self { verb: verb.into(),
               roles: IndexMap::new() }
    }

    /// Forma de bloque: evalúa `block` sobre un constructor nuevo y devuelve
    /// la definición resultante.
    pub fn define<F>(verb: impl Into<String>, block: F) -> Definition
        where F: FnOnce(&mut DefinitionDsl)
    {
        let mut dsl = DefinitionDsl::new(verb);
        block(&mut dsl);
        dsl.finish()
    }

    /// Declara `kind` para `role` con su lista de cache. Declarar dos veces
    /// el mismo tipo en el mismo rol reemplaza la lista anterior.
    pub fn role(&mut self, role: Role, kind: &str, cache: &[&str]) -> &mut Self {
        let schema = KindSchema { cache: cache.iter().map(|f| f.to_string()).collect() };
        self.roles.entry(role).or_default().insert(normalize_kind(kind), schema);
        self
    }

    pub fn actor(&mut self, kind: &str, cache: &[&str]) -> &mut Self {
        self.role(Role::Actor, kind, cache)
    }

    pub fn object(&mut self, kind: &str, cache: &[&str]) -> &mut Self {
        self.role(Role::Object, kind, cache)
    }

    pub fn target_object(&mut self, kind: &str, cache: &[&str]) -> &mut Self {
        self.role(Role::TargetObject, kind, cache)
    }

    /// Alias de `target_object`.
    pub fn target(&mut self, kind: &str, cache: &[&str]) -> &mut Self {
        self.target_object(kind, cache)
    }

    pub fn receiver(&mut self, kind: &str, cache: &[&str]) -> &mut Self {
        self.role(Role::Receiver, kind, cache)
    }

    pub fn finish(self) -> Definition {
        Definition::new(self.verb, self.roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_multi_kind_roles() {
        let def = DefinitionDsl::define("enquiry", |d| {
            d.actor("user", &["full_name"])
             .actor("Organization", &["name", "logo"])
             .object("enquiry", &["subject"])
             .target("listing", &["title"]);
        });

        assert_eq!(def.verb(), "enquiry");
        let actors = def.role(Role::Actor).unwrap();
        assert_eq!(actors.len(), 2);
        let declared: Vec<Role> = def.roles().map(|(r, _)| *r).collect();
        assert_eq!(declared, vec![Role::Actor, Role::Object, Role::TargetObject]);
        assert_eq!(def.cache_fields(Role::Actor, "User"), ["full_name".to_string()]);
        assert_eq!(def.cache_fields(Role::Actor, "organization"), ["name".to_string(), "logo".to_string()]);
        assert_eq!(def.cache_fields(Role::TargetObject, "Listing"), ["title".to_string()]);
        assert!(def.role(Role::Receiver).is_none());
    }

    #[test]
    fn missing_cache_means_type_and_id_only() {
        let def = DefinitionDsl::define("new_photo_without_cache", |d| {
            d.actor("user", &[]).object("photo", &[]);
        });
        assert!(def.accepts(Role::Actor, "User"));
        assert!(def.cache_fields(Role::Actor, "User").is_empty());
        assert!(def.cache_fields(Role::Object, "Album").is_empty());
    }

    #[test]
    fn redeclaring_a_kind_replaces_its_cache() {
        let def = DefinitionDsl::define("v", |d| {
            d.actor("user", &["a"]).actor("user", &["b"]);
        });
        assert_eq!(def.cache_fields(Role::Actor, "user"), ["b".to_string()]);
    }
}
