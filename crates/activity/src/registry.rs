// Archivo: registry.rs
// Propósito: registro explícito verbo -> `Definition`. Se construye y se
// inyecta en el publicador y en el servicio; no hay estado global.
use crate::definition::Definition;
use crate::dsl::DefinitionDsl;
use crate::errors::{ActivityError, Result};
use dashmap::DashMap;
use std::sync::Arc;

/// Registro de definiciones indexado por verbo.
///
/// Las definiciones se registran durante el arranque. El mapa admite
/// escrituras concurrentes, pero la disciplina esperada es registrar todo
/// antes de aceptar publicaciones; a partir de ahí sólo se consulta.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    definitions: DashMap<String, Arc<Definition>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self { definitions: DashMap::new() }
    }

    /// Inserta o reemplaza la definición bajo su verbo. Reemplazar es
    /// silencioso para el llamador (sólo queda un aviso en el log).
    pub fn register(&self, definition: Definition) -> Arc<Definition> {
        let verb = definition.verb().to_string();
        let stored = Arc::new(definition);
        if self.definitions.insert(verb.clone(), stored.clone()).is_some() {
            log::warn!("definición '{}' reemplazada", verb);
        }
        stored
    }

    /// Construye con el DSL y registra en un solo paso.
    pub fn define<F>(&self, verb: impl Into<String>, block: F) -> Arc<Definition>
        where F: FnOnce(&mut DefinitionDsl)
    {
        self.register(DefinitionDsl::define(verb, block))
    }

    /// Devuelve la definición de `verb` o `UnknownDefinition`.
    pub fn find(&self, verb: &str) -> Result<Arc<Definition>> {
        self.definitions
            .get(verb)
            .map(|d| d.value().clone())
            .ok_or_else(|| ActivityError::UnknownDefinition(verb.to_string()))
    }

    pub fn contains(&self, verb: &str) -> bool {
        self.definitions.contains_key(verb)
    }

    /// Verbos registrados, ordenados alfabéticamente.
    pub fn verbs(&self) -> Vec<String> {
        let mut verbs: Vec<String> = self.definitions.iter().map(|e| e.key().clone()).collect();
        verbs.sort();
        verbs
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Role;

    #[test]
    fn find_unknown_verb_fails() {
        let registry = DefinitionRegistry::new();
        match registry.find("nope") {
            Err(ActivityError::UnknownDefinition(v)) => assert_eq!(v, "nope"),
            other => panic!("expected UnknownDefinition, got {:?}", other),
        }
    }

    #[test]
    fn reregistering_replaces_without_merge() {
        let registry = DefinitionRegistry::new();
        registry.define("new_photo", |d| {
                    d.actor("user", &["full_name"]).object("photo", &["file"]);
                });
        registry.define("new_photo", |d| {
                    d.actor("user", &["nickname"]);
                });

        let def = registry.find("new_photo").unwrap();
        assert_eq!(def.cache_fields(Role::Actor, "user"), ["nickname".to_string()]);
        assert!(def.role(Role::Object).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn independent_registries_do_not_share_state() {
        let a = DefinitionRegistry::new();
        let b = DefinitionRegistry::new();
        a.define("only_in_a", |d| {
             d.actor("user", &[]);
         });
        assert!(a.contains("only_in_a"));
        assert!(!b.contains("only_in_a"));
        assert_eq!(a.verbs(), vec!["only_in_a".to_string()]);
    }
}
