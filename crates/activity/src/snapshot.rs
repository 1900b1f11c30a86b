// Archivo: snapshot.rs
// Propósito: construir el fragmento desnormalizado `{type, id, cache...}`
// de una entidad según la definición y el rol que ocupa.
use crate::definition::Definition;
use crate::entity::ActivityEntity;
use crate::errors::{ActivityError, Result};
use crate::record::{Fragment, Role};

/// Renderiza `entity` para `role`.
///
/// La búsqueda es de dos niveles (rol -> tipo -> campos) porque un mismo rol
/// puede estar ocupado por tipos distintos con proyecciones distintas. Si el
/// tipo no está declarado para el rol el fragmento lleva sólo `type` e `id`.
/// Los valores se leen en este momento y se copian.
pub fn render(role: Role, definition: &Definition, entity: &dyn ActivityEntity) -> Result<Fragment> {
    let mut fragment = Fragment::new(entity.kind(), entity.id());
    for field in definition.cache_fields(role, entity.kind()) {
        let value = entity.field(field)
                          .ok_or_else(|| ActivityError::invalid_field(entity.kind(), field))?;
        fragment.cached.insert(field.clone(), value);
    }
    Ok(fragment)
}

/// Comprueba, sin copiar valores, que `entity` expone todos los campos que
/// la definición declara para su tipo en `role`.
pub fn verify(role: Role, definition: &Definition, entity: &dyn ActivityEntity) -> Result<()> {
    match definition.cache_fields(role, entity.kind())
                    .iter()
                    .find(|f| !entity.exposes(f))
    {
        Some(missing) => Err(ActivityError::invalid_field(entity.kind(), missing)),
        None => Ok(()),
    }
}
