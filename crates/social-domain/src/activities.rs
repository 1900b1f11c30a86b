// activities.rs
use activity::DefinitionRegistry;

/// Registra los verbos de ejemplo de la aplicación.
///
/// - `new_photo`: usuario publica una foto en un álbum.
/// - `new_photo_without_cache`: igual, sin campos cacheados.
/// - `new_comment`: usuario comenta una foto.
/// - `enquiry`: usuario u organización consulta por un álbum.
pub fn register_sample_activities(registry: &DefinitionRegistry) {
  registry.define("new_photo", |d| {
            d.actor("user", &["full_name"]).object("photo", &["file"]).target_object("album", &["title"]);
          });
  registry.define("new_photo_without_cache", |d| {
            d.actor("user", &[]).object("photo", &[]).target_object("album", &[]);
          });
  registry.define("new_comment", |d| {
            d.actor("user", &["full_name"]).object("photo", &["comment"]);
          });
  registry.define("enquiry", |d| {
            d.actor("user", &["full_name"])
             .actor("organization", &["name", "logo"])
             .target("album", &["title"])
             .receiver("user", &["full_name"]);
          });
}
