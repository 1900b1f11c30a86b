// Archivo: entity.rs
// Propósito: contrato que deben implementar las entidades de la aplicación
// anfitriona para poder ocupar un rol dentro de una actividad.
use serde_json::Value as JsonValue;

/// Entidad capaz de participar en actividades (actor, objeto, destino o
/// receptor).
///
/// La aplicación implementa este trait por cada tipo de entidad en lugar de
/// recibir campos inyectados. `field` es el accesor polimórfico: devuelve
/// `None` cuando la entidad no expone el campo pedido.
pub trait ActivityEntity: Send + Sync {
    /// Nombre del tipo tal como se guarda en el campo `type` del registro
    /// (por ejemplo `User` o `PhotoAlbum`).
    fn kind(&self) -> &str;

    /// Identificador estable de la entidad.
    fn id(&self) -> String;

    /// Lee el valor actual de un campo. `None` si el campo no existe.
    fn field(&self, name: &str) -> Option<JsonValue>;

    /// Indica si la entidad expone el campo, sin exigir leer su valor.
    fn exposes(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

impl std::fmt::Debug for dyn ActivityEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.kind(), self.id())
    }
}

/// Normaliza un nombre de tipo a la clave usada en los esquemas:
/// `User` -> `user`, `PhotoAlbum` -> `photo_album`, `Mars::User` ->
/// `mars/user`. Es idempotente sobre claves ya normalizadas.
pub fn normalize_kind(kind: &str) -> String {
    let path = kind.trim().replace("::", "/");
    let chars: Vec<char> = path.chars().collect();
    let mut out = String::with_capacity(path.len() + 4);
    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = if i > 0 { Some(chars[i - 1]) } else { None };
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.map(|n| n.is_lowercase()).unwrap_or(false),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if *c == '-' || *c == ' ' {
            out.push('_');
        } else {
            out.push(*c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::normalize_kind;

    #[test]
    fn normalizes_camel_case_and_namespaces() {
        assert_eq!(normalize_kind("User"), "user");
        assert_eq!(normalize_kind("PhotoAlbum"), "photo_album");
        assert_eq!(normalize_kind("Mars::User"), "mars/user");
        assert_eq!(normalize_kind("HTTPRequest"), "http_request");
    }

    #[test]
    fn normalized_keys_are_stable() {
        for k in ["user", "photo_album", "mars/user"] {
            assert_eq!(normalize_kind(k), k);
        }
    }
}
