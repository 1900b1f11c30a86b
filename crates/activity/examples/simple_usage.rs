use activity::errors::ActivityError;
use activity::{ActivityEntity, ActivityPublisher, DefinitionRegistry, InMemoryActivityStore, Payload, PublishOptions,
               StreamOptions, StreamQuery};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

// Entidad mínima para el ejemplo.
struct Named {
    kind: &'static str,
    id: String,
    name: String,
}

impl ActivityEntity for Named {
    fn kind(&self) -> &str {
        self.kind
    }
    fn id(&self) -> String {
        self.id.clone()
    }
    fn field(&self, name: &str) -> Option<JsonValue> {
        match name {
            "full_name" | "file" => Some(json!(self.name)),
            _ => None,
        }
    }
}

fn named(kind: &'static str, id: &str, name: &str) -> Arc<dyn ActivityEntity> {
    Arc::new(Named { kind, id: id.into(), name: name.into() })
}

fn main() -> Result<(), ActivityError> {
    // Registro y almacén
    let registry = Arc::new(DefinitionRegistry::new());
    registry.define("new_photo", |d| {
                d.actor("user", &["full_name"]).object("photo", &["file"]);
            });
    let store = Arc::new(InMemoryActivityStore::new());
    let publisher = ActivityPublisher::new(registry, store.clone());

    // 7 receptores en lotes de 3: se esperan 3 escrituras
    let receivers: Vec<Arc<dyn ActivityEntity>> = (0..7).map(|i| named("User", &format!("r{}", i), "Receiver")).collect();
    let payload = Payload::new().actor(named("User", "u1", "Christos"))
                                .object(named("Photo", "p1", "image.jpg"))
                                .receivers(receivers.clone());
    let summary = publisher.publish("new_photo", &payload, &PublishOptions::batched(3))?;
    println!("publicado: {:?}", summary);
    println!("tamaños de lote: {:?}\n", store.batch_sizes());

    // Stream del primer receptor
    let query = StreamQuery::stream_for(receivers[0].as_ref(), &StreamOptions::of_type("new_photo"));
    println!("consulta: {}", query.to_document());
    for record in query.fetch(store.as_ref())? {
        println!("{}", serde_json::to_string_pretty(&record.to_document()?)?);
    }
    Ok(())
}
