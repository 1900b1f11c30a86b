use activity::{ActivityEntity, ActivityService, DefinitionRegistry, Payload, PublishOptions, StreamOptions};
use activity_persistence::DieselActivityStore;
use social_domain::{register_sample_activities, Album, Photo, SocialGraph, User, FRIENDS};
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;
use uuid::Uuid;

/// Pequeño menú interactivo para publicar y leer actividades usando el
/// almacén de `activity-persistence` y un grafo social de ejemplo.
///
/// Opciones soportadas:
/// 1) Ver usuarios
/// 2) Publicar foto (a seguidores o amigos)
/// 3) Ver stream de un usuario
/// 4) Ver actividades propias de un usuario
/// 5) Refrescar una actividad
/// 6) Salir
fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let store = Arc::new(activity_persistence::new_from_env().map_err(|e| Box::new(e) as Box<dyn Error>)?);
    let options = PublishOptions::from_env()?;
    let registry = Arc::new(DefinitionRegistry::new());
    register_sample_activities(&registry);
    let graph = Arc::new(SocialGraph::new());
    let users = seed_graph(&graph)?;

    let service: ActivityService<DieselActivityStore> =
        ActivityService::new(registry, store, graph.clone()).with_resolver(graph.clone())
                                                            .with_options(options);
    log::info!("verbos registrados: {:?}", service.registry().verbs());

    loop {
        println!("\n== Activity stream menu ==");
        println!("1) Ver usuarios");
        println!("2) Publicar foto");
        println!("3) Ver stream de un usuario");
        println!("4) Ver actividades propias de un usuario");
        println!("5) Refrescar actividad");
        println!("6) Salir");
        print!("Elige una opción: ");
        io::stdout().flush().ok();

        let mut choice = String::new();
        io::stdin().read_line(&mut choice)?;
        match choice.trim() {
            "1" => {
                println!("\n#  | ID                                   | NOMBRE");
                println!("------------------------------------------------------------");
                for (i, u) in users.iter().enumerate() {
                    println!("{:<2} | {} | {}", i, u.id(), u.full_name());
                }
            }
            "2" => {
                let Some(author) = pick_user(&users)? else { continue };
                let file = prompt("Archivo de la foto: ")?;
                let photo = match Photo::new(file.trim()) {
                    Ok(p) => Arc::new(p),
                    Err(e) => { eprintln!("Foto inválida: {}", e); continue; }
                };
                let album = match Album::new("Demo") {
                    Ok(a) => Arc::new(a),
                    Err(e) => { eprintln!("Álbum inválido: {}", e); continue; }
                };
                let to_friends = prompt("¿Enviar a amigos en vez de seguidores? (y/N): ")?;
                let mut payload = Payload::new().actor(author.clone()).object(photo).target_object(album);
                if to_friends.trim().eq_ignore_ascii_case("y") {
                    payload = payload.stream(FRIENDS);
                }
                match service.publish("new_photo", &payload) {
                    Ok(summary) => println!("Publicado: {} registros en {} lotes", summary.records, summary.batches),
                    Err(e) => eprintln!("Error publicando: {}", e),
                }
            }
            "3" | "4" => {
                let own = choice.trim() == "4";
                let Some(user) = pick_user(&users)? else { continue };
                let verb = prompt("Filtrar por verbo (enter para todos): ")?;
                let opts = if verb.trim().is_empty() { StreamOptions::default() } else { StreamOptions::of_type(verb.trim()) };
                let res = if own {
                    service.actor_stream_for(user.as_ref(), &opts)
                } else {
                    service.stream_for(user.as_ref(), &opts)
                };
                match res {
                    Ok(records) => {
                        println!("{} actividades", records.len());
                        for r in records {
                            let actor = r.actor.as_ref().and_then(|a| a.get("full_name")).cloned().unwrap_or_default();
                            println!("{} | {} | {} | actor: {}", r.id, r.created_at, r.verb, actor);
                        }
                    }
                    Err(e) => eprintln!("Error leyendo stream: {}", e),
                }
            }
            "5" => {
                let id_s = prompt("Id de la actividad (UUID): ")?;
                let id = match Uuid::parse_str(id_s.trim()) {
                    Ok(u) => u,
                    Err(_) => { eprintln!("UUID inválido"); continue; }
                };
                match service.refresh(&id).and_then(|r| r.to_document()) {
                    Ok(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
                    Err(e) => eprintln!("Error refrescando actividad: {}", e),
                }
            }
            "6" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

// Tres usuarios: ana sigue a bruno, bruno y carla son amigos.
fn seed_graph(graph: &SocialGraph) -> Result<Vec<Arc<User>>, Box<dyn Error>> {
    let users: Vec<Arc<User>> = ["Ana", "Bruno", "Carla"].iter()
                                                         .map(|n| User::new(n).map(Arc::new))
                                                         .collect::<Result<_, _>>()?;
    for u in &users {
        graph.upsert(u.clone())?;
    }
    graph.follow(users[0].as_ref(), users[1].as_ref())?;
    graph.befriend(users[1].as_ref(), users[2].as_ref())?;
    Ok(users)
}

fn pick_user(users: &[Arc<User>]) -> io::Result<Option<Arc<User>>> {
    let s = prompt("Número de usuario: ")?;
    match s.trim().parse::<usize>().ok().and_then(|i| users.get(i)) {
        Some(u) => Ok(Some(u.clone())),
        None => {
            eprintln!("Usuario inválido");
            Ok(None)
        }
    }
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}
