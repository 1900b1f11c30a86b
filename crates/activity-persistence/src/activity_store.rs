use crate::schema;
use crate::schema::activities::dsl;
use activity::{ActivityError, ActivityRecord, ActivityStore, Field, Role, StreamQuery};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::Error as DieselError;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::Arc;
use uuid::Uuid;
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");
#[cfg(feature = "pg")]
type DbConn = PgConnection;
#[cfg(not(feature = "pg"))]
type DbConn = SqliteConnection;
type DbPool = Pool<ConnectionManager<DbConn>>;
// SQLite limita las variables por sentencia; los lotes se parten en trozos
// dentro de la misma transacción.
const INSERT_CHUNK: usize = 64;
/// Almacén Diesel que implementa `ActivityStore`.
pub struct DieselActivityStore {
  pool: Arc<DbPool>,
}
impl DieselActivityStore {
  /// Crea el pool y aplica las migraciones embebidas.
  pub fn new(database_url: &str) -> Result<Self, ActivityError> {
    let manager = ConnectionManager::<DbConn>::new(database_url);
    let pool = Pool::builder().max_size(4)
                              .build(manager)
                              .map_err(|e| ActivityError::Storage(format!("pool: {}", e)))?;
    let store = DieselActivityStore { pool: Arc::new(pool) };
    let mut c = store.conn()?;
    #[cfg(not(feature = "pg"))]
    {
      let _ = diesel::sql_query("PRAGMA journal_mode = WAL;").execute(&mut c);
      let _ = diesel::sql_query("PRAGMA busy_timeout = 5000;").execute(&mut c);
    }
    c.run_pending_migrations(MIGRATIONS)
     .map_err(|e| ActivityError::Storage(format!("migraciones: {}", e)))?;
    Ok(store)
  }
  fn conn(&self) -> Result<PooledConnection<ConnectionManager<DbConn>>, ActivityError> {
    self.pool.get().map_err(|e: r2d2::Error| ActivityError::Storage(format!("pool: {}", e)))
  }
}
// Fila de la tabla `activities`. En `replace` un rol ausente limpia sus
// columnas.
#[derive(Debug, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = schema::activities, treat_none_as_null = true)]
struct ActivityRow {
  pub id: String,
  pub verb: String,
  pub actor_id: Option<String>,
  pub actor_type: Option<String>,
  pub object_id: Option<String>,
  pub object_type: Option<String>,
  pub target_object_id: Option<String>,
  pub target_object_type: Option<String>,
  pub receiver_id: Option<String>,
  pub receiver_type: Option<String>,
  pub created_at_ts: i64,
  pub updated_at_ts: i64,
  pub document: String,
}
impl ActivityRow {
  fn from_record(record: &ActivityRecord) -> Result<Self, ActivityError> {
    let id_of = |role: Role| record.role(role).map(|f| f.id.clone());
    let type_of = |role: Role| record.role(role).map(|f| f.kind.clone());
    Ok(ActivityRow { id: record.id.to_string(),
                     verb: record.verb.clone(),
                     actor_id: id_of(Role::Actor),
                     actor_type: type_of(Role::Actor),
                     object_id: id_of(Role::Object),
                     object_type: type_of(Role::Object),
                     target_object_id: id_of(Role::TargetObject),
                     target_object_type: type_of(Role::TargetObject),
                     receiver_id: id_of(Role::Receiver),
                     receiver_type: type_of(Role::Receiver),
                     created_at_ts: record.created_at.timestamp_micros(),
                     updated_at_ts: record.updated_at.timestamp_micros(),
                     document: serde_json::to_string(record)? })
  }
  fn into_record(self) -> Result<ActivityRecord, ActivityError> {
    Ok(serde_json::from_str(&self.document)?)
  }
}
fn map_db_err<T>(res: std::result::Result<T, DieselError>) -> Result<T, ActivityError> {
  res.map_err(|e| ActivityError::Storage(format!("db: {}", e)))
}
impl ActivityStore for DieselActivityStore {
  fn insert_one(&self, record: &ActivityRecord) -> Result<(), ActivityError> {
    record.validate()?;
    let row = ActivityRow::from_record(record)?;
    let mut conn = self.conn()?;
    map_db_err(diesel::insert_into(dsl::activities).values(&row).execute(&mut conn))?;
    Ok(())
  }
  fn insert_batch(&self, records: &[ActivityRecord]) -> Result<(), ActivityError> {
    let mut rows = Vec::with_capacity(records.len());
    for r in records {
      r.validate()?;
      rows.push(ActivityRow::from_record(r)?);
    }
    let mut conn = self.conn()?;
    // Todo el lote en una transacción: se aplica completo o nada.
    map_db_err(conn.transaction::<_, DieselError, _>(|c| {
                     for chunk in rows.chunks(INSERT_CHUNK) {
                       diesel::insert_into(dsl::activities).values(chunk).execute(c)?;
                     }
                     Ok(())
                   }))?;
    log::debug!("insertado lote de {} actividades", rows.len());
    Ok(())
  }
  fn find(&self, query: &StreamQuery) -> Result<Vec<ActivityRecord>, ActivityError> {
    let mut conn = self.conn()?;
    let mut q = dsl::activities.into_boxed();
    for c in query.criteria() {
      let v = c.value.clone();
      q = match c.field {
        Field::Verb => q.filter(dsl::verb.eq(v)),
        Field::RoleId(Role::Actor) => q.filter(dsl::actor_id.eq(v)),
        Field::RoleType(Role::Actor) => q.filter(dsl::actor_type.eq(v)),
        Field::RoleId(Role::Object) => q.filter(dsl::object_id.eq(v)),
        Field::RoleType(Role::Object) => q.filter(dsl::object_type.eq(v)),
        Field::RoleId(Role::TargetObject) => q.filter(dsl::target_object_id.eq(v)),
        Field::RoleType(Role::TargetObject) => q.filter(dsl::target_object_type.eq(v)),
        Field::RoleId(Role::Receiver) => q.filter(dsl::receiver_id.eq(v)),
        Field::RoleType(Role::Receiver) => q.filter(dsl::receiver_type.eq(v)),
      };
    }
    let rows = map_db_err(q.order(dsl::created_at_ts.desc()).load::<ActivityRow>(&mut conn))?;
    rows.into_iter().map(ActivityRow::into_record).collect()
  }
  fn get(&self, id: &Uuid) -> Result<Option<ActivityRecord>, ActivityError> {
    let mut conn = self.conn()?;
    let row = map_db_err(dsl::activities.filter(dsl::id.eq(id.to_string()))
                                        .first::<ActivityRow>(&mut conn)
                                        .optional())?;
    row.map(ActivityRow::into_record).transpose()
  }
  fn replace(&self, record: &ActivityRecord) -> Result<(), ActivityError> {
    let row = ActivityRow::from_record(record)?;
    let mut conn = self.conn()?;
    let updated = map_db_err(diesel::update(dsl::activities.filter(dsl::id.eq(&row.id))).set(&row)
                                                                                       .execute(&mut conn))?;
    if updated == 0 {
      return Err(ActivityError::NotFound(format!("actividad {}", record.id)));
    }
    Ok(())
  }
  fn count(&self) -> Result<usize, ActivityError> {
    let mut conn = self.conn()?;
    let n = map_db_err(dsl::activities.count().get_result::<i64>(&mut conn))?;
    Ok(n as usize)
  }
}
/// Crear el almacén desde las variables de entorno. Usa `ACTIVITY_DB_URL`
/// con `DATABASE_URL` como respaldo.
#[cfg(feature = "pg")]
pub fn new_from_env() -> Result<DieselActivityStore, ActivityError> {
  dotenvy::dotenv().ok();
  let url = std::env::var("ACTIVITY_DB_URL").or_else(|_| std::env::var("DATABASE_URL"))
                                            .map_err(|_| {
                                              ActivityError::Storage("ACTIVITY_DB_URL / DATABASE_URL not set".into())
                                            })?;
  let l = url.to_lowercase();
  if !(l.starts_with("postgres") || url.contains('@')) {
    return Err(ActivityError::Storage("ACTIVITY_DB_URL does not look like a Postgres URL".into()));
  }
  DieselActivityStore::new(&url)
}
/// Crear el almacén desde las variables de entorno (SQLite). Sin variables
/// se usa una base en memoria compartida.
#[cfg(not(feature = "pg"))]
pub fn new_from_env() -> Result<DieselActivityStore, ActivityError> {
  dotenvy::dotenv().ok();
  let url = std::env::var("ACTIVITY_DB_URL").or_else(|_| std::env::var("DATABASE_URL"))
                                            .unwrap_or_else(|_| "file:activitydb?mode=memory&cache=shared".into());
  let l = url.to_lowercase();
  if l.starts_with("postgres") {
    return Err(ActivityError::Storage("activity-persistence was compiled without 'pg' feature; enable it to use \
                                       Postgres"
                                                .into()));
  }
  DieselActivityStore::new(&url)
}
// Test helper: construye el almacén sobre un archivo SQLite explícito sin
// pasar por el entorno.
#[cfg(not(feature = "pg"))]
pub fn new_sqlite_for_test(database_url: &str) -> DieselActivityStore {
  match DieselActivityStore::new(database_url) {
    Ok(store) => store,
    Err(e) => panic!("no se pudo crear el almacén de pruebas: {}", e),
  }
}
