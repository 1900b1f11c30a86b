// Diesel schema compartido por SQLite y Postgres.
// Tabla: activities. El documento completo va en `document`; las columnas
// `<rol>_id` / `<rol>_type` existen para filtrar e indexar.
diesel::table! {
    activities (id) {
        id -> Text,
        verb -> Text,
        actor_id -> Nullable<Text>,
        actor_type -> Nullable<Text>,
        object_id -> Nullable<Text>,
        object_type -> Nullable<Text>,
        target_object_id -> Nullable<Text>,
        target_object_type -> Nullable<Text>,
        receiver_id -> Nullable<Text>,
        receiver_type -> Nullable<Text>,
        created_at_ts -> BigInt,
        updated_at_ts -> BigInt,
        document -> Text,
    }
}
