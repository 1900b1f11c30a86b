mod common;

use activity::{ActivityEntity, ActivityError, ActivityPublisher, ActivityStore, DefinitionRegistry, InMemoryActivityStore,
               Payload, PublishOptions, StaticFollowers};
use common::{user, users, TestEntity};
use serde_json::json;
use std::sync::Arc;

fn registry() -> Arc<DefinitionRegistry> {
  let registry = Arc::new(DefinitionRegistry::new());
  registry.define("photo_post", |d| {
            d.actor("user", &["full_name"]).object("photo", &["file"]).target_object("album", &["title"]);
          });
  registry.define("bare", |d| {
            d.actor("user", &[]).object("photo", &[]);
          });
  registry
}

fn photo_payload(actor: Arc<TestEntity>) -> Payload {
  Payload::new().actor(actor)
                .object(TestEntity::new("Photo", "p1", &[("file", json!("image.jpg"))]))
                .target_object(TestEntity::new("Album", "a1", &[("title", json!("A test album"))]))
}

#[test]
fn unknown_verb_creates_nothing() {
  let store = Arc::new(InMemoryActivityStore::new());
  let publisher = ActivityPublisher::new(registry(), store.clone());
  let payload = photo_payload(user("u1", "Christos")).receivers(users("r", 3));
  match publisher.publish("nope", &payload, &PublishOptions::default()) {
    Err(ActivityError::UnknownDefinition(v)) => assert_eq!(v, "nope"),
    other => panic!("expected UnknownDefinition, got {:?}", other),
  }
  assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn photo_post_scenario_with_two_receivers() {
  let store = Arc::new(InMemoryActivityStore::new());
  let publisher = ActivityPublisher::new(registry(), store.clone());
  let payload = photo_payload(user("u1", "Christos")).receivers(users("r", 2));

  let summary = publisher.publish("photo_post", &payload, &PublishOptions::default()).unwrap();
  assert_eq!(summary.records, 2);
  assert_eq!(summary.batches, 1);

  let records = store.all();
  assert_eq!(records.len(), 2);
  for r in &records {
    assert_eq!(r.verb, "photo_post");
    assert_eq!(r.actor.as_ref().unwrap().get("full_name"), Some(&json!("Christos")));
    assert_eq!(r.object.as_ref().unwrap().get("file"), Some(&json!("image.jpg")));
    assert_eq!(r.target_object.as_ref().unwrap().get("title"), Some(&json!("A test album")));
    assert_eq!(r.created_at, summary.created_at);
    assert_eq!(r.updated_at, summary.created_at);
  }
  let receivers: Vec<&str> = records.iter().map(|r| r.receiver.as_ref().unwrap().id.as_str()).collect();
  assert_eq!(receivers, vec!["r0", "r1"]);
  assert_ne!(records[0].id, records[1].id);
}

#[test]
fn batch_mode_issues_ceil_n_over_b_writes() {
  for (n, b, expected) in [(10usize, 3usize, vec![3, 3, 3, 1]), (6, 3, vec![3, 3]), (2, 500, vec![2]), (0, 4, vec![])] {
    let store = Arc::new(InMemoryActivityStore::new());
    let publisher = ActivityPublisher::new(registry(), store.clone());
    let payload = photo_payload(user("u1", "Christos")).receivers(users("r", n));

    let summary = publisher.publish("photo_post", &payload, &PublishOptions::batched(b)).unwrap();
    assert_eq!(store.batch_sizes(), expected, "n={} b={}", n, b);
    assert_eq!(summary.batches, expected.len());
    assert_eq!(summary.records, n);
    assert_eq!(store.single_inserts(), 0);
    assert!(store.all().iter().all(|r| r.created_at == summary.created_at));
  }
}

#[test]
fn one_by_one_mode_inserts_in_receiver_order() {
  let store = Arc::new(InMemoryActivityStore::new());
  let publisher = ActivityPublisher::new(registry(), store.clone());
  let payload = photo_payload(user("u1", "Christos")).receivers(users("r", 4));

  let summary = publisher.publish("photo_post", &payload, &PublishOptions::one_by_one()).unwrap();
  assert_eq!(summary.records, 4);
  assert_eq!(summary.batches, 0);
  assert_eq!(store.single_inserts(), 4);
  assert!(store.batch_sizes().is_empty());
  let ids: Vec<String> = store.all().iter().map(|r| r.receiver.as_ref().unwrap().id.clone()).collect();
  assert_eq!(ids, vec!["r0", "r1", "r2", "r3"]);
}

#[test]
fn receiver_selection_precedence() {
  let store = Arc::new(InMemoryActivityStore::new());
  let followers = Arc::new(StaticFollowers::new());
  let actor = user("u1", "Christos");
  followers.set(actor.as_ref(), "followers", users("f", 3));
  followers.set(actor.as_ref(), "friends", users("fr", 2));
  let publisher = ActivityPublisher::with_followers(registry(), store.clone(), followers);
  let opts = PublishOptions::default();

  let single = photo_payload(actor.clone()).receiver(user("solo", "Solo")).receivers(users("r", 5));
  assert_eq!(publisher.publish("photo_post", &single, &opts).unwrap().records, 1);

  let explicit = photo_payload(actor.clone()).receivers(users("r", 5));
  assert_eq!(publisher.publish("photo_post", &explicit, &opts).unwrap().records, 5);

  let default_followers = photo_payload(actor.clone());
  assert_eq!(publisher.publish("photo_post", &default_followers, &opts).unwrap().records, 3);

  let friends = photo_payload(actor.clone()).stream("friends");
  assert_eq!(publisher.publish("photo_post", &friends, &opts).unwrap().records, 2);

  assert_eq!(store.count().unwrap(), 11);
}

#[test]
fn kind_without_cache_renders_type_and_id_only() {
  let store = Arc::new(InMemoryActivityStore::new());
  let publisher = ActivityPublisher::new(registry(), store.clone());
  let payload = photo_payload(user("u1", "Christos")).receivers(users("r", 1));
  publisher.publish("bare", &payload, &PublishOptions::default()).unwrap();

  let doc = store.all()[0].to_document().unwrap();
  assert_eq!(doc["actor"], json!({"type": "User", "id": "u1"}));
  assert_eq!(doc["object"], json!({"type": "Photo", "id": "p1"}));
  // target_object no está declarado en `bare`: se guarda igualmente sin cache
  assert_eq!(doc["target_object"], json!({"type": "Album", "id": "a1"}));
}

#[test]
fn invalid_field_aborts_before_any_write() {
  let store = Arc::new(InMemoryActivityStore::new());
  let publisher = ActivityPublisher::new(registry(), store.clone());
  let nameless = TestEntity::new("User", "u1", &[]);
  let payload = photo_payload(nameless).receivers(users("r", 7));

  match publisher.publish("photo_post", &payload, &PublishOptions::batched(2)) {
    Err(ActivityError::InvalidField { kind, field }) => {
      assert_eq!(kind, "User");
      assert_eq!(field, "full_name");
    }
    other => panic!("expected InvalidField, got {:?}", other),
  }
  assert_eq!(store.count().unwrap(), 0);
  assert!(store.batch_sizes().is_empty());
}

fn greeting_registry() -> Arc<DefinitionRegistry> {
  let registry = registry();
  registry.define("greeting", |d| {
            d.actor("user", &[]).receiver("user", &["full_name"]);
          });
  registry
}

// r0, r1, r2, broken, s0, s1: `broken` no expone `full_name`.
fn receivers_with_broken() -> Vec<Arc<dyn ActivityEntity>> {
  let mut receivers = users("r", 3);
  receivers.push(TestEntity::new("User", "broken", &[]));
  receivers.extend(users("s", 2));
  receivers
}

#[test]
fn receiver_invalid_field_in_batch_mode_persists_nothing() {
  let store = Arc::new(InMemoryActivityStore::new());
  let publisher = ActivityPublisher::new(greeting_registry(), store.clone());
  let payload = Payload::new().actor(user("u1", "Christos")).receivers(receivers_with_broken());

  match publisher.publish("greeting", &payload, &PublishOptions::batched(2)) {
    Err(ActivityError::InvalidField { kind, field }) => {
      assert_eq!(kind, "User");
      assert_eq!(field, "full_name");
    }
    other => panic!("expected InvalidField, got {:?}", other),
  }
  assert_eq!(store.count().unwrap(), 0);
  assert!(store.batch_sizes().is_empty());
}

#[test]
fn receiver_invalid_field_one_by_one_keeps_earlier_records() {
  let store = Arc::new(InMemoryActivityStore::new());
  let publisher = ActivityPublisher::new(greeting_registry(), store.clone());
  let payload = Payload::new().actor(user("u1", "Christos")).receivers(receivers_with_broken());

  let err = publisher.publish("greeting", &payload, &PublishOptions::one_by_one()).unwrap_err();
  assert!(matches!(err, ActivityError::InvalidField { .. }));
  assert_eq!(store.count().unwrap(), 3);
  assert_eq!(store.single_inserts(), 3);
  let ids: Vec<String> = store.all().iter().map(|r| r.receiver.as_ref().unwrap().id.clone()).collect();
  assert_eq!(ids, vec!["r0", "r1", "r2"]);
}

#[test]
fn single_insert_storage_failure_keeps_written_records() {
  let store = Arc::new(InMemoryActivityStore::new());
  store.fail_after_inserts(2);
  let publisher = ActivityPublisher::new(registry(), store.clone());
  let payload = photo_payload(user("u1", "Christos")).receivers(users("r", 5));

  let err = publisher.publish("photo_post", &payload, &PublishOptions::one_by_one()).unwrap_err();
  assert!(matches!(err, ActivityError::Storage(_)));
  assert_eq!(store.count().unwrap(), 2);
  assert_eq!(store.single_inserts(), 2);
  assert!(store.batch_sizes().is_empty());
}

#[test]
fn storage_failure_propagates_without_rollback() {
  let store = Arc::new(InMemoryActivityStore::new());
  store.fail_after_batches(1);
  let publisher = ActivityPublisher::new(registry(), store.clone());
  let payload = photo_payload(user("u1", "Christos")).receivers(users("r", 5));

  let err = publisher.publish("photo_post", &payload, &PublishOptions::batched(2)).unwrap_err();
  assert!(matches!(err, ActivityError::Storage(_)));
  assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn missing_actor_fails_batch_and_is_rejected_one_by_one() {
  let store = Arc::new(InMemoryActivityStore::new());
  let publisher = ActivityPublisher::new(registry(), store.clone());
  let payload = Payload::new().object(TestEntity::new("Photo", "p1", &[("file", json!("x.jpg"))]))
                              .receivers(users("r", 3));

  let err = publisher.publish("photo_post", &payload, &PublishOptions::default()).unwrap_err();
  assert!(matches!(err, ActivityError::Validation(_)));
  assert_eq!(store.count().unwrap(), 0);

  let summary = publisher.publish("photo_post", &payload, &PublishOptions::one_by_one()).unwrap();
  assert_eq!(summary.records, 0);
  assert_eq!(summary.rejected, 3);
  assert_eq!(store.count().unwrap(), 0);

  // sin actor tampoco se pueden resolver seguidores
  let no_receivers = Payload::new().object(TestEntity::new("Photo", "p1", &[("file", json!("x.jpg"))]));
  assert!(matches!(publisher.publish("photo_post", &no_receivers, &PublishOptions::default()),
                   Err(ActivityError::Validation(_))));
}

#[test]
fn zero_batch_size_is_rejected() {
  let store = Arc::new(InMemoryActivityStore::new());
  let publisher = ActivityPublisher::new(registry(), store.clone());
  let payload = photo_payload(user("u1", "Christos")).receivers(users("r", 3));
  assert!(matches!(publisher.publish("photo_post", &payload, &PublishOptions::batched(0)),
                   Err(ActivityError::Validation(_))));
  assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn cached_values_are_frozen_at_publish_time() {
  let store = Arc::new(InMemoryActivityStore::new());
  let publisher = ActivityPublisher::new(registry(), store.clone());
  let actor = user("u1", "Christos");
  let payload = photo_payload(actor.clone()).receivers(users("r", 1));
  publisher.publish("photo_post", &payload, &PublishOptions::default()).unwrap();

  actor.set("full_name", json!("Testing"));
  assert_eq!(actor.field("full_name"), Some(json!("Testing")));
  let stored = &store.all()[0];
  assert_eq!(stored.actor.as_ref().unwrap().get("full_name"), Some(&json!("Christos")));
}
