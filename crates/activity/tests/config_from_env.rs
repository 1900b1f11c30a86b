use activity::{ActivityError, PublishOptions, DEFAULT_BATCH_SIZE};

// Un único test: las variables de entorno son globales al proceso.
#[test]
fn publish_options_from_env() {
  std::env::remove_var("ACTIVITY_BATCH_INSERT");
  std::env::remove_var("ACTIVITY_BATCH_SIZE");
  let defaults = PublishOptions::from_env().expect("defaults");
  assert!(defaults.use_batch_insert);
  assert_eq!(defaults.batch_size, DEFAULT_BATCH_SIZE);

  std::env::set_var("ACTIVITY_BATCH_INSERT", "false");
  std::env::set_var("ACTIVITY_BATCH_SIZE", "25");
  let opts = PublishOptions::from_env().expect("from env");
  assert_eq!(opts, PublishOptions { use_batch_insert: false, batch_size: 25 });

  std::env::set_var("ACTIVITY_BATCH_SIZE", "0");
  assert!(matches!(PublishOptions::from_env(), Err(ActivityError::Validation(_))));

  std::env::set_var("ACTIVITY_BATCH_SIZE", "many");
  assert!(matches!(PublishOptions::from_env(), Err(ActivityError::Validation(_))));

  std::env::set_var("ACTIVITY_BATCH_SIZE", "10");
  std::env::set_var("ACTIVITY_BATCH_INSERT", "maybe");
  assert!(matches!(PublishOptions::from_env(), Err(ActivityError::Validation(_))));

  std::env::remove_var("ACTIVITY_BATCH_INSERT");
  std::env::remove_var("ACTIVITY_BATCH_SIZE");

  let parsed: PublishOptions = serde_json::from_str(r#"{"batch_size": 7}"#).unwrap();
  assert_eq!(parsed, PublishOptions::batched(7));
}
