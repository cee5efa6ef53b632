//! Macro-generated test suite for `KeyValueStore` contract validation.
//!
//! # Generated Tests
//!
//! ## Lifecycle
//! - `test_lifecycle`: list, add, get, set, update, delete, in order
//! - `test_get_missing`: lookup error naming the type and id
//! - `test_update_missing`: update of an unknown id fails
//! - `test_delete_missing`: delete of an unknown id succeeds
//!
//! ## Find
//! - `test_find_nothing`: no match is `None`
//! - `test_find_first`: each property resolves to the record holding it
//! - `test_find_non_string`: numbers and booleans compare by value
//!
//! ## Shape
//! - `test_nested_rejected`: arrays and objects are malformed data
//! - `test_kinds_are_isolated`: the same id under two types
//! - `test_concurrent_adds`: parallel adds from spawned tasks

/// Generate a full `KeyValueStore` conformance test suite.
///
/// `$factory` is re-evaluated for each test. It may contain `.await`. For
/// the concurrent test the store must also be `Clone + 'static`.
#[macro_export]
macro_rules! store_tests {
    ($factory:expr) => {
        mod store_contract_tests {
            use super::*;
            use almanac::storage::{KeyValueStore, StoreError};
            use serde_json::json;

            #[tokio::test]
            async fn test_lifecycle() {
                let store = $factory;
                let kind = unique_kind();

                assert!(store.list(&kind).await.unwrap().is_empty());

                let id = store.add(&kind, original()).await.unwrap();
                assert!(!id.is_empty());
                assert_eq!(store.list(&kind).await.unwrap(), vec![id.clone()]);
                assert!(store.exists(&kind, &id).await.unwrap());
                assert_eq!(store.get(&kind, &id).await.unwrap(), original());

                store.set(&kind, &id, overwritten()).await.unwrap();
                assert_eq!(store.get(&kind, &id).await.unwrap(), overwritten());

                store
                    .update(&kind, &id, record(json!({"added": "newValue"})))
                    .await
                    .unwrap();
                assert_eq!(store.get(&kind, &id).await.unwrap(), overwritten_and_updated());

                store.delete(&kind, &id).await.unwrap();
                assert!(!store.exists(&kind, &id).await.unwrap());
                assert!(store.list(&kind).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_get_missing() {
                let store = $factory;
                let kind = unique_kind();

                let err = store.get(&kind, "uu-ii-dd").await.unwrap_err();
                assert!(matches!(err, StoreError::Lookup { .. }));
                assert_eq!(
                    err.to_string(),
                    format!("No data found for type={} id=uu-ii-dd", kind)
                );
            }

            #[tokio::test]
            async fn test_update_missing() {
                let store = $factory;
                let kind = unique_kind();

                let err = store
                    .update(&kind, "nope", record(json!({"added": "x"})))
                    .await
                    .unwrap_err();
                assert!(matches!(err, StoreError::Lookup { .. }));
                assert!(!store.exists(&kind, "nope").await.unwrap());
            }

            #[tokio::test]
            async fn test_delete_missing() {
                let store = $factory;
                let kind = unique_kind();

                store.delete(&kind, "nope").await.unwrap();
            }

            #[tokio::test]
            async fn test_find_nothing() {
                let store = $factory;
                let kind = unique_kind();

                assert_eq!(store.find(&kind, "name", &json!("value")).await.unwrap(), None);
                store.add(&kind, overwritten()).await.unwrap();
                assert_eq!(store.find(&kind, "name", &json!("value")).await.unwrap(), None);
                assert_eq!(store.find(&kind, "missing", &json!("value")).await.unwrap(), None);
            }

            #[tokio::test]
            async fn test_find_first() {
                let store = $factory;
                let kind = unique_kind();

                let id = store.add(&kind, original()).await.unwrap();
                let other = store.add(&kind, overwritten()).await.unwrap();

                assert_eq!(
                    store.find(&kind, "name", &json!("value")).await.unwrap(),
                    Some(id)
                );
                assert_eq!(
                    store.find(&kind, "altName", &json!("value")).await.unwrap(),
                    Some(other)
                );
            }

            #[tokio::test]
            async fn test_find_non_string() {
                let store = $factory;
                let kind = unique_kind();

                let id = store
                    .add(&kind, record(json!({"count": 3, "on": true})))
                    .await
                    .unwrap();

                assert_eq!(store.find(&kind, "count", &json!(3)).await.unwrap(), Some(id.clone()));
                assert_eq!(store.find(&kind, "on", &json!(true)).await.unwrap(), Some(id));
                assert_eq!(store.find(&kind, "count", &json!("3")).await.unwrap(), None);
            }

            #[tokio::test]
            async fn test_nested_rejected() {
                let store = $factory;
                let kind = unique_kind();

                let err = store
                    .add(&kind, record(json!({"name": "x", "tags": ["a", "b"]})))
                    .await
                    .unwrap_err();
                assert!(matches!(err, StoreError::Format { .. }));

                let id = store.add(&kind, original()).await.unwrap();
                let err = store
                    .update(&kind, &id, record(json!({"nested": {"a": 1}})))
                    .await
                    .unwrap_err();
                assert!(matches!(err, StoreError::Format { .. }));
                assert_eq!(store.get(&kind, &id).await.unwrap(), original());
            }

            #[tokio::test]
            async fn test_kinds_are_isolated() {
                let store = $factory;
                let first = unique_kind();
                let second = unique_kind();

                store.set(&first, "same", original()).await.unwrap();
                store.set(&second, "same", overwritten()).await.unwrap();

                assert_eq!(store.get(&first, "same").await.unwrap(), original());
                assert_eq!(store.get(&second, "same").await.unwrap(), overwritten());

                store.delete(&first, "same").await.unwrap();
                assert!(store.exists(&second, "same").await.unwrap());
            }

            #[tokio::test]
            async fn test_concurrent_adds() {
                let store = $factory;
                let kind = unique_kind();

                let mut handles = Vec::new();
                for i in 0..10 {
                    let store = store.clone();
                    let kind = kind.clone();
                    handles.push(tokio::spawn(async move {
                        store.add(&kind, record(json!({"n": i}))).await.unwrap()
                    }));
                }

                let mut ids = Vec::new();
                for handle in handles {
                    ids.push(handle.await.unwrap());
                }

                let mut listed = store.list(&kind).await.unwrap();
                listed.sort();
                ids.sort();
                assert_eq!(listed, ids);
            }
        }
    };
}
