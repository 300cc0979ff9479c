/*!
 * Tests that failed multi-record operations leave the store untouched
 */

use serde_json::json;
use transcache::{StoreError, TranslationStore};

use crate::common::{create_memory_store, sample_entry};

/// Make the third row deletion inside a statement or transaction fail
async fn install_failing_delete_trigger(store: &TranslationStore) {
    store
        .connection()
        .execute_async(|conn| {
            conn.execute_batch(
                r#"
                CREATE TABLE delete_probe (n INTEGER);
                CREATE TRIGGER fail_third_delete BEFORE DELETE ON translations_history
                BEGIN
                    INSERT INTO delete_probe VALUES (1);
                    SELECT RAISE(ABORT, 'injected delete failure')
                    WHERE (SELECT COUNT(*) FROM delete_probe) >= 3;
                END;
                "#,
            )?;
            Ok(())
        })
        .await
        .expect("Failed to install trigger");
}

async fn remove_failing_delete_trigger(store: &TranslationStore) {
    store
        .connection()
        .execute_async(|conn| {
            conn.execute_batch("DROP TRIGGER fail_third_delete; DELETE FROM delete_probe;")?;
            Ok(())
        })
        .await
        .expect("Failed to remove trigger");
}

#[tokio::test]
async fn test_deleteEntries_failingMidway_shouldKeepEveryRecord() {
    let store = create_memory_store();
    let entries: Vec<_> = (0..5).map(|_| sample_entry("x", "y")).collect();
    let keys = store.add_entries(&entries).await.unwrap();
    install_failing_delete_trigger(&store).await;

    let result = store.delete_entries(&json!({"originalText": "x"})).await;

    assert!(matches!(result, Err(StoreError::Storage(_))));
    assert_eq!(store.count().await.unwrap(), 5);
    for key in &keys {
        assert!(store.get_entry(*key).await.unwrap().is_some());
    }

    remove_failing_delete_trigger(&store).await;
    let deleted = store
        .delete_entries(&json!({"originalText": "x"}))
        .await
        .expect("Delete should succeed once the failure is removed");

    assert_eq!(deleted, 5);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_flush_failingMidway_shouldKeepEveryRecord() {
    let store = create_memory_store();
    let entries: Vec<_> = ["a", "b", "c", "d"]
        .iter()
        .map(|text| sample_entry(text, text))
        .collect();
    store.add_entries(&entries).await.unwrap();
    install_failing_delete_trigger(&store).await;

    let result = store.flush().await;

    assert!(result.is_err());
    assert_eq!(store.count().await.unwrap(), 4);
}

#[tokio::test]
async fn test_failedDelete_shouldNotPoisonLaterOperations() {
    let store = create_memory_store();
    let entries: Vec<_> = (0..3).map(|_| sample_entry("x", "y")).collect();
    store.add_entries(&entries).await.unwrap();
    install_failing_delete_trigger(&store).await;

    assert!(store.delete_entries(&json!({"originalText": "x"})).await.is_err());

    let key = store.add_entry(&sample_entry("after", "après")).await.unwrap();
    assert!(store.get_entry(key).await.unwrap().is_some());
    assert_eq!(store.count().await.unwrap(), 4);
}
