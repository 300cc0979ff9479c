/*!
 * Integration tests for translation store operations
 */

use serde_json::json;
use transcache::{SortOrder, StoreError, Translation, TranslationEntry, TranslationHistory};

use crate::common::{create_memory_store, distinct_entries, sample_entry};

fn tagged_entry(original_text: &str, lang: &str) -> TranslationEntry {
    TranslationEntry::with_timestamp(
        Translation::new(original_text, format!("{original_text}-{lang}"), "auto", lang)
            .with_field("lang", lang),
        1,
        None,
    )
}

#[tokio::test]
async fn test_addEntry_thenGetEntry_shouldRoundTrip() {
    let store = create_memory_store();
    let entries = vec![
        sample_entry("Hello", "Bonjour"),
        TranslationEntry::with_timestamp(
            Translation::new("Good night", "Gute Nacht", "en", "de")
                .with_field("transcription", "gʊd naɪt")
                .with_field("alternatives", json!(["Schlaf gut"])),
            42,
            Some("yandex".to_string()),
        ),
    ];

    for entry in entries {
        let key = store.add_entry(&entry).await.unwrap();
        assert_eq!(store.get_entry(key).await.unwrap(), Some(entry));
    }
}

#[tokio::test]
async fn test_getEntry_withUnknownKey_shouldReturnNone() {
    let store = create_memory_store();

    assert_eq!(store.get_entry(12345).await.unwrap(), None);
}

#[tokio::test]
async fn test_deleteEntry_shouldBeFinalAndRepeatable() {
    let store = create_memory_store();
    let keep = store.add_entry(&sample_entry("keep", "garder")).await.unwrap();
    let gone = store.add_entry(&sample_entry("gone", "parti")).await.unwrap();

    store.delete_entry(gone).await.unwrap();
    store.delete_entry(gone).await.unwrap();
    store.delete_entry(999).await.unwrap();

    assert!(store.get_entry(gone).await.unwrap().is_none());
    assert!(store.get_entry(keep).await.unwrap().is_some());
}

#[tokio::test]
async fn test_getEntries_desc_shouldReturnAllInDecreasingKeyOrder() {
    let store = create_memory_store();
    let n = 25;
    store.add_entries(&distinct_entries(n)).await.unwrap();

    let records = store.get_entries(Some(0), Some(n), SortOrder::Desc).await.unwrap();

    assert_eq!(records.len(), n);
    assert!(records.windows(2).all(|pair| pair[0].key > pair[1].key));
}

#[tokio::test]
async fn test_getEntries_withoutBounds_asc_shouldReturnAllInIncreasingKeyOrder() {
    let store = create_memory_store();
    let n = 25;
    let keys = store.add_entries(&distinct_entries(n)).await.unwrap();

    let records = store.get_entries(None, None, SortOrder::Asc).await.unwrap();

    assert_eq!(records.iter().map(|r| r.key).collect::<Vec<_>>(), keys);
}

#[tokio::test]
async fn test_getEntries_defaultOrder_shouldBeNewestFirst() {
    let store = create_memory_store();
    store.add_entry(&sample_entry("old", "vieux")).await.unwrap();
    let newest = store.add_entry(&sample_entry("new", "neuf")).await.unwrap();

    let records = store.get_entries(None, Some(1), SortOrder::default()).await.unwrap();

    assert_eq!(records[0].key, newest);
}

#[tokio::test]
async fn test_getEntries_pages_shouldConcatenateToWholeListing() {
    let store = create_memory_store();
    let n = 17;
    store.add_entries(&distinct_entries(n)).await.unwrap();

    for order in [SortOrder::Asc, SortOrder::Desc] {
        let whole = store.get_entries(Some(0), Some(n), order).await.unwrap();
        for k in 0..=n {
            let mut joined = store.get_entries(Some(0), Some(k), order).await.unwrap();
            joined.extend(store.get_entries(Some(k), Some(n - k), order).await.unwrap());
            assert_eq!(joined, whole, "split at {k} ({order})");
        }
    }
}

#[tokio::test]
async fn test_getEntries_withOffsetBeyondSize_shouldReturnEmpty() {
    let store = create_memory_store();
    store.add_entries(&distinct_entries(3)).await.unwrap();

    assert!(store.get_entries(Some(3), None, SortOrder::Desc).await.unwrap().is_empty());
    assert!(store.get_entries(Some(100), Some(5), SortOrder::Asc).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_getEntries_withSmallLimit_shouldStopStreamingEarly() {
    let store = create_memory_store();
    store.add_entries(&distinct_entries(200)).await.unwrap();
    let before = store.records_scanned();

    let records = store.get_entries(Some(10), Some(5), SortOrder::Desc).await.unwrap();

    assert_eq!(records.len(), 5);
    assert_eq!(store.records_scanned() - before, 15);
}

#[tokio::test]
async fn test_findEntry_amongThousandEntries_shouldOnlyVisitIndexBucket() {
    let store = create_memory_store();
    let keys = store.add_entries(&distinct_entries(1000)).await.unwrap();
    let before = store.records_scanned();

    let found = store
        .find_entry(&json!({
            "translation": {"originalText": "text-617", "targetLanguage": "fr"},
            "translator": "google"
        }))
        .await
        .unwrap()
        .expect("Expected the entry to be found");

    assert_eq!(found.key, keys[617]);
    assert_eq!(found.data.translation.translated_text.as_deref(), Some("texte-617"));
    assert_eq!(store.records_scanned() - before, 1);
}

#[tokio::test]
async fn test_findEntry_withNonMatchingExtraField_shouldReturnNone() {
    let store = create_memory_store();
    store.add_entries(&distinct_entries(10)).await.unwrap();

    let found = store
        .find_entry(&json!({"translation": {"originalText": "text-3", "targetLanguage": "de"}}))
        .await
        .unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn test_findEntry_withNonStringOriginalText_shouldBePreconditionError() {
    let store = create_memory_store();

    let result = store.find_entry(&json!({"translation": {"originalText": 5}})).await;

    assert!(matches!(result, Err(StoreError::MissingOriginalText)));
}

#[tokio::test]
async fn test_deleteEntries_shouldRemoveExactlyTheMatchingSubset() {
    let store = create_memory_store();
    let x_en = store.add_entry(&tagged_entry("x", "en")).await.unwrap();
    let x_fr = store.add_entry(&tagged_entry("x", "fr")).await.unwrap();
    let y_en = store.add_entry(&tagged_entry("y", "en")).await.unwrap();

    let deleted = store
        .delete_entries(&json!({"originalText": "x", "lang": "en"}))
        .await
        .unwrap();

    assert_eq!(deleted, 1);
    assert!(store.get_entry(x_en).await.unwrap().is_none());
    assert!(store.get_entry(x_fr).await.unwrap().is_some());
    assert!(store.get_entry(y_en).await.unwrap().is_some());
}

#[tokio::test]
async fn test_deleteEntries_shouldVisitWholeBucket() {
    let store = create_memory_store();
    for _ in 0..4 {
        store.add_entry(&tagged_entry("x", "en")).await.unwrap();
    }
    store.add_entry(&tagged_entry("x", "fr")).await.unwrap();
    store.add_entry(&tagged_entry("z", "en")).await.unwrap();
    let before = store.records_scanned();

    let deleted = store
        .delete_entries(&json!({"originalText": "x", "lang": "en"}))
        .await
        .unwrap();

    assert_eq!(deleted, 4);
    assert_eq!(store.records_scanned() - before, 5);
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_deleteEntries_withNoMatches_shouldDeleteNothing() {
    let store = create_memory_store();
    store.add_entries(&distinct_entries(5)).await.unwrap();

    let deleted = store
        .delete_entries(&json!({"originalText": "absent"}))
        .await
        .unwrap();

    assert_eq!(deleted, 0);
    assert_eq!(store.count().await.unwrap(), 5);
}

#[tokio::test]
async fn test_flush_shouldEmptyCollection() {
    let store = create_memory_store();
    store.add_entries(&distinct_entries(30)).await.unwrap();

    let removed = store.flush().await.unwrap();

    assert_eq!(removed, 30);
    assert!(store.get_entries(None, None, SortOrder::Desc).await.unwrap().is_empty());
    assert_eq!(store.flush().await.unwrap(), 0);
}

#[tokio::test]
async fn test_operations_throughTraitObject_shouldBehaveLikeStore() {
    let store = create_memory_store();
    let history: &dyn TranslationHistory = &store;

    let key = history.add_entry(&sample_entry("trait", "trait")).await.unwrap();
    let found = history
        .find_entry(&json!({"translation": {"originalText": "trait"}}))
        .await
        .unwrap();

    assert_eq!(found.map(|r| r.key), Some(key));
    assert_eq!(history.get_entries(None, None, SortOrder::Asc).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reads_withRowHoldingOnlyOriginalText_shouldSucceedAndRoundTrip() {
    let store = create_memory_store();
    let raw_key = store
        .connection()
        .execute_async(|conn| {
            conn.execute(
                "INSERT INTO translations_history (data) VALUES (?1)",
                [r#"{"translation":{"originalText":"old"},"timestamp":1}"#],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .unwrap();
    let full_key = store.add_entry(&sample_entry("old", "vieux")).await.unwrap();
    let sparse = TranslationEntry::with_timestamp(Translation::original("old"), 1, None);

    assert_eq!(store.get_entry(raw_key).await.unwrap(), Some(sparse.clone()));

    let records = store.get_entries(None, None, SortOrder::Asc).await.unwrap();
    assert_eq!(records.iter().map(|r| r.key).collect::<Vec<_>>(), vec![raw_key, full_key]);
    assert_eq!(records[0].data, sparse);

    let found = store
        .find_entry(&json!({"translation": {"originalText": "old"}}))
        .await
        .unwrap();
    assert_eq!(found.map(|r| r.key), Some(raw_key));

    let with_language = store
        .find_entry(&json!({"translation": {"originalText": "old", "targetLanguage": "fr"}}))
        .await
        .unwrap();
    assert_eq!(with_language.map(|r| r.key), Some(full_key));

    let stored: serde_json::Value = serde_json::to_value(&sparse).unwrap();
    assert_eq!(stored, json!({"translation": {"originalText": "old"}, "timestamp": 1}));
}
