//! In-memory store and prompt loader tests.

use scriptorium_core::{Destination, Row, Table};
use scriptorium_interface::{DestinationStore, PromptTemplateLoader};
use scriptorium_storage::{FilePromptLoader, InMemoryStore};
use tempfile::TempDir;

fn ui_table(keys: &[&str]) -> Table {
    Table::new(
        vec!["key".into(), "en".into()],
        keys.iter()
            .map(|k| Row::new(*k).with_field("en", format!("text {k}")))
            .collect(),
    )
}

#[tokio::test]
async fn unknown_destination_reads_empty() {
    let store = InMemoryStore::new();
    let table = store.read(&Destination::new("doc", "UI")).await.unwrap();
    assert!(table.is_empty());
    assert!(table.header().is_empty());
}

#[tokio::test]
async fn write_overwrites_from_start_row() {
    let store = InMemoryStore::new();
    let destination = Destination::new("doc", "UI");
    store.insert(destination.clone(), &ui_table(&["k1", "k2", "k3"])).await;

    store.write(&destination, 1, &ui_table(&["a"])).await.unwrap();

    let keys: Vec<String> = store
        .read(&destination)
        .await
        .unwrap()
        .rows()
        .iter()
        .map(|r| r.key().to_string())
        .collect();
    assert_eq!(keys, ["a", "k2", "k3"]);
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn blank_padding_clears_stale_rows() {
    let store = InMemoryStore::new();
    let destination = Destination::new("doc", "UI");
    store.insert(destination.clone(), &ui_table(&["k1", "k2", "k3"])).await;

    let mut rows = ui_table(&["a"]).into_rows();
    rows.extend([Row::blank(), Row::blank()]);
    store
        .write(&destination, 1, &Table::new(vec!["key".into(), "en".into()], rows))
        .await
        .unwrap();

    let table = store.read(&destination).await.unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0].key(), "a");
}

#[tokio::test]
async fn zero_start_row_is_rejected() {
    let store = InMemoryStore::new();
    let result = store
        .write(&Destination::new("doc", "UI"), 0, &ui_table(&["k1"]))
        .await;
    assert!(result.is_err());
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn prompt_loader_uses_fallback() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("translate.txt"), "Translate to {{language_code}}").unwrap();
    std::fs::write(dir.path().join("translate_iroha.txt"), "Iroha voice").unwrap();
    let loader = FilePromptLoader::new(dir.path());

    assert_eq!(
        loader.load("translate_iroha.txt", Some("translate.txt")).await,
        "Iroha voice"
    );
    assert_eq!(
        loader.load("translate_mio.txt", Some("translate.txt")).await,
        "Translate to {{language_code}}"
    );
    assert_eq!(loader.load("missing.txt", None).await, "");
}

#[tokio::test]
async fn prompt_loader_refuses_paths() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("prompts");
    std::fs::create_dir(&nested).unwrap();
    std::fs::write(dir.path().join("secret.txt"), "secret").unwrap();
    let loader = FilePromptLoader::new(&nested);

    assert_eq!(loader.load("../secret.txt", None).await, "");
    assert_eq!(loader.load("../secret.txt", Some("..")).await, "");
}
