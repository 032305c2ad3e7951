use opiapi::MediaItem;
use opicache::Reconciler;
use std::collections::BTreeSet;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn media_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/x.mkv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"matroska".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/y"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mpeg4".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken.mp4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    server
}

fn create_reconciler() -> (TempDir, Reconciler) {
    let temp_dir = tempfile::tempdir().unwrap();
    let reconciler = Reconciler::new(reqwest::Client::new(), temp_dir.path());
    (temp_dir, reconciler)
}

fn listing(dir: &Path) -> BTreeSet<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_fresh_directory_gets_sanitized_files() {
    let server = media_server().await;
    let (temp_dir, reconciler) = create_reconciler();
    let items = vec![
        MediaItem::new("a!b", format!("{}/x.mkv", server.uri()), "A"),
        MediaItem::new("c", format!("{}/y", server.uri()), "C"),
    ];

    let downloaded = reconciler.reconcile(&items).await;

    assert_eq!(downloaded.len(), 2);
    assert_eq!(listing(temp_dir.path()), names(&["a_b.mkv", "c.mp4"]));
    assert_eq!(
        std::fs::read(temp_dir.path().join("a_b.mkv")).unwrap(),
        b"matroska"
    );
}

#[tokio::test]
async fn test_removed_item_is_deleted() {
    let server = media_server().await;
    let (temp_dir, reconciler) = create_reconciler();
    std::fs::write(temp_dir.path().join("a_b.mkv"), b"old").unwrap();
    std::fs::write(temp_dir.path().join("c.mp4"), b"old").unwrap();

    let items = vec![MediaItem::new("c", format!("{}/y", server.uri()), "C")];
    let downloaded = reconciler.reconcile(&items).await;

    assert_eq!(downloaded, vec![temp_dir.path().join("c.mp4")]);
    assert_eq!(listing(temp_dir.path()), names(&["c.mp4"]));
    assert_eq!(std::fs::read(temp_dir.path().join("c.mp4")).unwrap(), b"mpeg4");
}

#[tokio::test]
async fn test_empty_urls_only_prune() {
    let (temp_dir, reconciler) = create_reconciler();
    std::fs::write(temp_dir.path().join("keep.mp4"), b"k").unwrap();
    std::fs::write(temp_dir.path().join("gone.mkv"), b"g").unwrap();
    std::fs::write(temp_dir.path().join(".concat.txt"), b"file 'x'").unwrap();
    std::fs::create_dir(temp_dir.path().join("subdir")).unwrap();

    let items = vec![MediaItem::new("keep", "", "K"), MediaItem::new("other", "", "O")];
    let downloaded = reconciler.reconcile(&items).await;

    assert!(downloaded.is_empty());
    assert_eq!(listing(temp_dir.path()), names(&["keep.mp4", "subdir"]));
}

#[tokio::test]
async fn test_empty_manifest_clears_directory() {
    let (temp_dir, reconciler) = create_reconciler();
    std::fs::write(temp_dir.path().join("a_b.mkv"), b"old").unwrap();
    std::fs::write(temp_dir.path().join("c.mp4"), b"old").unwrap();

    let downloaded = reconciler.reconcile(&[]).await;

    assert!(downloaded.is_empty());
    assert!(listing(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_failed_item_does_not_stop_others() {
    let server = media_server().await;
    let (temp_dir, reconciler) = create_reconciler();
    let items = vec![
        MediaItem::new("broken", format!("{}/broken.mp4", server.uri()), "B"),
        MediaItem::new("c", format!("{}/y", server.uri()), "C"),
    ];

    let downloaded = reconciler.reconcile(&items).await;

    assert_eq!(downloaded, vec![temp_dir.path().join("c.mp4")]);
    assert!(listing(temp_dir.path()).contains("c.mp4"));
}

#[tokio::test]
async fn test_second_pass_leaves_directory_unchanged() {
    let server = media_server().await;
    let (temp_dir, reconciler) = create_reconciler();
    let items = vec![
        MediaItem::new("a!b", format!("{}/x.mkv", server.uri()), "A"),
        MediaItem::new("c", format!("{}/y", server.uri()), "C"),
    ];

    reconciler.reconcile(&items).await;
    let first = listing(temp_dir.path());
    reconciler.reconcile(&items).await;

    assert_eq!(listing(temp_dir.path()), first);
}

#[tokio::test]
async fn test_format_change_replaces_old_variant() {
    let server = media_server().await;
    let (temp_dir, reconciler) = create_reconciler();
    std::fs::write(temp_dir.path().join("c.mp4"), b"old format").unwrap();

    let items = vec![MediaItem::new("c", format!("{}/x.mkv", server.uri()), "C")];
    reconciler.reconcile(&items).await;

    assert_eq!(listing(temp_dir.path()), names(&["c.mkv"]));
}

#[tokio::test]
async fn test_missing_directory_downloads_nothing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let reconciler = Reconciler::new(reqwest::Client::new(), temp_dir.path().join("absent"));
    let items = vec![MediaItem::new("c", "http://127.0.0.1:9/y", "C")];

    assert!(reconciler.reconcile(&items).await.is_empty());
}
