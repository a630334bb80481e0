use super::*;
use restock_watcher::{Product, RunOptions, StatusLabel, StatusStore};
use std::collections::BTreeMap;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_restock_is_reported_once() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    serve(&server, "/p1", 200, "<html><body><button>Add to Cart</button></body></html>").await;

    let dir = tempdir()?;
    let state = dir.path().join("last_status.json");
    let notifier = RecordingNotifier::default();
    let runner = create_test_runner(&notifier)?;
    let url = format!("{}/p1", server.uri());
    let products = vec![Product::new("Booster Box", url.clone())];

    let first = runner.run(&products, &state, RunOptions::default()).await?;
    assert_eq!(first.events.len(), 1);
    assert_eq!(first.events[0].status, StatusLabel::InStock);

    let saved: BTreeMap<String, String> = serde_json::from_slice(&std::fs::read(&state)?)?;
    assert_eq!(saved, BTreeMap::from([(url.clone(), "in_stock".to_string())]));

    let second = runner.run(&products, &state, RunOptions::default()).await?;
    assert!(second.events.is_empty());

    let alerts = notifier.sent();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].subject, "Pokemon stock alert: 1 change(s)");
    assert_eq!(
        alerts[0].body,
        format!("Booster Box\n{}\nStatus: in_stock\n", url)
    );
    Ok(())
}

#[tokio::test]
async fn test_structured_data_wins_over_keywords() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let page = r#"<html><head>
        <script type="application/ld+json">
        {"@type": "Product", "offers": {"availability": "https://schema.org/OutOfStock"}}
        </script>
        </head><body><button>Add to Cart</button></body></html>"#;
    serve(&server, "/etb", 200, page).await;

    let notifier = RecordingNotifier::default();
    let runner = create_test_runner(&notifier)?;

    let status = runner.check_url(&format!("{}/etb", server.uri())).await;
    assert_eq!(status, StatusLabel::OutOfStock);
    Ok(())
}

#[tokio::test]
async fn test_failures_and_sell_outs_do_not_alert() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    serve(&server, "/missing", 503, "").await;
    serve(&server, "/tin", 200, "<p>Sold out</p>").await;

    let dir = tempdir()?;
    let state = dir.path().join("nested").join("last_status.json");
    let notifier = RecordingNotifier::default();
    let runner = create_test_runner(&notifier)?;
    let missing = format!("{}/missing", server.uri());
    let tin = format!("{}/tin", server.uri());
    let products = vec![
        Product::new("Booster Bundle", missing.clone()),
        Product::new("Tin", tin.clone()),
    ];

    let report = runner.run(&products, &state, RunOptions::default()).await?;
    assert_eq!(report.products_checked, 2);
    assert_eq!(report.fetch_failures, 1);
    assert!(report.events.is_empty());
    assert!(notifier.sent().is_empty());

    let store = StatusStore::load(&state).await?;
    assert_eq!(store.get(&missing), Some(StatusLabel::Unknown));
    assert_eq!(store.get(&tin), Some(StatusLabel::OutOfStock));
    Ok(())
}

#[tokio::test]
async fn test_corrupt_state_file_aborts_run() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    serve(&server, "/p1", 200, "<button>Add to Cart</button>").await;

    let dir = tempdir()?;
    let state = dir.path().join("last_status.json");
    std::fs::write(&state, "not json")?;

    let notifier = RecordingNotifier::default();
    let runner = create_test_runner(&notifier)?;
    let products = vec![Product::new("Booster Box", format!("{}/p1", server.uri()))];

    let result = runner.run(&products, &state, RunOptions::default()).await;
    assert!(result.is_err());
    assert!(notifier.sent().is_empty());
    assert_eq!(std::fs::read_to_string(&state)?, "not json");
    Ok(())
}
