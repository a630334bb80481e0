use super::*;
use restock_watcher::{AppError, PageFetcher};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_returns_body_and_sends_headers() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/booster-box"))
        .and(header("user-agent", "restock-watcher-test"))
        .and(header("accept-language", "en-GB"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<button>Add to Cart</button>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&get_test_scraper_config())?;
    let body = fetcher
        .fetch(&format!("{}/p/booster-box", server.uri()))
        .await?;

    assert_eq!(body, "<button>Add to Cart</button>");
    Ok(())
}

#[tokio::test]
async fn test_fetch_non_success_status_is_an_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<p>In stock</p>"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&get_test_scraper_config())?;
    let result = fetcher.fetch(&format!("{}/p/gone", server.uri())).await;

    match result {
        Err(AppError::Fetch { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected fetch error, got {:?}", other.map(|_| ())),
    }
    Ok(())
}

#[tokio::test]
async fn test_fetch_times_out() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<p>Sold out</p>")
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&get_test_scraper_config())?;
    let result = fetcher.fetch(&format!("{}/slow", server.uri())).await;

    assert!(matches!(result, Err(AppError::Http(_))));
    Ok(())
}
