// End-to-end cycle tests against mocked Google News and Alpaca servers
use mockito::{Matcher, Mock, Server, ServerGuard};
use sentibot::api::{AlpacaClient, GoogleNewsClient};
use sentibot::config::Settings;
use sentibot::execution::{CycleRunner, OrderMode, TickerOutcome};
use sentibot::models::WatchlistEntry;
use sentibot::sentiment::VaderModel;
use serde_json::json;
use std::time::Duration;

fn rss(titles: &[&str]) -> String {
    let items: String = titles
        .iter()
        .map(|t| format!("<item><title>{}</title><link>https://news.example/1</link></item>", t))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>Google News</title>{}</channel></rss>"#,
        items
    )
}

fn test_settings(news: &ServerGuard, alpaca: &ServerGuard) -> Settings {
    let mut settings = Settings {
        watchlist: vec![
            WatchlistEntry::new("AAPL", "Apple"),
            WatchlistEntry::new("BA", "Boeing"),
            WatchlistEntry::new("KO", "Coca-Cola"),
        ],
        ..Default::default()
    };
    settings.news.base_url = news.url();
    settings.news.requests_per_minute = 600;
    settings.broker.key_id = "test-key".to_string();
    settings.broker.secret_key = "test-secret".to_string();
    settings.broker.trading_url = alpaca.url();
    settings.broker.data_url = alpaca.url();
    settings.cycle.order_pause_ms = 0;
    settings
}

fn runner(
    settings: &Settings,
    mode: OrderMode,
) -> CycleRunner<GoogleNewsClient, AlpacaClient, VaderModel> {
    let timeout = Duration::from_secs(5);
    let news = GoogleNewsClient::from_settings(&settings.news, timeout).unwrap();
    let broker = AlpacaClient::new(&settings.broker, timeout).unwrap();
    CycleRunner::new(news, broker, VaderModel::new(), settings, mode)
}

async fn mock_headlines(server: &mut ServerGuard, company: &str, titles: &[&str]) -> Mock {
    server
        .mock("GET", "/rss/search")
        .match_query(Matcher::UrlEncoded("q".into(), company.into()))
        .with_status(200)
        .with_header("content-type", "application/xml")
        .with_body(rss(titles))
        .create_async()
        .await
}

async fn mock_account(server: &mut ServerGuard, portfolio_value: &str) -> Mock {
    server
        .mock("GET", "/v2/account")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"cash": "40000", "portfolio_value": portfolio_value}).to_string())
        .create_async()
        .await
}

async fn mock_price(server: &mut ServerGuard, symbol: &str, price: f64) -> Mock {
    server
        .mock("GET", format!("/v2/stocks/{}/trades/latest", symbol).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"symbol": symbol, "trade": {"p": price, "s": 100}}).to_string())
        .create_async()
        .await
}

async fn mock_position(server: &mut ServerGuard, symbol: &str, qty: Option<&str>) -> Mock {
    let path = format!("/v2/positions/{}", symbol);
    match qty {
        Some(qty) => {
            server
                .mock("GET", path.as_str())
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(json!({"symbol": symbol, "qty": qty, "side": "long"}).to_string())
                .create_async()
                .await
        }
        None => {
            server
                .mock("GET", path.as_str())
                .with_status(404)
                .with_body(r#"{"code":40410000,"message":"position does not exist"}"#)
                .create_async()
                .await
        }
    }
}

async fn mock_order(server: &mut ServerGuard, symbol: &str, side: &str, qty: &str, expected: usize) -> Mock {
    server
        .mock("POST", "/v2/orders")
        .match_body(Matcher::PartialJson(json!({
            "symbol": symbol,
            "side": side,
            "qty": qty,
            "type": "market",
            "time_in_force": "gtc"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": format!("order-{}", symbol),
                "client_order_id": "c-1",
                "symbol": symbol,
                "side": side,
                "qty": qty,
                "status": "accepted"
            })
            .to_string(),
        )
        .expect(expected)
        .create_async()
        .await
}

#[tokio::test]
async fn test_full_cycle_against_mock_services() {
    let mut news = Server::new_async().await;
    let mut alpaca = Server::new_async().await;

    mock_headlines(
        &mut news,
        "Apple",
        &[
            "Apple reports great quarter",
            "Apple looks good",
        ],
    )
    .await;
    mock_headlines(&mut news, "Boeing", &["Boeing reports horrible quarter"]).await;
    mock_headlines(&mut news, "Coca-Cola", &["Coca-Cola schedules annual meeting for Tuesday"]).await;

    mock_account(&mut alpaca, "100000").await;
    mock_price(&mut alpaca, "AAPL", 150.0).await;
    mock_price(&mut alpaca, "BA", 210.0).await;
    mock_price(&mut alpaca, "KO", 60.0).await;
    mock_position(&mut alpaca, "AAPL", None).await;
    mock_position(&mut alpaca, "BA", Some("4")).await;
    mock_position(&mut alpaca, "KO", Some("20")).await;
    let buy = mock_order(&mut alpaca, "AAPL", "buy", "10", 1).await;
    let sell = mock_order(&mut alpaca, "BA", "sell", "4", 1).await;

    let settings = test_settings(&news, &alpaca);
    let report = runner(&settings, OrderMode::Live).run().await.unwrap();

    buy.assert_async().await;
    sell.assert_async().await;

    assert_eq!(report.portfolio.total_value, 100_000.0);
    assert_eq!(
        report.outcome("AAPL"),
        Some(&TickerOutcome::Bought {
            quantity: 10,
            value: 1_500.0
        })
    );
    assert_eq!(report.outcome("BA"), Some(&TickerOutcome::Sold { quantity: 4 }));
    assert!(matches!(report.outcome("KO"), Some(TickerOutcome::Skipped { .. })));
    assert_eq!(report.total_invested, 1_500.0);
    assert!(!report.halted);
}

#[tokio::test]
async fn test_dry_run_submits_nothing() {
    let mut news = Server::new_async().await;
    let mut alpaca = Server::new_async().await;

    mock_headlines(&mut news, "Apple", &["Apple reports great quarter"]).await;
    mock_headlines(&mut news, "Boeing", &["Boeing reports horrible quarter"]).await;
    mock_headlines(&mut news, "Coca-Cola", &[]).await;

    mock_account(&mut alpaca, "100000").await;
    mock_price(&mut alpaca, "AAPL", 150.0).await;
    mock_price(&mut alpaca, "BA", 210.0).await;
    mock_price(&mut alpaca, "KO", 60.0).await;
    mock_position(&mut alpaca, "AAPL", None).await;
    mock_position(&mut alpaca, "BA", Some("4")).await;
    mock_position(&mut alpaca, "KO", None).await;
    let orders = alpaca
        .mock("POST", "/v2/orders")
        .expect(0)
        .create_async()
        .await;

    let settings = test_settings(&news, &alpaca);
    let report = runner(&settings, OrderMode::DryRun).run().await.unwrap();

    orders.assert_async().await;
    assert_eq!(report.orders_placed(), 2);
    assert_eq!(report.total_invested, 1_500.0);
}

#[tokio::test]
async fn test_news_outage_skips_only_that_ticker() {
    let mut news = Server::new_async().await;
    let mut alpaca = Server::new_async().await;

    mock_headlines(&mut news, "Apple", &["Apple reports great quarter"]).await;
    news.mock("GET", "/rss/search")
        .match_query(Matcher::UrlEncoded("q".into(), "Boeing".into()))
        .with_status(503)
        .create_async()
        .await;
    mock_headlines(&mut news, "Coca-Cola", &["Coca-Cola reports great quarter"]).await;

    mock_account(&mut alpaca, "100000").await;
    mock_price(&mut alpaca, "AAPL", 150.0).await;
    mock_price(&mut alpaca, "KO", 60.0).await;
    mock_position(&mut alpaca, "AAPL", None).await;
    mock_position(&mut alpaca, "KO", None).await;
    mock_order(&mut alpaca, "AAPL", "buy", "10", 1).await;
    let ko = mock_order(&mut alpaca, "KO", "buy", "10", 1).await;

    let settings = test_settings(&news, &alpaca);
    let report = runner(&settings, OrderMode::Live).run().await.unwrap();

    ko.assert_async().await;
    assert!(matches!(
        report.outcome("BA"),
        Some(TickerOutcome::Failed { error }) if error.contains("503")
    ));
    assert_eq!(report.failures(), 1);
    assert_eq!(report.total_invested, 2_100.0);
}

#[tokio::test]
async fn test_rejected_order_does_not_stop_cycle() {
    let mut news = Server::new_async().await;
    let mut alpaca = Server::new_async().await;

    mock_headlines(&mut news, "Apple", &["Apple reports great quarter"]).await;
    mock_headlines(&mut news, "Boeing", &["Boeing reports great quarter"]).await;
    mock_headlines(&mut news, "Coca-Cola", &[]).await;

    mock_account(&mut alpaca, "100000").await;
    mock_price(&mut alpaca, "AAPL", 150.0).await;
    mock_price(&mut alpaca, "BA", 210.0).await;
    mock_price(&mut alpaca, "KO", 60.0).await;
    mock_position(&mut alpaca, "AAPL", None).await;
    mock_position(&mut alpaca, "BA", None).await;
    mock_position(&mut alpaca, "KO", None).await;
    alpaca
        .mock("POST", "/v2/orders")
        .match_body(Matcher::PartialJson(json!({"symbol": "AAPL"})))
        .with_status(403)
        .with_body(r#"{"code":40310000,"message":"insufficient buying power"}"#)
        .create_async()
        .await;
    mock_order(&mut alpaca, "BA", "buy", "10", 1).await;

    let settings = test_settings(&news, &alpaca);
    let report = runner(&settings, OrderMode::Live).run().await.unwrap();

    assert!(matches!(
        report.outcome("AAPL"),
        Some(TickerOutcome::OrderFailed { error }) if error.contains("insufficient buying power")
    ));
    assert!(matches!(report.outcome("BA"), Some(TickerOutcome::Bought { .. })));
    // Only the filled Boeing order counts against the budget
    assert_eq!(report.total_invested, 2_100.0);
}

#[tokio::test]
async fn test_account_failure_is_fatal() {
    let mut news = Server::new_async().await;
    let mut alpaca = Server::new_async().await;

    let searches = news
        .mock("GET", "/rss/search")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    alpaca
        .mock("GET", "/v2/account")
        .with_status(500)
        .create_async()
        .await;

    let settings = test_settings(&news, &alpaca);
    let result = runner(&settings, OrderMode::Live).run().await;

    searches.assert_async().await;
    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("account"));
}

#[tokio::test]
async fn test_unreadable_order_acknowledgement_uses_budget() {
    let mut news = Server::new_async().await;
    let mut alpaca = Server::new_async().await;

    mock_headlines(&mut news, "Apple", &["Apple reports great quarter"]).await;
    mock_headlines(&mut news, "Boeing", &["Boeing reports great quarter"]).await;

    mock_account(&mut alpaca, "10000").await;
    mock_price(&mut alpaca, "AAPL", 100.0).await;
    mock_price(&mut alpaca, "BA", 100.0).await;
    mock_position(&mut alpaca, "AAPL", None).await;
    mock_position(&mut alpaca, "BA", None).await;
    let accepted = alpaca
        .mock("POST", "/v2/orders")
        .match_body(Matcher::PartialJson(json!({"symbol": "AAPL"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"x"}"#)
        .expect(1)
        .create_async()
        .await;
    let boeing = mock_order(&mut alpaca, "BA", "buy", "10", 0).await;

    let mut settings = test_settings(&news, &alpaca);
    settings.watchlist.truncate(2);
    settings.risk.max_total_investment_pct = 0.15; // $1,500 budget

    let report = runner(&settings, OrderMode::Live).run().await.unwrap();

    accepted.assert_async().await;
    boeing.assert_async().await;
    assert!(matches!(
        report.outcome("AAPL"),
        Some(TickerOutcome::Failed { error }) if error.contains("not confirmed")
    ));
    assert!(matches!(
        report.outcome("BA"),
        Some(TickerOutcome::BudgetExhausted { .. })
    ));
    assert_eq!(report.total_invested, 1_000.0);
    assert!(report.halted);
}
