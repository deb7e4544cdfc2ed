//! Serve over a real socket and shut down gracefully.

use std::time::Duration;

use tokio::net::TcpListener;

use route_dispatch::app::build_pipeline;
use route_dispatch::{AppConfig, HttpServer, Services, Shutdown};

#[tokio::test]
async fn test_serves_until_shutdown() {
    let config = AppConfig::default();
    let services = Services::standard(&config);
    let pipeline = build_pipeline(&config, &services).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, pipeline);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/customers/5"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    let customer: serde_json::Value = response.json().await.unwrap();
    assert_eq!(customer["FirstName"], "Marcin");

    let response = client
        .post(format!("http://{addr}/B"))
        .body("over the wire")
        .send()
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "over the wire");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
