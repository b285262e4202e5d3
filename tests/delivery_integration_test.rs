use rask_log_shipper::domain::LogLevel;
use rask_log_shipper::sender::{ClientConfig, decode_payload};
use rask_log_shipper::{Engine, EngineConfig};
use serde_json::Value;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn engine_config(server: &MockServer) -> EngineConfig {
    EngineConfig::new("app-7")
        .with_endpoint(server.uri())
        .with_hostname("integration-host")
        .with_announce_startup(false)
        .with_client(ClientConfig {
            timeout: Duration::from_secs(2),
            ..Default::default()
        })
}

async fn shutdown(engine: Engine) {
    tokio::task::spawn_blocking(move || engine.shutdown())
        .await
        .unwrap()
        .unwrap();
}

async fn received_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| serde_json::from_str(&decode_payload(&request.body).unwrap()).unwrap())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_log_delivered_after_two_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ingestion/app-7/logs"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/ingestion/app-7/logs"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = Engine::new(engine_config(&mock_server)).unwrap();
    engine.send_log(LogLevel::Info, "hello");
    let handle = engine.handle();
    shutdown(engine).await;

    let bodies = received_bodies(&mock_server).await;
    assert_eq!(bodies.len(), 3);
    assert!(bodies.iter().all(|body| body["content"] == "hello"));
    assert!(bodies.iter().all(|body| body["hostname"] == "integration-host"));

    let stats = handle.stats();
    assert_eq!(stats.attempts, 3);
    assert_eq!(stats.delivered, 1);
    assert_eq!(handle.pending(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_performance_dropped_after_max_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ingestion/app-7/performances"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let engine = Engine::new(engine_config(&mock_server)).unwrap();
    engine.send_performance("op", 42);
    let handle = engine.handle();
    shutdown(engine).await;

    let bodies = received_bodies(&mock_server).await;
    assert_eq!(bodies.len(), 3);
    assert!(
        bodies
            .iter()
            .all(|body| body["label"] == "op" && body["duration"] == 42)
    );
    assert_eq!(handle.stats().dropped, 1);
    assert_eq!(handle.pending(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_records_delivered_in_order_with_startup_first() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = engine_config(&mock_server).with_announce_startup(true);
    let engine = Engine::new(config).unwrap();
    for i in 0..5 {
        engine.send_log(LogLevel::Debug, format!("record {i}"));
    }
    shutdown(engine).await;

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 6);
    assert!(
        requests
            .iter()
            .all(|request| request.url.path() == "/api/ingestion/app-7/logs")
    );

    let bodies = received_bodies(&mock_server).await;
    assert_eq!(
        bodies[0]["content"],
        "rask-log-shipper started on integration-host"
    );
    for (i, body) in bodies[1..].iter().enumerate() {
        assert_eq!(body["content"], format!("record {i}"));
        assert_eq!(body["level"], 0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_endpoint_base_path_is_preserved() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/telemetry/api/ingestion/app-7/logs"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config =
        engine_config(&mock_server).with_endpoint(format!("{}/telemetry", mock_server.uri()));
    let engine = Engine::new(config).unwrap();
    engine.send_log(LogLevel::Info, "nested");
    shutdown(engine).await;
}
