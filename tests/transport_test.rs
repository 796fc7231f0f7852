use bytes::Bytes;
use std::time::Duration;
use wavefront_sender::sender::{compress_payload, decompress_payload};
use wavefront_sender::{ClientConfig, DataType, Delivery, HttpTransport, Transport};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

const TOKEN: &str = "test-token-123";

fn gzip(body: &str) -> Bytes {
    Bytes::from(compress_payload(body.as_bytes()).unwrap())
}

#[tokio::test]
async fn test_report_request_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/report"))
        .and(query_param("f", "wavefront"))
        .and(header("content-type", "application/octet-stream"))
        .and(header("content-encoding", "gzip"))
        .and(header("authorization", "Bearer test-token-123"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(&ClientConfig::new(mock_server.uri(), TOKEN)).unwrap();
    let body = "\"cpu.load\" 0.5 source=\"web-1\"\n";

    let delivery = transport.send(gzip(body), DataType::Metric).await.unwrap();
    assert_eq!(delivery, Delivery::Accepted { status: 202 });

    // Body arrives as the gzip stream, undecoded
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let received = decompress_payload(&requests[0].body).unwrap();
    assert_eq!(String::from_utf8(received).unwrap(), body);
}

#[tokio::test]
async fn test_format_discriminator_per_data_type() {
    let mock_server = MockServer::start().await;

    for format in ["wavefront", "histogram", "trace"] {
        Mock::given(method("POST"))
            .and(path("/report"))
            .and(query_param("f", format))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let transport = HttpTransport::new(&ClientConfig::new(mock_server.uri(), TOKEN)).unwrap();
    for data_type in DataType::ALL {
        let delivery = transport.send(gzip("x 1\n"), data_type).await.unwrap();
        assert_eq!(delivery, Delivery::Accepted { status: 200 });
    }
}

#[tokio::test]
async fn test_server_with_path_prefix() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ingest/report"))
        .and(query_param("f", "trace"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = format!("{}/api/ingest/", mock_server.uri());
    let transport = HttpTransport::new(&ClientConfig::new(server, TOKEN)).unwrap();
    let delivery = transport.send(gzip("span\n"), DataType::Span).await.unwrap();
    assert!(delivery.is_accepted());
}

#[tokio::test]
async fn test_non_success_status_is_rejected_not_error() {
    let mock_server = MockServer::start().await;

    for status in [201, 400, 401, 503] {
        mock_server.reset().await;
        Mock::given(method("POST"))
            .and(path("/report"))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&mock_server)
            .await;

        let transport =
            HttpTransport::new(&ClientConfig::new(mock_server.uri(), TOKEN)).unwrap();
        let delivery = transport
            .send(gzip("x 1\n"), DataType::Histogram)
            .await
            .unwrap();
        assert_eq!(delivery, Delivery::Rejected { status }, "status {status}");
        assert!(!delivery.is_accepted());
    }
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Nothing listens on port 1
    let config = ClientConfig::new("http://127.0.0.1:1", TOKEN);
    let transport = HttpTransport::new(&config).unwrap();

    let err = transport
        .send(gzip("x 1\n"), DataType::Metric)
        .await
        .unwrap_err();
    assert!(err.is_connect(), "expected connect error, got {err:?}");
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(202).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new(mock_server.uri(), TOKEN)
        .with_request_timeout(Duration::from_millis(100));
    let transport = HttpTransport::new(&config).unwrap();

    let err = transport
        .send(gzip("x 1\n"), DataType::Metric)
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err:?}");
}

#[test]
fn test_report_urls() {
    let transport =
        HttpTransport::new(&ClientConfig::new("https://example.wavefront.com", TOKEN)).unwrap();

    assert_eq!(
        transport.report_url(DataType::Metric).as_str(),
        "https://example.wavefront.com/report?f=wavefront"
    );
    assert_eq!(
        transport.report_url(DataType::Span).as_str(),
        "https://example.wavefront.com/report?f=trace"
    );
}
