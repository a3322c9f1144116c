use std::time::Duration;

use reqwest::StatusCode;
use tokio::io::AsyncReadExt;
use wiremock::{
    matchers::{basic_auth, body_bytes, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use remote_bookshelf::models::Credential;
use remote_bookshelf::services::webdav::{
    error_status, HttpWebDavTransport, RetryConfig, WebDAVConfig, WebDavTransport,
};

fn create_transport(server_url: &str, retry: RetryConfig) -> HttpWebDavTransport {
    let config = WebDAVConfig {
        server_url: format!("{}/dav", server_url),
        username: "reader".to_string(),
        timeout_seconds: 10,
        server_type: None,
    };
    HttpWebDavTransport::new_with_retry(config, retry).expect("Failed to create transport")
}

fn credential() -> Credential {
    Credential::new("reader", "secret")
}

fn listing_body() -> String {
    r#"<?xml version="1.0"?>
<d:multistatus xmlns:d="DAV:">
    <d:response>
        <d:href>/dav/books/</d:href>
        <d:propstat>
            <d:prop>
                <d:displayname>books</d:displayname>
                <d:resourcetype><d:collection/></d:resourcetype>
            </d:prop>
            <d:status>HTTP/1.1 200 OK</d:status>
        </d:propstat>
    </d:response>
    <d:response>
        <d:href>/dav/books/Sci%20Fi/</d:href>
        <d:propstat>
            <d:prop>
                <d:displayname>Sci Fi</d:displayname>
                <d:getlastmodified>Fri, 20 Jun 2025 23:35:17 GMT</d:getlastmodified>
                <d:resourcetype><d:collection/></d:resourcetype>
            </d:prop>
            <d:status>HTTP/1.1 200 OK</d:status>
        </d:propstat>
    </d:response>
    <d:response>
        <d:href>/dav/books/b1.epub</d:href>
        <d:propstat>
            <d:prop>
                <d:displayname>b1.epub</d:displayname>
                <d:getcontentlength>1234567</d:getcontentlength>
                <d:getlastmodified>Thu, 24 Jul 2025 19:16:19 GMT</d:getlastmodified>
                <d:resourcetype/>
            </d:prop>
            <d:status>HTTP/1.1 200 OK</d:status>
        </d:propstat>
    </d:response>
</d:multistatus>"#
        .to_string()
}

#[tokio::test]
async fn test_list_entries_excludes_requested_collection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/books"))
        .and(header("depth", "1"))
        .and(basic_auth("reader", "secret"))
        .respond_with(
            ResponseTemplate::new(207)
                .set_body_string(listing_body())
                .insert_header("content-type", "application/xml"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = create_transport(&mock_server.uri(), RetryConfig::no_retry());
    let url = format!("{}/dav/books", mock_server.uri());
    let entries = transport.list_entries(&url, &credential()).await.unwrap();

    assert_eq!(entries.len(), 2, "the collection itself must not be listed");

    assert_eq!(entries[0].display_name, "Sci Fi");
    assert!(entries[0].is_directory);
    assert_eq!(entries[0].path, format!("{}/dav/books/Sci%20Fi/", mock_server.uri()));

    assert_eq!(entries[1].display_name, "b1.epub");
    assert!(!entries[1].is_directory);
    assert_eq!(entries[1].size, 1234567);
    assert_eq!(entries[1].path, format!("{}/dav/books/b1.epub", mock_server.uri()));
}

#[tokio::test]
async fn test_list_entries_resolves_relative_hrefs_against_collection() {
    let mock_server = MockServer::start().await;

    let body = r#"<?xml version="1.0"?>
<d:multistatus xmlns:d="DAV:">
    <d:response>
        <d:href>./</d:href>
        <d:propstat>
            <d:prop>
                <d:displayname>books</d:displayname>
                <d:resourcetype><d:collection/></d:resourcetype>
            </d:prop>
            <d:status>HTTP/1.1 200 OK</d:status>
        </d:propstat>
    </d:response>
    <d:response>
        <d:href>b1.epub</d:href>
        <d:propstat>
            <d:prop>
                <d:displayname>b1.epub</d:displayname>
                <d:getcontentlength>10</d:getcontentlength>
                <d:resourcetype/>
            </d:prop>
            <d:status>HTTP/1.1 200 OK</d:status>
        </d:propstat>
    </d:response>
</d:multistatus>"#;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/books/"))
        .respond_with(ResponseTemplate::new(207).set_body_string(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = create_transport(&mock_server.uri(), RetryConfig::no_retry());
    let url = format!("{}/dav/books/", mock_server.uri());
    let entries = transport.list_entries(&url, &credential()).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].display_name, "b1.epub");
    assert_eq!(entries[0].path, format!("{}/dav/books/b1.epub", mock_server.uri()));
}

#[tokio::test]
async fn test_list_entries_surfaces_http_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let transport = create_transport(&mock_server.uri(), RetryConfig::no_retry());
    let url = format!("{}/dav/missing", mock_server.uri());
    let err = transport.list_entries(&url, &credential()).await.unwrap_err();

    assert_eq!(error_status(&err), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_read_stream_returns_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dav/books/b1.epub"))
        .and(basic_auth("reader", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04epub".to_vec()))
        .mount(&mock_server)
        .await;

    let transport = create_transport(&mock_server.uri(), RetryConfig::no_retry());
    let url = format!("{}/dav/books/b1.epub", mock_server.uri());
    let mut stream = transport.read_stream(&url, &credential()).await.unwrap();

    let mut content = Vec::new();
    stream.read_to_end(&mut content).await.unwrap();
    assert_eq!(content, b"PK\x03\x04epub");
}

#[tokio::test]
async fn test_write_bytes_sends_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/dav/books/a.txt"))
        .and(header("content-type", "application/octet-stream"))
        .and(body_bytes(b"chapter one".to_vec()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = create_transport(&mock_server.uri(), RetryConfig::no_retry());
    let url = format!("{}/dav/books/a.txt", mock_server.uri());
    transport
        .write_bytes(&url, b"chapter one".to_vec(), "application/octet-stream", &credential())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_write_path_streams_file() {
    let mock_server = MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    let local = temp_dir.path().join("dune.epub");
    tokio::fs::write(&local, b"dune contents").await.unwrap();

    Mock::given(method("PUT"))
        .and(path("/dav/books/dune.epub"))
        .and(body_bytes(b"dune contents".to_vec()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = create_transport(&mock_server.uri(), RetryConfig::no_retry());
    let url = format!("{}/dav/books/dune.epub", mock_server.uri());
    transport.write_path(&url, &local, &credential()).await.unwrap();
}

#[tokio::test]
async fn test_write_path_missing_file_sends_nothing() {
    let mock_server = MockServer::start().await;
    let transport = create_transport(&mock_server.uri(), RetryConfig::no_retry());
    let url = format!("{}/dav/books/ghost.epub", mock_server.uri());

    let result = transport
        .write_path(&url, std::path::Path::new("/nonexistent/ghost.epub"), &credential())
        .await;

    assert!(result.is_err());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_make_directory_treats_existing_as_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("MKCOL"))
        .and(path("/dav/books"))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = create_transport(&mock_server.uri(), RetryConfig::no_retry());
    let url = format!("{}/dav/books", mock_server.uri());
    transport.make_directory(&url, &credential()).await.unwrap();
}

#[tokio::test]
async fn test_make_directory_conflict_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("MKCOL"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&mock_server)
        .await;

    let transport = create_transport(&mock_server.uri(), RetryConfig::no_retry());
    let url = format!("{}/dav/no-parent/books", mock_server.uri());
    let err = transport.make_directory(&url, &credential()).await.unwrap_err();

    assert_eq!(error_status(&err), Some(StatusCode::CONFLICT));
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/dav/books/old.txt"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let retry = RetryConfig {
        max_retries: 2,
        initial_delay_ms: 10,
        max_delay_ms: 20,
        ..RetryConfig::default()
    };
    let transport = create_transport(&mock_server.uri(), retry);
    let url = format!("{}/dav/books/old.txt", mock_server.uri());

    let err = tokio::time::timeout(Duration::from_secs(5), transport.delete(&url, &credential()))
        .await
        .expect("retries should finish quickly")
        .unwrap_err();

    assert_eq!(error_status(&err), Some(StatusCode::SERVICE_UNAVAILABLE));
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let retry = RetryConfig {
        initial_delay_ms: 10,
        ..RetryConfig::default()
    };
    let transport = create_transport(&mock_server.uri(), retry);
    let url = format!("{}/dav/books/old.txt", mock_server.uri());

    let err = transport.delete(&url, &credential()).await.unwrap_err();
    assert_eq!(error_status(&err), Some(StatusCode::UNAUTHORIZED));
}
