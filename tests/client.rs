//! Integration tests for GitHubClient using wiremock

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use repoprobe::{AnalysisError, ApiResponse, ClientConfig, GitHubClient, RepositoryId};

fn create_client(mock_server: &MockServer) -> GitHubClient {
    GitHubClient::new(ClientConfig {
        api_url: mock_server.uri(),
        ..ClientConfig::default()
    })
    .unwrap()
}

fn repo() -> RepositoryId {
    RepositoryId::parse("octocat/Hello-World").unwrap()
}

#[tokio::test]
async fn test_etag_revalidation_returns_identical_payload() {
    let mock_server = MockServer::start().await;
    let body = json!({"full_name": "octocat/Hello-World", "stargazers_count": 42});

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World"))
        .and(header("If-None-Match", "\"v1\""))
        .respond_with(ResponseTemplate::new(304))
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v1\"")
                .set_body_json(&body),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let first = client.get("/repos/octocat/Hello-World", &[]).await.unwrap();
    let second = client.get("/repos/octocat/Hello-World", &[]).await.unwrap();

    assert_eq!(first, ApiResponse::Found(body));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_not_modified_after_eviction_refetches() {
    let mock_server = MockServer::start().await;
    let first = json!({"full_name": "octocat/a", "stargazers_count": 1});
    let fresh = json!({"full_name": "octocat/a", "stargazers_count": 2});

    Mock::given(method("GET"))
        .and(path("/repos/octocat/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"a1\"")
                .set_body_json(&first),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/a"))
        .respond_with(ResponseTemplate::new(304))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"a2\"")
                .set_body_json(&fresh),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/b"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"b1\"")
                .set_body_json(json!({"full_name": "octocat/b"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = GitHubClient::new(ClientConfig {
        api_url: mock_server.uri(),
        cache_capacity: 1,
        ..ClientConfig::default()
    })
    .unwrap();

    assert_eq!(
        client.get("/repos/octocat/a", &[]).await.unwrap(),
        ApiResponse::Found(first)
    );
    // evicts the entry for a
    client.get("/repos/octocat/b", &[]).await.unwrap();

    // the 304 has nothing to revalidate, so the client asks again without a validator
    let response = client.get("/repos/octocat/a", &[]).await.unwrap();
    assert_eq!(response, ApiResponse::Found(fresh));
}

#[tokio::test]
async fn test_query_is_part_of_cache_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/commits"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"c\"")
                .set_body_json(json!([])),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let path = "/repos/octocat/Hello-World/commits";
    client.get(path, &[("per_page", "100")]).await.unwrap();
    // different query, no validator to send, so a plain 200 again
    let other = client.get(path, &[("per_page", "1")]).await.unwrap();
    assert!(matches!(other, ApiResponse::Found(_)));
}

#[tokio::test]
async fn test_not_found_and_unauthorized_are_absent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/private"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let missing = client.get("/repos/octocat/missing", &[]).await.unwrap();
    let private = client.get("/repos/octocat/private", &[]).await.unwrap();

    assert_eq!(missing, ApiResponse::Absent);
    assert_eq!(private, ApiResponse::Absent);
    assert_eq!(missing.into_found().unwrap(), None);
}

#[tokio::test]
async fn test_forbidden_with_budget_left_is_absent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/branches/main/protection"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("X-RateLimit-Remaining", "4000")
                .insert_header("X-RateLimit-Limit", "5000"),
        )
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let response = client
        .get("/repos/octocat/Hello-World/branches/main/protection", &[])
        .await
        .unwrap();
    assert_eq!(response, ApiResponse::Absent);
    assert_eq!(client.rate_remaining(), Some(4000));
}

#[tokio::test]
async fn test_exhausted_budget_fails_fast() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("X-RateLimit-Remaining", "0")
                .insert_header("X-RateLimit-Limit", "60")
                .insert_header("X-RateLimit-Reset", "1700000000"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let first = client.get("/repos/octocat/Hello-World", &[]).await.unwrap();
    assert_eq!(
        first,
        ApiResponse::RateLimited {
            reset_at: Some(1_700_000_000)
        }
    );

    let second = client.get("/repos/octocat/Hello-World/languages", &[]).await;
    match second {
        Err(AnalysisError::RateLimitExhausted { reset_at }) => {
            assert_eq!(reset_at, Some(1_700_000_000))
        }
        other => panic!("expected fail-fast, got {:?}", other),
    }

    let contributors = client.contributor_count(&repo()).await;
    assert!(matches!(
        contributors,
        Err(AnalysisError::RateLimitExhausted { .. })
    ));
}

#[tokio::test]
async fn test_secondary_rate_limit_is_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let response = client.get("/repos/octocat/Hello-World", &[]).await.unwrap();
    assert!(matches!(response, ApiResponse::RateLimited { .. }));
    assert!(response.into_found().unwrap_err().is_rate_limit());
}

#[tokio::test]
async fn test_transport_failures_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = GitHubClient::new(ClientConfig {
        api_url: mock_server.uri(),
        timeout: Duration::from_millis(100),
        max_retries: 2,
        ..ClientConfig::default()
    })
    .unwrap();

    let result = client.get("/repos/octocat/Hello-World", &[]).await;
    match result {
        Err(AnalysisError::Transport { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_truncated_body_is_retried() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let accepted = Arc::clone(&connections);

    // promises 100 bytes, sends five, hangs up
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            accepted.fetch_add(1, Ordering::SeqCst);
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"a\":",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });

    let client = GitHubClient::new(ClientConfig {
        api_url: format!("http://{}", addr),
        max_retries: 2,
        ..ClientConfig::default()
    })
    .unwrap();

    let result = client.get("/repos/octocat/Hello-World", &[]).await;
    match result {
        Err(AnalysisError::Transport { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected transport error, got {:?}", other),
    }
    assert_eq!(connections.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_invalid_json_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let result = client.get("/repos/octocat/Hello-World", &[]).await;
    assert!(matches!(result, Err(AnalysisError::Decode { .. })));
}

#[tokio::test]
async fn test_unexpected_status_is_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let result = client.get("/repos/octocat/Hello-World", &[]).await;
    assert!(matches!(
        result,
        Err(AnalysisError::Http { status: 502, .. })
    ));
}

#[tokio::test]
async fn test_low_budget_warns_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-RateLimit-Remaining", "3")
                .insert_header("X-RateLimit-Limit", "60")
                .set_body_json(json!({})),
        )
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    client.get("/a", &[]).await.unwrap();
    client.get("/b", &[]).await.unwrap();

    assert_eq!(
        client.warnings(),
        vec!["GitHub API rate limit low: 3/60 remaining".to_string()]
    );
}

#[tokio::test]
async fn test_sends_auth_and_version_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World"))
        .and(header("Authorization", "Bearer secret"))
        .and(header("X-GitHub-Api-Version", "2022-11-28"))
        .and(header("Accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = GitHubClient::new(ClientConfig {
        api_url: mock_server.uri(),
        token: Some("secret".to_string()),
        ..ClientConfig::default()
    })
    .unwrap();

    let response = client.get("/repos/octocat/Hello-World", &[]).await.unwrap();
    assert!(matches!(response, ApiResponse::Found(_)));
}

#[tokio::test]
async fn test_file_content_decodes_base64() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/contents/go.mod"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "file",
            "encoding": "base64",
            "content": "bW9kdWxlIGV4YW1w\nbGUuY29tL2FwcAo=\n"
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let content = client.file_content(&repo(), "go.mod").await.unwrap();
    assert_eq!(content.as_deref(), Some("module example.com/app\n"));

    let missing = client.file_content(&repo(), "Cargo.toml").await.unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_contributor_count_from_link_header() {
    let mock_server = MockServer::start().await;
    let link = format!(
        "<{0}/repositories/1/contributors?per_page=1&anon=true&page=2>; rel=\"next\", \
         <{0}/repositories/1/contributors?per_page=1&anon=true&page=57>; rel=\"last\"",
        mock_server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/contributors"))
        .and(query_param("per_page", "1"))
        .and(query_param("anon", "true"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", link.as_str())
                .set_body_json(json!([{"login": "octocat"}])),
        )
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    assert_eq!(client.contributor_count(&repo()).await.unwrap(), 57);
}

#[tokio::test]
async fn test_contributor_count_without_link() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/contributors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"login": "octocat"}])))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    assert_eq!(client.contributor_count(&repo()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_contributor_count_non_ok_is_zero() {
    let mock_server = MockServer::start().await;

    // GitHub answers 204 for an empty repository
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/contributors"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    assert_eq!(client.contributor_count(&repo()).await.unwrap(), 0);
}
