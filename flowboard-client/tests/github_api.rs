//! HTTP-level tests of the GitHub client against a mock API

use flowboard_client::{ClientError, GitHubClient, WorkflowResolver};
use flowboard_core::domain::filter::WorkflowFilter;
use flowboard_core::domain::repository::RepositoryId;
use serde_json::json;
use std::io::{Cursor, Write};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WORKFLOWS_PATH: &str = "/repos/acme/rocket/actions/workflows";

fn client(server: &MockServer, token: Option<&str>) -> GitHubClient {
    GitHubClient::new(
        server.uri(),
        token.map(str::to_string),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn workflow(id: u64, name: &str) -> serde_json::Value {
    json!({ "id": id, "name": name, "path": format!(".github/workflows/{}.yml", id), "state": "active" })
}

fn run(id: u64, name: &str, workflow_id: u64, started: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "workflow_id": workflow_id,
        "run_number": id,
        "event": "push",
        "status": "completed",
        "conclusion": "success",
        "head_branch": "main",
        "html_url": format!("https://github.com/acme/rocket/actions/runs/{}", id),
        "created_at": started,
        "run_started_at": started,
        "head_commit": {
            "id": "acb5820ced9479c074f688cc328bf03f341a511d",
            "message": "Bump version",
            "timestamp": started,
            "author": { "name": "Octo Cat", "email": "octocat@github.com" }
        }
    })
}

#[tokio::test]
async fn test_resolve_pages_through_catalog_and_runs() {
    let server = MockServer::start().await;

    let first_page: Vec<serde_json::Value> = (1..=100).map(|i| workflow(i, &format!("wf-{}", i))).collect();
    Mock::given(method("GET"))
        .and(path(WORKFLOWS_PATH))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "total_count": 101, "workflows": first_page })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(WORKFLOWS_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "total_count": 101, "workflows": [workflow(4242, "Release")] }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/rocket/actions/workflows/4242/runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 2,
            "workflow_runs": [
                run(2, "Release", 4242, "2024-03-02T10:00:00Z"),
                run(1, "Release", 4242, "2024-03-01T10:00:00Z"),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = WorkflowResolver::new(Arc::new(client(&server, Some("secret"))));
    let filter = WorkflowFilter::new("acme", "rocket").with_workflows(["Release"]);

    let runs = resolver.resolve(&filter, false).await.unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].run_id, 2);
    assert_eq!(runs[0].commit_author, "Octo Cat");
    assert_eq!(runs[0].commit_sha, "acb5820ced9479c074f688cc328bf03f341a511d");
    assert_eq!(runs[1].run_id, 1);
}

#[tokio::test]
async fn test_api_error_status_is_propagated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WORKFLOWS_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API rate limit exceeded"))
        .mount(&server)
        .await;

    let resolver = WorkflowResolver::new(Arc::new(client(&server, None)));
    let err = resolver
        .resolve(&WorkflowFilter::new("acme", "rocket"), true)
        .await
        .unwrap_err();

    match err {
        ClientError::ApiError { status, message } => {
            assert_eq!(status, 403);
            assert!(message.contains("rate limit"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in files {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn test_extract_follows_log_redirect() {
    let server = MockServer::start().await;
    let archive = zip_bytes(&[(
        "build/3_Deploy.txt",
        "2022-02-24T11:10:24.8627684Z env:\n\
         2022-02-24T11:10:24.8628366Z   target: production\n\
         2022-02-24T11:10:24.8629861Z ##[endgroup]\n",
    )]);

    Mock::given(method("GET"))
        .and(path("/repos/acme/rocket/actions/runs/77/logs"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/blobs/77.zip", server.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blobs/77.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = WorkflowResolver::new(Arc::new(client(&server, Some("secret"))));
    let params = resolver
        .extract(&WorkflowFilter::new("acme", "rocket"), 77)
        .await
        .unwrap();

    assert_eq!(params.run_id, 77);
    assert_eq!(params.parameter_sets.len(), 1);
    assert_eq!(
        params.parameter_sets[0].get("target").map(String::as_str),
        Some("production")
    );
}

#[tokio::test]
async fn test_failed_archive_download_includes_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/rocket/actions/runs/5/logs"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/blobs/5.zip", server.uri()).as_str()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blobs/5.zip"))
        .respond_with(ResponseTemplate::new(410).set_body_string("logs expired"))
        .mount(&server)
        .await;

    let github = client(&server, None);
    let err = WorkflowResolver::new(Arc::new(github))
        .extract(&WorkflowFilter::new("acme", "rocket"), 5)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::ApiError { status: 410, .. }));
    assert!(err.to_string().contains("logs expired"));
}

#[tokio::test]
async fn test_log_endpoint_without_redirect() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/rocket/actions/runs/9/logs"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let err = client(&server, None)
        .run_logs_location(&RepositoryId::new("acme", "rocket"), 9)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MissingRedirect(9)));
}
