//! HTTP round trips against the local filesystem backend.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use fileserver::file_storage::{FileService, LocalBackend, LocalStorageConfig};
use fileserver::http_server::{HttpServer, HttpServerConfig};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

fn local_router(prevent_cleanup: bool) -> (Router, TempDir) {
    let temp = TempDir::new().unwrap();
    let backend = LocalBackend::open(&LocalStorageConfig {
        location: temp.path().join("upload"),
        prevent_cleanup,
    })
    .unwrap();
    let server = HttpServer::new(
        HttpServerConfig::default(),
        FileService::new(Arc::new(backend)),
    );
    (server.router(), temp)
}

async fn send(router: &Router, method: &str, uri: &str, body: &'static [u8]) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn put_then_get_returns_attachment() {
    let (router, _temp) = local_router(false);
    let id = Uuid::new_v4();

    let (status, _) = send(&router, "PUT", &format!("/{}/test.gml", id), b"<gml/>").await;
    assert_eq!(status, StatusCode::OK);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/{}/test.gml", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"test.gml\""
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"<gml/>");
}

#[tokio::test]
async fn files_land_in_identifier_directories() {
    let (router, temp) = local_router(false);
    let id = Uuid::new_v4().to_string();

    send(&router, "PUT", &format!("/{}/test.gml", id), b"data").await;

    let expected = temp.path().join("upload").join(&id).join("test.gml");
    assert_eq!(std::fs::read(expected).unwrap(), b"data");
}

#[tokio::test]
async fn overwrite_keeps_latest_content() {
    let (router, _temp) = local_router(false);
    let uri = format!("/{}/test.gml", Uuid::new_v4());

    send(&router, "PUT", &uri, b"first").await;
    send(&router, "PUT", &uri, b"second").await;

    let (status, body) = send(&router, "GET", &uri, b"").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"second");
}

#[tokio::test]
async fn copy_is_independent_of_source() {
    let (router, _temp) = local_router(false);
    let source = Uuid::new_v4();
    let destination = Uuid::new_v4();

    send(&router, "PUT", &format!("/{}/test.gml", source), b"original").await;
    let (status, _) = send(
        &router,
        "PUT",
        &format!("/copy/{}/{}/test.gml?expires=legal", source, destination),
        b"",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    send(&router, "DELETE", &format!("/{}/test.gml", source), b"").await;

    let (status, _) = send(&router, "GET", &format!("/{}/test.gml", source), b"").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&router, "GET", &format!("/{}/test.gml", destination), b"").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"original");
}

#[tokio::test]
async fn copy_of_missing_source_is_not_found() {
    let (router, _temp) = local_router(false);
    let (status, _) = send(
        &router,
        "PUT",
        &format!("/copy/{}/{}/test.gml", Uuid::new_v4(), Uuid::new_v4()),
        b"",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_all_removes_every_file() {
    let (router, temp) = local_router(false);
    let id = Uuid::new_v4().to_string();

    send(&router, "PUT", &format!("/{}/a.gml", id), b"a").await;
    send(&router, "PUT", &format!("/{}/b.gml", id), b"b").await;
    let directory = temp.path().join("upload").join(&id);
    assert!(directory.is_dir());

    let (status, _) = send(&router, "DELETE", &format!("/{}", id), b"").await;
    assert_eq!(status, StatusCode::OK);

    for name in ["a.gml", "b.gml"] {
        let (status, _) = send(&router, "GET", &format!("/{}/{}", id, name), b"").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    assert!(!directory.exists());
}

#[tokio::test]
async fn deletes_of_unknown_files_still_succeed() {
    let (router, _temp) = local_router(false);
    let id = Uuid::new_v4();

    let (status, _) = send(&router, "DELETE", &format!("/{}/missing.gml", id), b"").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&router, "DELETE", &format!("/{}", id), b"").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn prevent_cleanup_keeps_files() {
    let (router, _temp) = local_router(true);
    let uri = format!("/{}/test.gml", Uuid::new_v4());

    send(&router, "PUT", &uri, b"kept").await;
    let (status, _) = send(&router, "DELETE", &uri, b"").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, "GET", &uri, b"").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"kept");
}

#[tokio::test]
async fn invalid_parameters_are_rejected() {
    let (router, temp) = local_router(false);

    let (status, _) = send(&router, "PUT", "/not-a-uuid/test.gml", b"x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let long_name = "a".repeat(300);
    let (status, _) = send(
        &router,
        "PUT",
        &format!("/{}/{}", Uuid::new_v4(), long_name),
        b"x",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, "GET", "/not-a-uuid/test.gml", b"").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(
        std::fs::read_dir(temp.path().join("upload")).unwrap().count(),
        0
    );
}

#[tokio::test]
async fn unknown_expiry_tag_is_rejected() {
    let (router, _temp) = local_router(false);
    let uri = format!("/{}/test.gml?expires=forever", Uuid::new_v4());

    let (status, body) = send(&router, "PUT", &uri, b"x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], 400);
}

#[tokio::test]
async fn health_is_served() {
    let (router, _temp) = local_router(false);
    let (status, body) = send(&router, "GET", "/health", b"").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn encoded_slash_identifier_stays_inside_root() {
    let (router, temp) = local_router(false);
    let simple = Uuid::new_v4().simple().to_string();
    let outside = std::path::Path::new("/").join(&simple);

    let (status, _) = send(&router, "PUT", &format!("/%2F{}/escape.gml", simple), b"x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(
        &router,
        "PUT",
        &format!("/copy/{}/%2F{}/escape.gml", Uuid::new_v4(), simple),
        b"",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&router, "DELETE", &format!("/%2F{}", simple), b"").await;
    assert_eq!(status, StatusCode::OK);

    assert!(!outside.exists());
    assert_eq!(
        std::fs::read_dir(temp.path().join("upload")).unwrap().count(),
        0
    );
}

#[tokio::test]
async fn dot_discriminator_is_rejected() {
    let (router, _temp) = local_router(false);
    let uri = format!("/.{}/test.gml", Uuid::new_v4().simple());

    let (status, _) = send(&router, "PUT", &uri, b"x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
