//! HTTP round trips against the object store backend, with the in-memory
//! object client standing in for S3.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use fileserver::file_storage::keys::object_key;
use fileserver::file_storage::{FileService, MemoryObjectClient, ObjectStoreBackend};
use fileserver::http_server::{HttpServer, HttpServerConfig};
use tower::ServiceExt;
use uuid::Uuid;

type MemoryBackend = ObjectStoreBackend<MemoryObjectClient>;

fn object_router() -> (Router, Arc<MemoryBackend>) {
    let backend = Arc::new(ObjectStoreBackend::new(MemoryObjectClient::new("uploads"), false));
    let server = HttpServer::new(
        HttpServerConfig::default(),
        FileService::new(backend.clone()),
    );
    (server.router(), backend)
}

async fn status_of(router: &Router, method: &str, uri: &str, body: &'static [u8]) -> StatusCode {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

async fn location_of(router: &Router, uri: &str) -> (StatusCode, Option<String>) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    (response.status(), location)
}

#[tokio::test]
async fn get_redirects_to_fetchable_url() {
    let (router, backend) = object_router();
    let id = Uuid::new_v4();

    let status = status_of(&router, "PUT", &format!("/{}/report%201.gml", id), b"<gml/>").await;
    assert_eq!(status, StatusCode::OK);

    let (status, location) = location_of(&router, &format!("/{}/report%201.gml", id)).await;
    assert_eq!(status, StatusCode::FOUND);

    let (body, disposition) = backend.client().fetch(&location.unwrap()).unwrap();
    assert_eq!(body, b"<gml/>");
    assert_eq!(disposition, "attachment; filename=\"report 1.gml\"");
}

#[tokio::test]
async fn expiry_tag_is_stored_with_object() {
    let (router, backend) = object_router();
    let id = Uuid::new_v4().to_string();

    status_of(&router, "PUT", &format!("/{}/a.gml?expires=SHORT", id), b"a").await;
    status_of(&router, "PUT", &format!("/{}/b.gml", id), b"b").await;

    let client = backend.client();
    assert_eq!(
        client.tagging(&object_key(&id, "a.gml")).as_deref(),
        Some("expires=short")
    );
    assert_eq!(
        client.tagging(&object_key(&id, "b.gml")).as_deref(),
        Some("expires=never")
    );
}

#[tokio::test]
async fn copy_replaces_tag_and_survives_source_delete() {
    let (router, backend) = object_router();
    let source = Uuid::new_v4().to_string();
    let destination = Uuid::new_v4().to_string();

    status_of(&router, "PUT", &format!("/{}/test.gml?expires=short", source), b"x").await;
    let status = status_of(
        &router,
        "PUT",
        &format!("/copy/{}/{}/test.gml?expires=legal", source, destination),
        b"",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        backend.client().tagging(&object_key(&destination, "test.gml")).as_deref(),
        Some("expires=legal")
    );

    status_of(&router, "DELETE", &format!("/{}", source), b"").await;

    let (status, _) = location_of(&router, &format!("/{}/test.gml", source)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = location_of(&router, &format!("/{}/test.gml", destination)).await;
    assert_eq!(status, StatusCode::FOUND);
}

#[tokio::test]
async fn missing_object_is_not_found() {
    let (router, _backend) = object_router();
    let (status, location) = location_of(&router, &format!("/{}/absent.gml", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(location.is_none());
}

#[tokio::test]
async fn delete_all_is_scoped_to_identifier() {
    let (router, backend) = object_router();
    let keep = Uuid::new_v4().to_string();
    let gone = Uuid::new_v4().to_string();

    status_of(&router, "PUT", &format!("/{}/a.gml", keep), b"a").await;
    status_of(&router, "PUT", &format!("/{}/a.gml", gone), b"a").await;
    status_of(&router, "PUT", &format!("/{}/b.gml", gone), b"b").await;

    let status = status_of(&router, "DELETE", &format!("/{}", gone), b"").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(backend.client().len(), 1);

    let (status, _) = location_of(&router, &format!("/{}/a.gml", keep)).await;
    assert_eq!(status, StatusCode::FOUND);
}

#[tokio::test]
async fn repeated_deletes_succeed() {
    let (router, backend) = object_router();
    let uri = format!("/{}/test.gml", Uuid::new_v4());

    status_of(&router, "PUT", &uri, b"x").await;
    assert_eq!(status_of(&router, "DELETE", &uri, b"").await, StatusCode::OK);
    assert_eq!(status_of(&router, "DELETE", &uri, b"").await, StatusCode::OK);
    assert!(backend.client().is_empty());
}

#[tokio::test]
async fn oversized_upload_is_refused() {
    let backend = Arc::new(ObjectStoreBackend::new(MemoryObjectClient::new("uploads"), false));
    let config = HttpServerConfig {
        max_upload_bytes: 4,
        ..Default::default()
    };
    let router = HttpServer::new(config, FileService::new(backend.clone())).router();

    let status = status_of(&router, "PUT", &format!("/{}/big.gml", Uuid::new_v4()), b"0123456789").await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(backend.client().is_empty());
}

#[tokio::test]
async fn presigned_urls_survive_reserved_and_non_ascii_names() {
    let (router, backend) = object_router();
    let id = Uuid::new_v4();

    for (encoded, name) in [("a%3Fb.gml", "a?b.gml"), ("caf%C3%A9.gml", "café.gml")] {
        let uri = format!("/{}/{}", id, encoded);
        assert_eq!(status_of(&router, "PUT", &uri, b"payload").await, StatusCode::OK);

        let (status, location) = location_of(&router, &uri).await;
        assert_eq!(status, StatusCode::FOUND);

        let (body, disposition) = backend.client().fetch(&location.unwrap()).unwrap();
        assert_eq!(body, b"payload");
        assert_eq!(disposition, format!("attachment; filename=\"{}\"", name));
    }
}
