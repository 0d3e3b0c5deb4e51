mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};

use common::{test_password, TestContext};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[tokio::test]
async fn photo_upload_round_trips_through_static_serving() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;

    let form = MultipartForm::new().add_part(
        "photo",
        Part::bytes(PNG_BYTES.to_vec())
            .file_name("garage.png")
            .mime_type("image/png"),
    );
    let response = ctx
        .server
        .post("/api/upload/photo")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let photo_url = body["photo_url"].as_str().unwrap();
    assert!(photo_url.starts_with("/uploads/"));
    assert!(photo_url.ends_with("garage.png"));

    // The stored file is served back from the uploads tree.
    let served = ctx.server.get(photo_url).await;
    served.assert_status_ok();
    assert_eq!(&served.as_bytes()[..], PNG_BYTES);
}

#[tokio::test]
async fn photo_upload_rejects_non_image_files() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;

    let form = MultipartForm::new().add_part(
        "photo",
        Part::bytes(b"#!/bin/sh".to_vec())
            .file_name("script.sh")
            .mime_type("text/x-sh"),
    );
    let response = ctx
        .server
        .post("/api/upload/photo")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn attachment_upload_and_download() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;

    let form = MultipartForm::new().add_part(
        "attachment",
        Part::bytes(b"%PDF-1.4 receipt".to_vec())
            .file_name("receipt.pdf")
            .mime_type("application/pdf"),
    );
    let response = ctx
        .server
        .post("/api/upload/attachment")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let file_path = body["file_path"].as_str().unwrap().to_string();
    assert!(file_path.starts_with("attachments/"));

    let download = ctx
        .server
        .get(&format!("/api/attachments/download?path={file_path}"))
        .authorization_bearer(&token)
        .await;
    download.assert_status_ok();
    assert_eq!(&download.as_bytes()[..], b"%PDF-1.4 receipt");
}

#[tokio::test]
async fn download_rejects_paths_outside_the_uploads_root() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;

    let response = ctx
        .server
        .get("/api/attachments/download?path=../data/garagekeep.db")
        .authorization_bearer(&token)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn uploaded_filenames_are_sanitized() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice", test_password()).await;

    let form = MultipartForm::new().add_part(
        "photo",
        Part::bytes(PNG_BYTES.to_vec())
            .file_name("../../escape.png")
            .mime_type("image/png"),
    );
    let response = ctx
        .server
        .post("/api/upload/photo")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let photo_url = body["photo_url"].as_str().unwrap();
    assert!(!photo_url.contains(".."));
    assert!(photo_url.ends_with("escape.png"));
}
