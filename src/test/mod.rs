use std::path::Path;
use std::sync::Arc;

use actix_web::{
    dev::ServiceResponse,
    http::{header, StatusCode},
    test, web, App,
};

use crate::modules::{
    self,
    image::{ImageRepositoryFs, ImageService, UploadConfig},
};

const BOUNDARY: &str = "----codeimagestore7MA4YWxkTrZu0gW";

enum Part<'a> {
    File { name: &'a str, filename: &'a str, content_type: &'a str, bytes: &'a [u8] },
    Text { name: &'a str, value: &'a str },
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File { name, filename, content_type, bytes } => {
                let headers = format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: {content_type}\r\n\r\n"
                );
                body.extend_from_slice(headers.as_bytes());
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                let text =
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}");
                body.extend_from_slice(text.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(uri: &str, parts: &[Part]) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}")))
        .set_payload(multipart_body(parts))
}

fn image<'a>(filename: &'a str, content_type: &'a str, bytes: &'a [u8]) -> Part<'a> {
    Part::File { name: "image", filename, content_type, bytes }
}

fn code(value: &str) -> Part<'_> {
    Part::Text { name: "code", value }
}

fn service_for(dir: &Path, max_file_size: usize) -> ImageService<ImageRepositoryFs> {
    let config = UploadConfig {
        max_file_size,
        upload_dir: dir.display().to_string(),
        ..UploadConfig::default()
    };
    ImageService::new(Arc::new(ImageRepositoryFs::from_config(&config)), config)
}

macro_rules! init_app {
    ($service:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($service))
                .configure(modules::configure::<ImageRepositoryFs>),
        )
        .await
    };
}

fn stored_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

async fn error_message(resp: ServiceResponse) -> String {
    let body: serde_json::Value = test::read_body_json(resp).await;
    body["error"].as_str().unwrap_or_default().to_string()
}

#[actix_web::test]
async fn replace_scenario_swaps_jpeg_for_png() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(service_for(dir.path(), 5 * 1024 * 1024));

    let req = upload_request(
        "/api/upload",
        &[image("cat.jpg", "image/jpeg", b"jpeg"), code("0007")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "0007");
    assert_eq!(body["imageUrl"], "/uploads/image-0007.jpg");
    assert!(body["uploadedAt"].is_string());

    // code part first this time
    let req = upload_request(
        "/api/upload",
        &[code("0007"), image("cat.png", "image/png", b"png")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["imageUrl"], "/uploads/image-0007.png");

    assert_eq!(stored_files(dir.path()), vec!["image-0007.png"]);

    let req = test::TestRequest::get().uri("/api/images/0007").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["code"], "0007");
    assert_eq!(body["imageUrl"], "/uploads/image-0007.png");

    let req = test::TestRequest::get().uri("/uploads/image-0007.png").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
    assert_eq!(test::read_body(resp).await.as_ref(), b"png");
}

#[actix_web::test]
async fn invalid_codes_are_rejected_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(service_for(dir.path(), 1024));

    for bad in ["12a4", "123", "12345", ""] {
        let req = upload_request(
            "/api/upload",
            &[image("a.png", "image/png", b"png"), code(bad)],
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "code {bad:?}");
        assert_eq!(error_message(resp).await, "A valid 4-digit code is required");
    }

    let req = upload_request("/api/upload", &[image("a.png", "image/png", b"png")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert!(stored_files(dir.path()).is_empty());
}

#[actix_web::test]
async fn non_image_and_missing_file_are_bad_requests() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(service_for(dir.path(), 1024));

    let req = upload_request(
        "/api/upload",
        &[image("notes.txt", "text/plain", b"hello"), code("1234")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Only image files are allowed!");

    let req = upload_request("/api/upload/auto", &[code("1234")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "No image file provided");

    assert!(stored_files(dir.path()).is_empty());
}

#[actix_web::test]
async fn oversized_upload_is_payload_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(service_for(dir.path(), 16));
    let big = [7u8; 17];

    let req = upload_request(
        "/api/upload",
        &[code("1234"), image("big.png", "image/png", &big)],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let req = upload_request(
        "/api/upload/auto",
        &[image("big.png", "image/png", &big)],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    assert!(stored_files(dir.path()).is_empty());
}

#[actix_web::test]
async fn upload_of_exactly_the_limit_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(service_for(dir.path(), 16));
    let exact = [7u8; 16];

    let req = upload_request(
        "/api/upload",
        &[code("1600"), image("edge.png", "image/png", &exact)],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(stored_files(dir.path()), vec!["image-1600.png"]);
    assert_eq!(std::fs::read(dir.path().join("image-1600.png")).unwrap(), exact);
}

#[actix_web::test]
async fn auto_upload_returns_generated_code() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(service_for(dir.path(), 1024));

    let req = upload_request(
        "/api/upload/auto",
        &[image("pic.webp", "image/webp", b"webp")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;

    let generated = body["code"].as_str().unwrap();
    assert_eq!(generated.len(), 4);
    assert!(generated.bytes().all(|b| b.is_ascii_digit()));
    assert!((1000..=9999).contains(&generated.parse::<u16>().unwrap()));
    assert_eq!(body["imageUrl"], format!("/uploads/image-{generated}.webp"));
    assert_eq!(stored_files(dir.path()), vec![format!("image-{generated}.webp")]);
}

#[actix_web::test]
async fn lookup_validates_and_reports_missing() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(service_for(dir.path(), 1024));

    let req = test::TestRequest::get().uri("/api/images/12a4").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/api/images/0042").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Image not found");

    let req = test::TestRequest::get().uri("/uploads/image-0042.png").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn listing_grows_with_distinct_codes() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(service_for(dir.path(), 1024));

    let req = test::TestRequest::get().uri("/api/images").to_request();
    let body: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
    assert!(body.is_empty());

    for c in ["0001", "0420", "9000"] {
        let req = upload_request(
            "/api/upload",
            &[image("a.gif", "image/gif", b"gif"), code(c)],
        )
        .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get().uri("/api/images").to_request();
    let body: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
    let mut codes: Vec<&str> = body.iter().map(|i| i["code"].as_str().unwrap()).collect();
    codes.sort();
    assert_eq!(codes, vec!["0001", "0420", "9000"]);
    assert!(body.iter().all(|i| i["uploadedAt"].is_string()));
}

#[actix_web::test]
async fn files_from_before_restart_have_no_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("image-3141.jpg"), b"old").unwrap();
    let app = init_app!(service_for(dir.path(), 1024));

    let req = test::TestRequest::get().uri("/api/images/3141").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["imageUrl"], "/uploads/image-3141.jpg");
    assert!(body["uploadedAt"].is_null());
}

#[actix_web::test]
async fn unreadable_directory_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(service_for(&dir.path().join("gone"), 1024));

    let req = test::TestRequest::get().uri("/api/images").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let message = error_message(resp).await;
    assert_eq!(message, "Failed to read images directory");
    assert!(!message.contains("gone"));
}

#[actix_web::test]
async fn landing_page_is_html() {
    let dir = tempfile::tempdir().unwrap();
    let app = init_app!(service_for(dir.path(), 1024));

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}
