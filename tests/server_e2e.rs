use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use meme_captioner_rust::caption::{encode_jpeg, render_captions};
use meme_captioner_rust::{FontHandle, RenderConfig, ServerState, TemplateRegistry};
use tempfile::TempDir;

fn font() -> FontHandle {
    FontHandle::load(&Path::new(env!("CARGO_MANIFEST_DIR")).join("font.ttf")).expect("font")
}

fn write_template(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x / 4 % 256) as u8, (y / 3 % 256) as u8, 90, 255])
    });
    let path = dir.join(format!("{}.jpg", name));
    std::fs::write(&path, encode_jpeg(&image, 90).expect("encode")).expect("write");
    path
}

async fn start(dir: &TempDir) -> SocketAddr {
    let templates = TemplateRegistry::scan(dir.path()).expect("scan");
    let state = ServerState::new(templates, font(), RenderConfig::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        meme_captioner_rust::server::serve(listener, state)
            .await
            .expect("serve");
    });
    addr
}

fn expected_jpeg(template: &Path, top: &str, bottom: &str) -> Vec<u8> {
    let config = RenderConfig::default();
    let mut image = image::open(template).expect("open").to_rgba8();
    render_captions(&mut image, top, bottom, &font(), &config);
    encode_jpeg(&image, config.quality).expect("encode")
}

#[tokio::test]
async fn captions_known_template() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = write_template(dir.path(), "roll_safe", 800, 600);
    let addr = start(&dir).await;

    let response = reqwest::get(format!(
        "http://{}/roll_safe?top_text=hello_world&bottom_text=",
        addr
    ))
    .await
    .expect("request");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().expect("header"),
        "image/jpeg"
    );
    let length: usize = response.headers()["content-length"]
        .to_str()
        .expect("header")
        .parse()
        .expect("length");
    let body = response.bytes().await.expect("body");
    assert_eq!(body.len(), length);

    let decoded = image::load_from_memory(&body).expect("decode");
    assert_eq!((decoded.width(), decoded.height()), (800, 600));
    assert_eq!(body.as_ref(), expected_jpeg(&template, "HELLO WORLD", "").as_slice());
}

#[tokio::test]
async fn repeated_requests_are_byte_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_template(dir.path(), "doge", 400, 300);
    let addr = start(&dir).await;
    let url = format!("http://{}/doge?top_text=such_wow&bottom_text=very_rust", addr);

    let first = reqwest::get(&url).await.expect("request").bytes().await.expect("body");
    let second = reqwest::get(&url).await.expect("request").bytes().await.expect("body");
    assert_eq!(first, second);
}

#[tokio::test]
async fn percent_encoded_text_is_decoded_and_uppercased() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = write_template(dir.path(), "doge", 400, 300);
    let addr = start(&dir).await;

    let body = reqwest::get(format!(
        "http://{}/doge?top_text=ca%20va&bottom_text=%C3%A7a_marche",
        addr
    ))
    .await
    .expect("request")
    .bytes()
    .await
    .expect("body");
    assert_eq!(body.as_ref(), expected_jpeg(&template, "CA VA", "ÇA MARCHE").as_slice());
}

#[tokio::test]
async fn unknown_template_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_template(dir.path(), "roll_safe", 64, 64);
    let addr = start(&dir).await;

    let response = reqwest::get(format!(
        "http://{}/no_such_meme?top_text=&bottom_text=",
        addr
    ))
    .await
    .expect("request");
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .expect("header")
            .starts_with("text/plain")
    );
    let body = response.text().await.expect("body");
    assert_eq!(body, "404 not found\n\navailable templates:\nroll_safe\n");
}

#[tokio::test]
async fn multi_segment_paths_get_the_template_listing() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_template(dir.path(), "roll_safe", 64, 64);
    let addr = start(&dir).await;

    for path in ["a/b", "roll_safe/"] {
        let response = reqwest::get(format!("http://{}/{}?top_text=x", addr, path))
            .await
            .expect("request");
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND, "{}", path);
        let body = response.text().await.expect("body");
        assert_eq!(body, "404 not found\n\navailable templates:\nroll_safe\n", "{}", path);
    }
}

#[tokio::test]
async fn repeated_query_parameters_use_the_first_value() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = write_template(dir.path(), "doge", 400, 300);
    let addr = start(&dir).await;

    let response = reqwest::get(format!(
        "http://{}/doge?top_text=a&top_text=b&bottom_text=c&bottom_text=d",
        addr
    ))
    .await
    .expect("request");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body = response.bytes().await.expect("body");
    assert_eq!(body.as_ref(), expected_jpeg(&template, "A", "C").as_slice());
}

#[tokio::test]
async fn empty_captions_still_render_the_template() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = write_template(dir.path(), "roll_safe", 320, 240);
    let addr = start(&dir).await;

    let response = reqwest::get(format!("http://{}/roll_safe", addr))
        .await
        .expect("request");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body = response.bytes().await.expect("body");
    let decoded = image::load_from_memory(&body).expect("decode");
    assert_eq!((decoded.width(), decoded.height()), (320, 240));
    assert_eq!(body.as_ref(), expected_jpeg(&template, "", "").as_slice());
}

#[tokio::test]
async fn favicon_and_root_are_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_template(dir.path(), "roll_safe", 64, 64);
    let addr = start(&dir).await;

    let favicon = reqwest::get(format!("http://{}/favicon.ico", addr))
        .await
        .expect("request");
    assert_eq!(favicon.status(), reqwest::StatusCode::NOT_FOUND);
    assert!(favicon.bytes().await.expect("body").is_empty());

    let root = reqwest::get(format!("http://{}/", addr)).await.expect("request");
    assert_eq!(root.status(), reqwest::StatusCode::NOT_FOUND);
    assert!(root.text().await.expect("body").contains("roll_safe"));
}

#[tokio::test]
async fn corrupt_template_returns_server_error_and_keeps_serving() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_template(dir.path(), "roll_safe", 64, 64);
    std::fs::write(dir.path().join("broken.jpg"), b"not really a jpeg").expect("write");
    let addr = start(&dir).await;

    let broken = reqwest::get(format!("http://{}/broken?top_text=a", addr))
        .await
        .expect("request");
    assert_eq!(broken.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(broken.text().await.expect("body"), "500 internal server error\n");

    let ok = reqwest::get(format!("http://{}/roll_safe?top_text=a", addr))
        .await
        .expect("request");
    assert_eq!(ok.status(), reqwest::StatusCode::OK);
}
