//! Server-rendered pages served by the default service next to the API.

#[expect(dead_code, reason = "pages are checked without cookies or error bodies")]
mod support;

use std::io::Write;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use recordkeeper::inbound::http::validation::{json_config, query_config};
use recordkeeper::inbound::ssr::{
    ChunkManifest, FALLBACK_BUNDLE, INITIAL_DATA_ID, SsrState, render_page,
};
use serde_json::{Value, json};
use support::{api_routes, memory_state};
use tempfile::NamedTempFile;

const STATS: &str = r#"{
    "hash": "4f1c2e",
    "publicPath": "/client/",
    "namedChunkGroups": {
        "main": {
            "assets": [
                { "name": "main.4f1c2e.js", "size": 5120 },
                { "name": "main.4f1c2e.css", "size": 900 },
                { "name": "vendors.4f1c2e.js", "size": 81920 }
            ]
        }
    }
}"#;

async fn app(
    manifest: ChunkManifest,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(memory_state()))
            .app_data(web::Data::new(SsrState::new(manifest, true)))
            .app_data(json_config())
            .app_data(query_config())
            .configure(api_routes)
            .default_service(web::to(render_page)),
    )
    .await
}

fn built_manifest() -> ChunkManifest {
    ChunkManifest::from_json(STATS, false).expect("valid stats")
}

async fn page(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    req: test::TestRequest,
) -> (StatusCode, String) {
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}

fn initial_data(html: &str) -> Value {
    let open = format!("<script id=\"{INITIAL_DATA_ID}\" type=\"application/json\">");
    let start = html.find(&open).map(|i| i + open.len()).expect("initial data script");
    let rest = html.get(start..).expect("script body");
    let end = rest.find("</script>").expect("closing script tag");
    serde_json::from_str(rest.get(..end).expect("json")).expect("initial data is JSON")
}

#[actix_web::test]
async fn records_page_shows_versions_created_through_the_api() {
    let app = app(built_manifest()).await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/records")
            .set_json(json!({ "type": "NEW", "description": "<b>first</b>" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(res).await;

    let (status, html) = page(&app, test::TestRequest::get().uri("/records")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.ends_with("</html>"));
    assert!(html.contains("<title>Records</title>"));
    assert!(html.contains("&lt;b&gt;first&lt;/b&gt;"));
    assert!(!html.contains("<b>first</b>"));
    let data = initial_data(&html);
    assert_eq!(data["page"], "records");
    assert_eq!(data["records"][0]["recordId"], created["recordId"]);
    assert_eq!(data["variables"]["isProduction"], true);
}

#[actix_web::test]
async fn bundle_assets_are_linked_in_load_order() {
    let app = app(built_manifest()).await;
    let (_, html) = page(&app, test::TestRequest::get().uri("/")).await;

    assert!(html.contains(r#"<link rel="stylesheet" href="/client/main.4f1c2e.css">"#));
    let vendors = html
        .find(r#"<script src="/client/vendors.4f1c2e.js" defer>"#)
        .expect("vendors script");
    let main = html
        .find(r#"<script src="/client/main.4f1c2e.js" defer>"#)
        .expect("main script");
    assert!(vendors < main);
}

#[actix_web::test]
async fn language_follows_cookie_then_accept_language() {
    let app = app(built_manifest()).await;

    let (_, french) = page(
        &app,
        test::TestRequest::get()
            .uri("/records")
            .insert_header((header::ACCEPT_LANGUAGE, "fr-FR,fr;q=0.9")),
    )
    .await;
    assert!(french.contains(r#"<html lang="fr">"#));
    assert!(french.contains("<title>Enregistrements</title>"));

    let (_, english) = page(
        &app,
        test::TestRequest::get()
            .uri("/records")
            .insert_header((header::ACCEPT_LANGUAGE, "fr"))
            .cookie(actix_web::cookie::Cookie::new("lang", "en")),
    )
    .await;
    assert!(english.contains(r#"<html lang="en">"#));
}

#[actix_web::test]
async fn unknown_routes_redirect_but_unknown_api_paths_do_not() {
    let app = app(built_manifest()).await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/nowhere").to_request()).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/")
    );

    let res = test::call_service(&app, test::TestRequest::get().uri("/api/nowhere").to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "not_found");
}

#[actix_web::test]
async fn missing_stats_file_falls_back_to_single_bundle() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manifest = ChunkManifest::load_or_fallback(&dir.path().join("stats.json"), false);
    assert_eq!(manifest.bootstrap_scripts(), [FALLBACK_BUNDLE]);

    let app = app(manifest).await;
    let (status, html) = page(&app, test::TestRequest::get().uri("/login")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(&format!(r#"<script src="{FALLBACK_BUNDLE}" defer>"#)));
}

#[actix_web::test]
async fn stats_file_on_disk_is_loaded() {
    let mut file = NamedTempFile::new().expect("stats file");
    file.write_all(STATS.as_bytes()).expect("write stats");

    let manifest = ChunkManifest::load(file.path(), true).expect("stats parse");
    assert_eq!(manifest.hash(), Some("4f1c2e"));
    assert_eq!(
        manifest.source_map_assets(),
        ["/client/main.4f1c2e.js.map", "/client/vendors.4f1c2e.js.map"]
    );
}
