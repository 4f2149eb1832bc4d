//! Streaming page handler.

use std::convert::Infallible;
use std::sync::Arc;

use actix_web::http::{Method, header};
use actix_web::web::Bytes;
use actix_web::{HttpRequest, HttpResponse, web};
use futures_util::future::ready;
use futures_util::stream::{self, StreamExt};
use serde_json::json;
use tracing::warn;

use crate::domain::ports::RecordsQuery;
use crate::domain::{Error, Record, RecordView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

use super::document::{DocumentVariables, Language, SHELL_END, shell_scripts, shell_start};
use super::manifest::ChunkManifest;
use super::pages::Page;

/// Content type of rendered documents.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Shared state for document rendering.
#[derive(Clone)]
pub struct SsrState {
    manifest: Arc<ChunkManifest>,
    is_production: bool,
}

impl SsrState {
    /// Share `manifest` across workers.
    #[must_use]
    pub fn new(manifest: ChunkManifest, is_production: bool) -> Self {
        Self {
            manifest: Arc::new(manifest),
            is_production,
        }
    }

    /// The client bundle manifest.
    #[must_use]
    pub fn manifest(&self) -> &ChunkManifest {
        &self.manifest
    }
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

async fn page_records(page: Page, query: &dyn RecordsQuery) -> Vec<Record> {
    if page != Page::Records {
        return Vec::new();
    }
    query.list(RecordView::Latest).await.unwrap_or_else(|err| {
        warn!(error = %err, "rendering records page without records");
        Vec::new()
    })
}

/// Render a page, or redirect unknown paths to `/`.
///
/// Registered as the default service, so unknown API paths and non-GET
/// requests end here too; those get a JSON 404.
pub async fn render_page(
    req: HttpRequest,
    ssr: web::Data<SsrState>,
    http: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    let path = req.path();
    if is_api_path(path) || !matches!(*req.method(), Method::GET | Method::HEAD) {
        return Err(Error::not_found("Not found"));
    }
    let Some(page) = Page::from_path(path) else {
        return Ok(HttpResponse::Found()
            .insert_header((header::LOCATION, "/"))
            .finish());
    };

    let lang = Language::negotiate(&req);
    let vars = DocumentVariables {
        page_title: page.title(lang).to_owned(),
        page_description: page.description(lang).to_owned(),
        lang,
        is_production: ssr.is_production,
    };
    let head = shell_start(&vars, ssr.manifest());

    let manifest = Arc::clone(&ssr.manifest);
    let query = Arc::clone(&http.records_query);
    let page_path = path.to_owned();
    let body = async move {
        let records = page_records(page, query.as_ref()).await;
        let content = page.render(lang, &records);
        let mut initial = json!({
            "page": page,
            "path": page_path,
            "protected": page.is_protected(),
            "variables": vars,
        });
        if page == Page::Records {
            initial["records"] = json!(records);
        }
        let scripts = shell_scripts(&initial, &manifest);
        format!("{}{}", content.into_string(), scripts.into_string())
    };

    let chunks = stream::once(ready(head))
        .chain(stream::once(body))
        .chain(stream::once(ready(SHELL_END.to_owned())))
        .map(|chunk| Ok::<_, Infallible>(Bytes::from(chunk)));

    Ok(HttpResponse::Ok()
        .content_type(HTML_CONTENT_TYPE)
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(chunks))
}
