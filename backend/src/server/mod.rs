//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::{build_adapters, build_http_state};

use std::path::PathBuf;

use actix_files::{Files, NamedFile};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use recordkeeper::Trace;
#[cfg(debug_assertions)]
use recordkeeper::doc::ApiDoc;
use recordkeeper::inbound::http::auth::{login, logout, me, refresh, register};
use recordkeeper::inbound::http::health::{HealthState, live, ready, secrets};
use recordkeeper::inbound::http::records::{
    create_record, latest_record, list_records, record_history,
};
use recordkeeper::inbound::http::state::HttpState;
use recordkeeper::inbound::http::validation::{json_config, query_config};
use recordkeeper::inbound::ssr::{FALLBACK_BUNDLE, SsrState, render_page};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Where the client bundle lives on disk.
#[derive(Clone)]
struct ClientDir(PathBuf);

/// Serve the single-file bundle referenced when no manifest is present.
async fn fallback_bundle(dir: web::Data<ClientDir>) -> actix_web::Result<NamedFile> {
    let name = FALLBACK_BUNDLE.trim_start_matches('/');
    Ok(NamedFile::open_async(dir.0.join(name)).await?)
}

struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ssr_state: web::Data<SsrState>,
    client_dir: PathBuf,
    assets_dir: PathBuf,
    session: SessionMiddleware<CookieSessionStore>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ssr_state,
        client_dir,
        assets_dir,
        session,
    } = deps;

    let api = web::scope("/api")
        .wrap(session)
        .service(register)
        .service(login)
        .service(refresh)
        .service(logout)
        .service(me)
        .service(list_records)
        .service(create_record)
        .service(record_history)
        .service(latest_record);

    let base = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ssr_state)
        .app_data(web::Data::new(ClientDir(client_dir.clone())))
        .app_data(json_config())
        .app_data(query_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live)
        .service(secrets);

    #[cfg(debug_assertions)]
    let app = base.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = base;

    app.service(Files::new("/client", client_dir))
        .service(Files::new("/assets", assets_dir))
        .route(FALLBACK_BUNDLE, web::get().to(fallback_bundle))
        .default_service(web::to(render_page))
}

/// Construct an Actix HTTP server using the provided states and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    ssr_state: SsrState,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let shared_http = web::Data::new(http_state);
    let shared_ssr = web::Data::new(ssr_state);
    let ServerConfig {
        session,
        bind_addr,
        client_dir,
        assets_dir,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: shared_http.clone(),
            ssr_state: shared_ssr.clone(),
            client_dir: client_dir.clone(),
            assets_dir: assets_dir.clone(),
            session: session.middleware(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
