//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every JSON endpoint and the bearer token scheme used
//! by the authenticated ones. Swagger UI serves it in debug builds and the
//! `openapi-dump` binary prints it for external tooling.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{SecretStoreHealth, SecretStoreStatus};
use crate::domain::{Error, ErrorCode, Record, RecordId, RecordType, RecordView, UserProfile};
use crate::inbound::http::auth::{
    CurrentUserResponse, LoginRequest, MessageResponse, RegisterRequest, SessionResponse,
};
use crate::inbound::http::records::CreateRecordRequest;

/// Adds the bearer access token scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_owned());
        bearer.description =
            Some("Access token from POST /api/auth/login or /api/auth/refresh.".to_owned());
        components.add_security_scheme("AccessToken", SecurityScheme::Http(bearer));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "recordkeeper API",
        description = "Authentication and append-only record versioning."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("AccessToken" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::refresh,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::records::list_records,
        crate::inbound::http::records::create_record,
        crate::inbound::http::records::latest_record,
        crate::inbound::http::records::record_history,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::health::secrets,
    ),
    components(schemas(
        Error,
        ErrorCode,
        UserProfile,
        RegisterRequest,
        LoginRequest,
        SessionResponse,
        MessageResponse,
        CurrentUserResponse,
        Record,
        RecordId,
        RecordType,
        RecordView,
        CreateRecordRequest,
        SecretStoreHealth,
        SecretStoreStatus,
    )),
    tags(
        (name = "auth", description = "Registration, sessions and tokens"),
        (name = "records", description = "Append-only record versions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_fields(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(name).expect("schema registered") {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected object schema for {name}"),
        }
    }

    #[rstest]
    #[case("Error", &["code", "message"])]
    #[case("Record", &["_id", "recordId", "type", "createdAt"])]
    #[case("SessionResponse", &["accessToken", "user"])]
    #[case("CreateRecordRequest", &["type", "recordId", "description"])]
    fn schemas_expose_wire_field_names(#[case] name: &str, #[case] fields: &[&str]) {
        let present = object_fields(name);
        for field in fields {
            assert!(present.iter().any(|p| p == field), "{name} lacks {field}");
        }
    }

    #[rstest]
    #[case("/api/auth/register")]
    #[case("/api/records/{record_id}/all")]
    #[case("/health/secrets")]
    fn paths_are_documented(#[case] path: &str) {
        assert!(ApiDoc::openapi().paths.paths.contains_key(path));
    }
}
