//! OpenAPI/Utoipa configuration.

use crate::api::health::MISC_TAG;
use crate::engine::ENGINE_TAG;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ClientCredentials, Flow, HttpAuthScheme, HttpBuilder, OAuth2, Scopes, SecurityScheme},
};

/// Security addon for OpenAPI documentation.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    #[tracing::instrument(skip(self, openapi))]
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let bearer = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .description(Some(
                    "Access token obtained from the `/connect/token` endpoint.",
                ))
                .build();
            components.add_security_scheme("Authorization", SecurityScheme::Http(bearer));

            let oauth2 = OAuth2::new([Flow::ClientCredentials(ClientCredentials::new(
                "/connect/token",
                Scopes::from_iter([("api1", "My API")]),
            ))]);
            components.add_security_scheme("OAuth2", SecurityScheme::OAuth2(oauth2));
        }
    }
}

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "OIDC Authority",
        version = "1.0.0",
        description = "Token, discovery and key set endpoints of the authorization server."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = ENGINE_TAG, description = "OAuth2 / OpenID Connect endpoints")
    )
)]
pub struct ApiDoc;
