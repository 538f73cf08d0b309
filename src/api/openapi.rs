use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use super::error::ErrorBody;
use super::handlers::{health, login, posts, register, users};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        register::register,
        login::login,
        users::read_me,
        users::read_user,
        posts::create_post,
        posts::read_post,
        posts::update_post,
        posts::delete_post,
    ),
    components(schemas(
        ErrorBody,
        health::Health,
        register::UserCreate,
        register::UserOut,
        login::LoginForm,
        login::TokenResponse,
        posts::PostCreate,
        posts::PostOut,
        posts::DeleteResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Service and database status"),
        (name = "users", description = "Registration, login and profiles"),
        (name = "posts", description = "Post CRUD")
    )
)]
struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    // Use Cargo.toml metadata instead of the utoipa defaults.
    doc.info.title = env!("CARGO_PKG_NAME").to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc.info.description = Some(env!("CARGO_PKG_DESCRIPTION").to_string());
    doc
}
