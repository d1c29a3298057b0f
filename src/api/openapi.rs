//! OpenAPI documentation

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, loans, stats, users};

/// Registers the bearer JWT scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Librarium API",
        version = "1.0.0",
        description = "Library circulation REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::list_categories,
        books::get_book,
        books::book_loan_history,
        books::create_book,
        // Loans
        loans::borrow_book,
        loans::my_loans,
        loans::return_loan,
        // Stats
        stats::get_summary,
        stats::get_dashboard,
        // Users
        users::list_users,
        users::deactivate_user,
    ),
    components(
        schemas(
            auth::LoginRequest,
            auth::LoginResponse,
            crate::models::user::User,
            crate::models::user::RegisterUser,
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::PopularBook,
            crate::models::loan::Loan,
            crate::models::loan::LoanView,
            crate::models::loan::LoanHistoryEntry,
            crate::models::loan::LoanDetails,
            crate::models::loan::ReturnedLoan,
            crate::models::stats::LibraryCounts,
            crate::models::stats::LibrarySummary,
            crate::models::stats::Dashboard,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and authentication"),
        (name = "books", description = "Catalog browsing and management"),
        (name = "loans", description = "Borrowing and returning"),
        (name = "stats", description = "Statistics"),
        (name = "users", description = "User administration")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
