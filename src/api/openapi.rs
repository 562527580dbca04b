//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, health, publishers, reservations, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblio API",
        version = "1.0.0",
        description = "Online Library Catalogue and Reservation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::signup,
        auth::login,
        auth::logout,
        auth::issue_token,
        auth::refresh_access,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::reserve_book,
        books::upload_cover,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::list_author_books,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Publishers
        publishers::list_publishers,
        publishers::get_publisher,
        publishers::create_publisher,
        publishers::update_publisher,
        publishers::delete_publisher,
        // Reservations
        reservations::my_reservations,
        reservations::list_reservations,
        reservations::get_reservation,
        reservations::create_reservation,
        reservations::return_reservation,
        reservations::cancel_reservation,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::TokenResponse,
            auth::AccessResponse,
            auth::MessageResponse,
            // Books
            books::BooksResponse,
            books::CoverResponse,
            crate::models::title::Title,
            crate::models::title::TitleDetails,
            crate::models::title::CreateTitle,
            crate::models::title::UpdateTitle,
            // Authors
            authors::AuthorsResponse,
            authors::AuthorBooksResponse,
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            // Publishers
            publishers::PublishersResponse,
            crate::models::publisher::Publisher,
            crate::models::publisher::CreatePublisher,
            crate::models::publisher::UpdatePublisher,
            // Reservations
            reservations::ReservationsResponse,
            reservations::CancelResponse,
            crate::models::reservation::Reservation,
            crate::models::reservation::ReservationDetails,
            crate::models::reservation::CreateReservation,
            // Users
            crate::models::user::User,
            crate::models::user::Signup,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and registration"),
        (name = "books", description = "Catalogue titles and reservation action"),
        (name = "authors", description = "Author catalogue"),
        (name = "publishers", description = "Publisher catalogue"),
        (name = "reservations", description = "Reservation lifecycle"),
        (name = "users", description = "Account administration")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
