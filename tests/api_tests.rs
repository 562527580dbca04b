//! API integration tests
//!
//! These run against a live server with Postgres and Redis, plus a seeded
//! superuser account (admin@biblio.local / Admin123!).
//! Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

const ADMIN_EMAIL: &str = "admin@biblio.local";
const ADMIN_PASSWORD: &str = "Admin123!";

/// Unique suffix so repeated runs do not collide on unique columns
fn unique() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
        .to_string()
}

async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    assert!(response.status().is_success(), "login failed for {}", email);

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["access"]
        .as_str()
        .expect("No access token in response")
        .to_string()
}

async fn admin_token(client: &Client) -> String {
    login(client, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

/// Register a fresh member account and return (email, access token)
async fn new_member(client: &Client) -> (String, String) {
    let email = format!("member{}@example.org", unique());

    let response = client
        .post(format!("{}/signup", BASE_URL))
        .json(&json!({
            "email": email,
            "first_name": "Test",
            "last_name": "Member",
            "password": "Abcdef1!",
            "password2": "Abcdef1!"
        }))
        .send()
        .await
        .expect("Failed to send signup request");

    assert_eq!(response.status(), 201);

    let token = login(client, &email, "Abcdef1!").await;
    (email, token)
}

/// Create a publisher, an author and a book; returns the book id
async fn create_book(client: &Client, admin: &str) -> i64 {
    let response = client
        .post(format!("{}/publishers", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "name": "Test Press" }))
        .send()
        .await
        .expect("Failed to create publisher");
    assert_eq!(response.status(), 201);
    let publisher: Value = response.json().await.expect("Failed to parse publisher");

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "name": "Test Author", "year_born": 1970 }))
        .send()
        .await
        .expect("Failed to create author");
    assert_eq!(response.status(), 201);
    let author: Value = response.json().await.expect("Failed to parse author");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({
            "isbn": unique(),
            "title": "A Test Book",
            "year_published": 2001,
            "publisher_id": publisher["id"],
            "author_ids": [author["id"]]
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse book");
    body["id"].as_i64().expect("No book ID")
}

async fn reserve(client: &Client, token: &str, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/books/{}/reserver", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send reserve request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_welcome_at_root() {
    let client = Client::new();

    let response = client
        .get("http://localhost:8080/")
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["message"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_signup_rejects_weak_password() {
    let client = Client::new();

    let response = client
        .post(format!("{}/signup", BASE_URL))
        .json(&json!({
            "email": format!("weak{}@example.org", unique()),
            "first_name": "Weak",
            "last_name": "Password",
            "password": "abc",
            "password2": "abc"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
#[ignore]
async fn test_signup_rejects_password_mismatch() {
    let client = Client::new();

    let response = client
        .post(format!("{}/signup", BASE_URL))
        .json(&json!({
            "email": format!("mismatch{}@example.org", unique()),
            "first_name": "Mis",
            "last_name": "Match",
            "password": "Abcdef1!",
            "password2": "Abcdef2!"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_login_sets_refresh_cookie() {
    let client = Client::new();
    let (email, _) = new_member(&client).await;

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "Abcdef1!"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("No Set-Cookie header")
        .to_str()
        .expect("Invalid Set-Cookie header")
        .to_string();
    assert!(cookie.starts_with("refresh_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["access"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let (email, _) = new_member(&client).await;

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "Wrong-password1"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_refresh_access() {
    let client = Client::new();
    let (email, _) = new_member(&client).await;

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "Abcdef1!"
        }))
        .send()
        .await
        .expect("Failed to send request");

    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("No Set-Cookie header")
        .to_str()
        .expect("Invalid Set-Cookie header")
        .split(';')
        .next()
        .expect("Empty cookie")
        .to_string();

    let response = client
        .post(format!("{}/token/refresh-access", BASE_URL))
        .header("Cookie", cookie)
        .send()
        .await
        .expect("Failed to send refresh request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["access"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_refresh_without_cookie_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/token/refresh-access", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let (email, token) = new_member(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"].as_str(), Some(email.as_str()));
    assert!(body["password"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_list_books_is_public() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let cache_control = response
        .headers()
        .get("cache-control")
        .expect("No Cache-Control header")
        .to_str()
        .expect("Invalid Cache-Control header");
    assert!(cache_control.starts_with("public"));

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"].is_array());
    assert_eq!(body["reserved_books_by_user"], json!([]));
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_rejected() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let response = client
        .post(format!("{}/publishers", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "name": "Dup Press" }))
        .send()
        .await
        .expect("Failed to create publisher");
    assert_eq!(response.status(), 201);
    let publisher: Value = response.json().await.expect("Failed to parse publisher");

    let isbn = unique();
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({
            "isbn": isbn,
            "title": "First Edition",
            "year_published": 1999,
            "publisher_id": publisher["id"]
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);

    // Same ISBN again
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({
            "isbn": isbn,
            "title": "Second Edition",
            "year_published": 2000,
            "publisher_id": publisher["id"]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_rejected() {
    let client = Client::new();
    let (email, _) = new_member(&client).await;

    let response = client
        .post(format!("{}/signup", BASE_URL))
        .json(&json!({
            "email": email,
            "first_name": "Second",
            "last_name": "Member",
            "password": "Abcdef1!",
            "password2": "Abcdef1!"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_create_book() {
    let client = Client::new();
    let (_, token) = new_member(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "isbn": unique(),
            "title": "Forbidden",
            "year_published": 2000,
            "publisher_id": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_author_books_listing() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let book: Value = response.json().await.expect("Failed to parse book");
    let author_id = book["authors"][0]["id"].as_i64().expect("No author");

    let response = client
        .get(format!("{}/authors/{}/livres", BASE_URL, author_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["author"]["id"].as_i64(), Some(author_id));
    assert!(body["books"]
        .as_array()
        .expect("books not an array")
        .iter()
        .any(|b| b["id"].as_i64() == Some(book_id)));
}

#[tokio::test]
#[ignore]
async fn test_reservation_conflict_and_release() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;

    let (_, alice) = new_member(&client).await;
    let (_, carol) = new_member(&client).await;

    // Alice reserves the book
    let response = reserve(&client, &alice, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let reservation_id = body["id"].as_i64().expect("No reservation ID");

    // Carol cannot reserve it while Alice holds it
    let response = reserve(&client, &carol, book_id).await;
    assert_eq!(response.status(), 400);

    // Alice returns the book
    let response = client
        .post(format!("{}/reservations/{}/return", BASE_URL, reservation_id))
        .header("Authorization", format!("Bearer {}", alice))
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(!body["returned_at"].is_null());

    // Now Carol can reserve it
    let response = reserve(&client, &carol, book_id).await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_return_twice_rejected() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;
    let (_, token) = new_member(&client).await;

    let response = reserve(&client, &token, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let reservation_id = body["id"].as_i64().expect("No reservation ID");

    let url = format!("{}/reservations/{}/return", BASE_URL, reservation_id);
    let response = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success());

    let response = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send second return request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_reservation_quota() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (_, token) = new_member(&client).await;

    let mut book_ids = Vec::new();
    for _ in 0..4 {
        book_ids.push(create_book(&client, &admin).await);
    }

    // Three reservations succeed
    let mut first_reservation = 0;
    for (i, book_id) in book_ids[..3].iter().enumerate() {
        let response = reserve(&client, &token, *book_id).await;
        assert_eq!(response.status(), 201);
        if i == 0 {
            let body: Value = response.json().await.expect("Failed to parse response");
            first_reservation = body["id"].as_i64().expect("No reservation ID");
        }
    }

    // The fourth is over quota
    let response = reserve(&client, &token, book_ids[3]).await;
    assert_eq!(response.status(), 400);

    // Returning one frees a slot
    let response = client
        .post(format!("{}/reservations/{}/return", BASE_URL, first_reservation))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success());

    let response = reserve(&client, &token, book_ids[3]).await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_reservation_ownership() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;

    let (_, alice) = new_member(&client).await;
    let (_, bob) = new_member(&client).await;

    let response = reserve(&client, &alice, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let reservation_id = body["id"].as_i64().expect("No reservation ID");

    // Bob cannot return Alice's reservation
    let response = client
        .post(format!("{}/reservations/{}/return", BASE_URL, reservation_id))
        .header("Authorization", format!("Bearer {}", bob))
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(response.status(), 403);

    // Nor cancel it
    let response = client
        .delete(format!("{}/reservations/{}", BASE_URL, reservation_id))
        .header("Authorization", format!("Bearer {}", bob))
        .send()
        .await
        .expect("Failed to send cancel request");
    assert_eq!(response.status(), 403);

    // The superuser can
    let response = client
        .post(format!("{}/reservations/{}/return", BASE_URL, reservation_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_my_reservations_reflects_cancellation() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;
    let (_, token) = new_member(&client).await;

    let response = reserve(&client, &token, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let reservation_id = body["id"].as_i64().expect("No reservation ID");

    // Warm the cached listing
    let response = client
        .get(format!("{}/my-reservations", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["reservations"].as_array().map(Vec::len), Some(1));

    // Cancel and check the listing no longer shows it
    let response = client
        .delete(format!("{}/reservations/{}", BASE_URL, reservation_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send cancel request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/my-reservations", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["reservations"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore]
async fn test_list_users_requires_staff() {
    let client = Client::new();
    let (_, token) = new_member(&client).await;

    let response = client
        .get(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_reservation_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/my-reservations", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}
