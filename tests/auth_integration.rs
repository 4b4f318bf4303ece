mod common;

use common::{cookie_value, cookies, pair_cookies, set_cookie, spawn_app, TEST_PASSWORD};
use expense_tracker::store::{Role, UserStore};
use serde_json::{json, Value};

fn registration(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "password": TEST_PASSWORD,
    })
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn register_returns_200_for_valid_data() {
    let app = spawn_app().await;

    let response = app
        .post_json("/api/register", &registration("mario", "mario@example.com"), None)
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["message"], "User added successfully");

    let saved = app
        .store
        .find_user_by_username("mario")
        .await
        .unwrap()
        .expect("user saved");
    assert_eq!(saved.email, "mario@example.com");
    assert_eq!(saved.role, Role::Regular);
    assert_ne!(saved.password_hash, TEST_PASSWORD);
    assert!(saved.refresh_token.is_none());
}

#[tokio::test]
async fn register_returns_400_for_invalid_data() {
    let app = spawn_app().await;
    let test_cases = vec![
        (registration("mario", "not-an-email"), "invalid email"),
        (registration("m", "mario@example.com"), "username too short"),
        (
            json!({ "username": "mario", "email": "mario@example.com", "password": "weak" }),
            "weak password",
        ),
    ];

    for (body, description) in test_cases {
        let response = app.post_json("/api/register", &body, None).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 when the payload had {}.",
            description
        );
    }
}

#[tokio::test]
async fn register_returns_409_for_duplicate_user() {
    let app = spawn_app().await;
    app.post_json("/api/register", &registration("mario", "mario@example.com"), None)
        .await;

    let response = app
        .post_json("/api/register", &registration("mario", "other@example.com"), None)
        .await;

    assert_eq!(409, response.status().as_u16());
}

#[tokio::test]
async fn register_admin_requires_admin() {
    let app = spawn_app().await;
    let mario = app.seed_user("mario", "m@example.com", Role::Regular).await;
    let peach = app.seed_user("peach", "p@example.com", Role::Admin).await;

    let response = app
        .post_json(
            "/api/admin",
            &registration("daisy", "d@example.com"),
            pair_cookies(&app.issue(&mario)),
        )
        .await;
    assert_eq!(401, response.status().as_u16());

    let response = app
        .post_json(
            "/api/admin",
            &registration("daisy", "d@example.com"),
            pair_cookies(&app.issue(&peach)),
        )
        .await;
    assert_eq!(200, response.status().as_u16());

    let daisy = app
        .store
        .find_user_by_username("daisy")
        .await
        .unwrap()
        .expect("admin saved");
    assert_eq!(daisy.role, Role::Admin);
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn login_sets_token_cookies_and_stores_refresh_token() {
    let app = spawn_app().await;
    app.seed_user("mario", "mario@example.com", Role::Regular).await;

    let response = app
        .post_json(
            "/api/login",
            &json!({ "email": "mario@example.com", "password": TEST_PASSWORD }),
            None,
        )
        .await;

    assert_eq!(200, response.status().as_u16());

    let access_cookie = set_cookie(&response, "accessToken").expect("access cookie");
    let refresh_cookie = set_cookie(&response, "refreshToken").expect("refresh cookie");
    for cookie in [&access_cookie, &refresh_cookie] {
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Path=/api"));
    }
    assert!(access_cookie.contains("Max-Age=3600"));
    assert!(refresh_cookie.contains("Max-Age=604800"));

    let body: Value = response.json().await.unwrap();
    let refresh_token = body["data"]["refreshToken"].as_str().unwrap();
    assert_eq!(body["data"]["accessToken"], cookie_value(&access_cookie));
    assert_eq!(refresh_token, cookie_value(&refresh_cookie));

    let saved = app
        .store
        .find_user_by_email("mario@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.refresh_token.as_deref(), Some(refresh_token));
}

#[tokio::test]
async fn login_tokens_grant_access() {
    let app = spawn_app().await;
    app.seed_user("mario", "mario@example.com", Role::Regular).await;

    let response = app
        .post_json(
            "/api/login",
            &json!({ "email": "mario@example.com", "password": TEST_PASSWORD }),
            None,
        )
        .await;
    let body: Value = response.json().await.unwrap();
    let access = body["data"]["accessToken"].as_str().unwrap();
    let refresh = body["data"]["refreshToken"].as_str().unwrap();

    let response = app.get("/api/users/mario", cookies(access, refresh)).await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = spawn_app().await;
    app.seed_user("mario", "mario@example.com", Role::Regular).await;

    let test_cases = vec![
        json!({ "email": "mario@example.com", "password": "WrongPass123" }),
        json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }),
    ];

    for body in test_cases {
        let response = app.post_json("/api/login", &body, None).await;

        assert_eq!(401, response.status().as_u16());
        assert!(set_cookie(&response, "accessToken").is_none());
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Invalid email or password");
    }
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn logout_clears_refresh_token_and_cookies() {
    let app = spawn_app().await;
    app.seed_user("mario", "mario@example.com", Role::Regular).await;

    let response = app
        .post_json(
            "/api/login",
            &json!({ "email": "mario@example.com", "password": TEST_PASSWORD }),
            None,
        )
        .await;
    let body: Value = response.json().await.unwrap();
    let refresh = body["data"]["refreshToken"].as_str().unwrap().to_string();
    let refresh_cookie = Some(format!("refreshToken={}", refresh));

    let response = app.get("/api/logout", refresh_cookie.clone()).await;

    assert_eq!(200, response.status().as_u16());
    for name in ["accessToken", "refreshToken"] {
        let cookie = set_cookie(&response, name).expect("removal cookie");
        assert!(cookie.contains("Max-Age=0"));
    }
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["message"], "User logged out");

    let saved = app
        .store
        .find_user_by_email("mario@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(saved.refresh_token.is_none());

    // Nobody holds that token anymore
    let response = app.get("/api/logout", refresh_cookie).await;
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn logout_without_refresh_token_returns_400() {
    let app = spawn_app().await;

    let response = app.get("/api/logout", None).await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "refreshToken is missing");
}

// ============================================================================
// Transactions
// ============================================================================

#[tokio::test]
async fn users_record_and_list_their_own_transactions() {
    let app = spawn_app().await;
    let mario = app.seed_user("mario", "m@example.com", Role::Regular).await;
    let luigi = app.seed_user("luigi", "l@example.com", Role::Regular).await;
    let mario_cookies = pair_cookies(&app.issue(&mario));

    let response = app
        .post_json(
            "/api/users/mario/transactions",
            &json!({ "amount": 12.5, "category": "food" }),
            mario_cookies.clone(),
        )
        .await;
    assert_eq!(201, response.status().as_u16());

    let response = app
        .post_json(
            "/api/users/mario/transactions",
            &json!({ "amount": 3.0, "category": "food" }),
            pair_cookies(&app.issue(&luigi)),
        )
        .await;
    assert_eq!(401, response.status().as_u16());

    let response = app
        .get("/api/users/mario/transactions", mario_cookies)
        .await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let transactions = body["data"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["category"], "food");
    assert_eq!(transactions[0]["amount"], 12.5);
}

#[tokio::test]
async fn group_transactions_cover_all_members() {
    let app = spawn_app().await;
    let mario = app.seed_user("mario", "m@example.com", Role::Regular).await;
    let luigi = app.seed_user("luigi", "l@example.com", Role::Regular).await;
    app.seed_user("peach", "p@example.com", Role::Regular).await;

    for (user, username) in [(&mario, "mario"), (&luigi, "luigi")] {
        app.post_json(
            &format!("/api/users/{}/transactions", username),
            &json!({ "amount": 10.0, "category": "rent" }),
            pair_cookies(&app.issue(user)),
        )
        .await;
    }
    app.post_json(
        "/api/users/peach/transactions",
        &json!({ "amount": 99.0, "category": "rent" }),
        None,
    )
    .await;

    app.post_json(
        "/api/groups",
        &json!({ "name": "brothers", "memberEmails": ["l@example.com"] }),
        pair_cookies(&app.issue(&mario)),
    )
    .await;

    let response = app
        .get("/api/groups/brothers/transactions", pair_cookies(&app.issue(&luigi)))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn missing_group_requires_tokens_first() {
    let app = spawn_app().await;

    for path in ["/api/groups/nowhere", "/api/groups/nowhere/transactions"] {
        let response = app.get(path, None).await;

        assert_eq!(400, response.status().as_u16(), "{}", path);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "accessToken is missing");
    }
}

#[tokio::test]
async fn missing_group_rejects_valid_caller_as_non_member() {
    let app = spawn_app().await;
    let mario = app.seed_user("mario", "m@example.com", Role::Regular).await;

    for path in ["/api/groups/nowhere", "/api/groups/nowhere/transactions"] {
        let response = app.get(path, pair_cookies(&app.issue(&mario))).await;

        assert_eq!(401, response.status().as_u16(), "{}", path);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "User does not belong to Group");
    }
}

#[tokio::test]
async fn missing_group_returns_404_once_gate_allows() {
    let app = spawn_app().await;
    let mario = app.seed_user("mario", "m@example.com", Role::Regular).await;
    let identity = mario.identity();

    // An expired access token renewed from a live refresh token passes the
    // membership check, so the lookup result is what the caller sees.
    let response = app
        .get(
            "/api/groups/nowhere",
            cookies(&app.sign(&identity, 0), &app.sign(&identity, 604_800)),
        )
        .await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn admin_lists_all_transactions() {
    let app = spawn_app().await;
    let mario = app.seed_user("mario", "m@example.com", Role::Regular).await;
    let peach = app.seed_user("peach", "p@example.com", Role::Admin).await;

    app.post_json(
        "/api/users/mario/transactions",
        &json!({ "amount": 7.25, "category": "travel" }),
        pair_cookies(&app.issue(&mario)),
    )
    .await;

    let response = app
        .get("/api/transactions", pair_cookies(&app.issue(&mario)))
        .await;
    assert_eq!(401, response.status().as_u16());

    let response = app
        .get("/api/transactions", pair_cookies(&app.issue(&peach)))
        .await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
