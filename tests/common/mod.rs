#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use expense_tracker::auth::{
    hash_password_with_cost, IdentityClaims, TokenIssuer, TokenKeys, TokenPair,
};
use expense_tracker::configuration::JwtSettings;
use expense_tracker::startup::run;
use expense_tracker::store::{MemoryStore, NewUser, Role, User, UserStore};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::Response;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const TEST_PASSWORD: &str = "SecurePass123";

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub jwt: JwtSettings,
    pub client: reqwest::Client,
}

pub async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let store = Arc::new(MemoryStore::new());
    let jwt = JwtSettings::new(TEST_SECRET);

    let server = run(listener, store.clone(), jwt.clone()).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
        jwt,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    /// Insert a user directly, with a cheap bcrypt cost
    pub async fn seed_user(&self, username: &str, email: &str, role: Role) -> User {
        let password_hash = hash_password_with_cost(TEST_PASSWORD, 4).unwrap();
        self.store
            .insert_user(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                role,
            })
            .await
            .expect("Failed to seed user")
    }

    pub fn issue(&self, user: &User) -> TokenPair {
        TokenIssuer::new(&self.jwt).issue(&user.identity()).unwrap()
    }

    /// Sign an arbitrary identity with the server's secret
    pub fn sign(&self, identity: &IdentityClaims, expiry_seconds: i64) -> String {
        TokenKeys::new(&self.jwt)
            .sign(identity, expiry_seconds)
            .unwrap()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str, cookies: Option<String>) -> Response {
        let mut request = self.client.get(self.url(path));
        if let Some(cookies) = cookies {
            request = request.header(COOKIE, cookies);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
        cookies: Option<String>,
    ) -> Response {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(cookies) = cookies {
            request = request.header(COOKIE, cookies);
        }
        request.send().await.expect("Failed to execute request.")
    }
}

pub fn cookies(access_token: &str, refresh_token: &str) -> Option<String> {
    Some(format!(
        "accessToken={}; refreshToken={}",
        access_token, refresh_token
    ))
}

pub fn pair_cookies(pair: &TokenPair) -> Option<String> {
    cookies(&pair.access_token, &pair.refresh_token)
}

/// Raw `Set-Cookie` header for `name`, if the response sets it
pub fn set_cookie(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .map(str::to_string)
}

/// Value part of a `Set-Cookie` header
pub fn cookie_value(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}
