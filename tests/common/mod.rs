#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime};
use tower::ServiceExt;
use uuid::Uuid;

use interviewer::{
    access::Role,
    app::build_app,
    auth::password::hash_password,
    config::JwtConfig,
    state::AppState,
    store::NewUser,
};

pub const PASSWORD: &str = "correct-horse-battery";

pub struct Session {
    pub token: String,
    pub refresh_token: String,
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::in_memory(JwtConfig {
            secret: "integration-secret".into(),
            issuer: "interviewer".into(),
            audience: "interviewer-users".into(),
            ttl_minutes: 15,
            refresh_ttl_minutes: 60,
        });
        let router = build_app(state.clone());
        Self { state, router }
    }

    pub async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Reply {
            status,
            headers,
            body,
        }
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut builder = Request::builder().method(method).uri(format!("/api/v1{uri}"));
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> Reply {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Reply {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> Reply {
        self.call(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Reply {
        self.call(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn register(&self, body: Value) -> Session {
        let reply = self.call(Method::POST, "/auth/register", None, Some(body)).await;
        assert_eq!(reply.status, StatusCode::OK, "register failed: {}", reply.body);
        session(&reply.body)
    }

    pub async fn login(&self, email: &str) -> Session {
        let reply = self
            .call(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "login failed: {}", reply.body);
        session(&reply.body)
    }

    pub async fn company(&self, email: &str, name: &str) -> Session {
        self.register(json!({
            "email": email,
            "password": PASSWORD,
            "full_name": format!("{name} Owner"),
            "role": "COMPANY",
            "company_name": name,
        }))
        .await
    }

    pub async fn member(&self, email: &str, role: &str, company_id: Option<Uuid>) -> Session {
        self.register(json!({
            "email": email,
            "password": PASSWORD,
            "full_name": "Team Member",
            "role": role,
            "company_id": company_id,
        }))
        .await
    }

    /// Admins cannot self-register, so they are seeded through the store.
    pub async fn admin(&self) -> Session {
        self.state
            .store
            .create_user(NewUser {
                email: "admin@example.com".into(),
                password_hash: hash_password(PASSWORD).expect("hash"),
                full_name: "Admin".into(),
                role: Role::Admin,
                company_id: None,
            })
            .await
            .expect("admin");
        self.login("admin@example.com").await
    }

    pub async fn candidate(&self, token: &str, email: &str) -> Uuid {
        let reply = self
            .post(
                "/candidates",
                token,
                json!({ "full_name": "Ada Lovelace", "email": email }),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        id(&reply.body)
    }
}

fn session(body: &Value) -> Session {
    Session {
        token: body["access_token"].as_str().expect("access token").to_string(),
        refresh_token: body["refresh_token"]
            .as_str()
            .expect("refresh token")
            .to_string(),
        user_id: id(&body["user"]),
        company_id: body["user"]["company_id"]
            .as_str()
            .map(|s| s.parse().expect("uuid")),
    }
}

pub fn id(value: &Value) -> Uuid {
    value["id"].as_str().expect("id").parse().expect("uuid")
}

pub fn ids(value: &Value) -> Vec<Uuid> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(id)
        .collect()
}

pub fn in_days(days: i64) -> String {
    (OffsetDateTime::now_utc() + Duration::days(days))
        .format(&Rfc3339)
        .expect("rfc3339")
}
