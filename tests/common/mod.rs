//! Shared harness for router-level tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use tripcraft::completion::Role;
use tripcraft::config::SessionConfig;
use tripcraft::web::{self, SESSION_COOKIE};
use tripcraft::{AppState, ChatRequest, CompletionError, CompletionService};

/// Completion service that plays back canned replies and records every request
#[derive(Default)]
pub struct FakeCompletion {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeCompletion {
    pub fn replying(text: &str) -> Arc<Self> {
        let fake = Self::default();
        fake.push(Ok(text.to_string()));
        Arc::new(fake)
    }

    pub fn push(&self, reply: Result<String, CompletionError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_user_message(&self) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .and_then(|request| request.content_of(Role::User).map(str::to_string))
    }

    pub fn last_system_message(&self) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .and_then(|request| request.content_of(Role::System).map(str::to_string))
    }
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete(&self, request: ChatRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Day 1: Arrive and explore".to_string()))
    }
}

/// Router plus the cookie of the browser talking to it
pub struct Client {
    pub app: Router,
    pub cookie: Option<String>,
}

impl Client {
    pub fn new(completion: Arc<FakeCompletion>) -> Self {
        let state = AppState::new(completion, &SessionConfig::default()).unwrap();
        Self {
            app: web::router(Arc::new(state)),
            cookie: None,
        }
    }

    pub async fn send(&mut self, request: Request<Body>) -> Response<Body> {
        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(value) = response.headers().get(header::SET_COOKIE) {
            let value = value.to_str().unwrap();
            let pair = value.split(';').next().unwrap().to_string();
            assert!(pair.starts_with(SESSION_COOKIE));
            self.cookie = Some(pair);
        }
        response
    }

    fn builder(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        let request = self.builder("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, body: &str) -> Response<Body> {
        let request = self
            .builder("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&mut self, uri: &str, body: serde_json::Value) -> Response<Body> {
        let request = self
            .builder("POST", uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_empty(&mut self, uri: &str) -> Response<Body> {
        let request = self.builder("POST", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

pub fn assert_redirect_home(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
}

pub const PARIS_BASICS: &str = "destination=Paris%2C+France&duration_days=5&budget=moderate\
    &purpose=relaxation&preferences=food&preferences=history";

pub const PARIS_REFINEMENTS: &str = "budget_range=%24800-%241200+USD&accommodation=mid-range-hotel\
    &mobility=no-restrictions&dietary=Vegetarian";
