#![allow(dead_code)]

use std::time::Duration;

use anyhow::Result;
use axum_test::TestServer;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, Stream};
use notemarket_core::Identity;
use notemarket_core::identity::JwtIdentityProvider;
use notemarket_model::UserId;
use notemarket_server::build_router;
use notemarket_server::infra::config::{Config, ConfigOverrides, FileConfig};
use notemarket_server::infra::startup::build_state;
use serde_json::{Value, json};
use tempfile::TempDir;

pub const JWT_SECRET: &str = "test-jwt-secret";

pub struct TestApp {
    pub server: TestServer,
    tokens: JwtIdentityProvider,
    _storage: TempDir,
}

pub struct TestUser {
    pub identity: Identity,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn id(&self) -> String {
        self.identity.user_id.to_string()
    }
}

pub async fn build_test_app() -> Result<TestApp> {
    let storage = tempfile::tempdir()?;
    let config = Config::resolve(
        FileConfig::default(),
        ConfigOverrides {
            jwt_secret: Some(JWT_SECRET.into()),
            signing_key: Some("test-signing-key".into()),
            storage_root: Some(storage.path().to_path_buf()),
            max_upload_bytes: Some(1024 * 1024),
            ..Default::default()
        },
    )?;
    let state = build_state(config).await?;
    let server = TestServer::builder()
        .build(build_router(state))
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;

    Ok(TestApp {
        server,
        tokens: JwtIdentityProvider::new(JWT_SECRET)?,
        _storage: storage,
    })
}

impl TestApp {
    /// A signed-in student; tokens come from the same secret the server trusts.
    pub fn user(&self, username: &str) -> Result<TestUser> {
        let identity = Identity {
            user_id: UserId::new(),
            email: Some(format!("{username}@student.uio.no")),
            username: Some(username.to_string()),
        };
        let token = self.tokens.issue(&identity, Duration::from_secs(3600))?;
        Ok(TestUser { identity, token })
    }

    pub async fn upload(&self, user: &TestUser, body: Value) -> Value {
        let response = self
            .server
            .post("/api/v1/documents")
            .add_header("Authorization", user.bearer())
            .json(&body)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }

    /// Follow a signed link through the `/files` route.
    pub async fn fetch_signed(&self, signed_url: &str) -> axum_test::TestResponse {
        let url = url::Url::parse(signed_url).expect("signed url");
        let mut request = self.server.get(url.path());
        for (key, value) in url.query_pairs() {
            request = request.add_query_param(&key, value.as_ref());
        }
        request.await
    }
}

pub fn upload_body(title: &str, pages: u32, preview_pages: u32) -> Value {
    json!({
        "title": title,
        "course_code": "inf1000",
        "university": "Universitetet i Oslo",
        "price": 99,
        "description": "Notater fra hele semesteret",
        "preview_page_count": preview_pages,
        "season": "Høst",
        "year": 2024,
        "tags": ["eksamen", "notater"],
        "file_base64": STANDARD.encode(sample_pdf(pages)),
    })
}

pub fn page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes)
        .expect("valid pdf")
        .get_pages()
        .len()
}

pub fn sample_pdf(pages: u32) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();
    for _ in 0..pages {
        let content = Content {
            operations: vec![Operation::new("BT", vec![]), Operation::new("ET", vec![])],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(pages as i64)),
            ("Kids", Object::Array(kids)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);
    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}
