use reqwest::StatusCode;
use serde_json::{Value, json};

use atelier_api::app::{AppConfig, build_app};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = build_app(AppConfig::new("test-secret"));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct Session {
    access: String,
    refresh: String,
    user_id: String,
}

/// Register a user and hand back their tokens.
async fn register(client: &reqwest::Client, srv: &TestServer, email: &str) -> Session {
    let res = client
        .post(srv.url("/auth/register"))
        .json(&json!({
            "email": email,
            "password": "sturdy-passphrase",
            "first_name": "Test",
            "last_name": "User",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED, "registration failed for {email}");

    let body: Value = res.json().await.unwrap();
    Session {
        access: body["tokens"]["access"].as_str().unwrap().to_string(),
        refresh: body["tokens"]["refresh"].as_str().unwrap().to_string(),
        user_id: body["user"]["id"].as_str().unwrap().to_string(),
    }
}

async fn create_project(client: &reqwest::Client, srv: &TestServer, token: &str) -> String {
    let res = client
        .post(srv.url("/projects"))
        .bearer_auth(token)
        .json(&json!({ "title": "Pseudo", "description": "A project" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn add_member(
    client: &reqwest::Client,
    srv: &TestServer,
    token: &str,
    project_id: &str,
    user_id: &str,
    role: &str,
) -> reqwest::Response {
    client
        .post(srv.url(&format!("/projects/{project_id}/members")))
        .bearer_auth(token)
        .json(&json!({ "user_id": user_id, "role": role }))
        .send()
        .await
        .unwrap()
}

async fn create_comment(
    client: &reqwest::Client,
    srv: &TestServer,
    token: &str,
    body: Value,
) -> reqwest::Response {
    client
        .post(srv.url("/comments"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap()
}

// ---- auth ----

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/projects")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Health stays public.
    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_mints_a_token_pair() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv, "alice@example.com").await;

    let res = client
        .post(srv.url("/auth/login"))
        .json(&json!({ "email": "alice@example.com", "password": "sturdy-passphrase" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["tokens"]["access"].is_string());
    assert!(body["tokens"]["refresh"].is_string());
}

#[tokio::test]
async fn invalid_credentials_are_indistinguishable() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv, "alice@example.com").await;

    let wrong_password = client
        .post(srv.url("/auth/login"))
        .json(&json!({ "email": "alice@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    let unknown_user = client
        .post(srv.url("/auth/login"))
        .json(&json!({ "email": "nobody@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_user.json().await.unwrap();
    assert_eq!(a["message"], b["message"]);
}

#[tokio::test]
async fn refresh_derives_a_working_access_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let session = register(&client, &srv, "alice@example.com").await;

    let res = client
        .post(srv.url("/auth/token/refresh"))
        .json(&json!({ "refresh": session.refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let access = body["access"].as_str().unwrap();

    // The derived token authenticates like the original.
    let res = client
        .post(srv.url("/projects"))
        .bearer_auth(access)
        .json(&json!({ "title": "From refreshed token", "description": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn access_token_is_rejected_as_refresh_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let session = register(&client, &srv, "alice@example.com").await;

    let res = client
        .post(srv.url("/auth/token/refresh"))
        .json(&json!({ "refresh": session.access }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forged_token_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv, "alice@example.com").await;

    // Well-formed claims, wrong signing key.
    let now = chrono::Utc::now().timestamp();
    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &json!({
            "sub": uuid::Uuid::now_v7(),
            "username": "alice",
            "email": "alice@example.com",
            "email_verified": true,
            "token_use": "access",
            "jti": uuid::Uuid::new_v4(),
            "iat": now,
            "exp": now + 1800,
        }),
        &jsonwebtoken::EncodingKey::from_secret(b"attacker-secret"),
    )
    .unwrap();

    let res = client
        .get(srv.url("/projects"))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

// ---- logout & revocation ----

#[tokio::test]
async fn logout_blacklists_access_and_refresh_tokens() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let session = register(&client, &srv, "alice@example.com").await;

    let res = client
        .post(srv.url("/auth/logout"))
        .bearer_auth(&session.access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Successfully logged out");

    // Replaying the blacklisted access token fails on any protected endpoint.
    let res = client
        .get(srv.url("/projects"))
        .bearer_auth(&session.access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // The refresh token is rejected permanently.
    let res = client
        .post(srv.url("/auth/token/refresh"))
        .json(&json!({ "refresh": session.refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn second_logout_reports_no_active_sessions() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let session = register(&client, &srv, "alice@example.com").await;

    // Derive a second access token first; it is not blacklisted by the first
    // logout (the cache is keyed by the exact raw token) but its user has no
    // outstanding refresh tokens left afterwards.
    let res = client
        .post(srv.url("/auth/token/refresh"))
        .json(&json!({ "refresh": session.refresh }))
        .send()
        .await
        .unwrap();
    let derived: Value = res.json().await.unwrap();
    let second_access = derived["access"].as_str().unwrap().to_string();

    let res = client
        .post(srv.url("/auth/logout"))
        .bearer_auth(&session.access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(srv.url("/auth/logout"))
        .bearer_auth(&second_access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "No active sessions found");
}

// ---- accounts ----

#[tokio::test]
async fn profile_requires_verified_email() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let session = register(&client, &srv, "alice@example.com").await;

    // Freshly registered accounts are active but unverified.
    let res = client
        .get(srv.url("/accounts/profile"))
        .bearer_auth(&session.access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

// ---- projects & membership ----

#[tokio::test]
async fn creator_becomes_owner() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let session = register(&client, &srv, "alice@example.com").await;

    let project_id = create_project(&client, &srv, &session.access).await;

    let res = client
        .get(srv.url(&format!("/projects/{project_id}")))
        .bearer_auth(&session.access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let roles = body["member_roles"].as_array().unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0]["role"], "OWNER");
    assert_eq!(roles[0]["user"]["id"].as_str().unwrap(), session.user_id);
}

#[tokio::test]
async fn projects_are_invisible_to_non_members() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let owner = register(&client, &srv, "owner@example.com").await;
    let outsider = register(&client, &srv, "outsider@example.com").await;

    let project_id = create_project(&client, &srv, &owner.access).await;

    // Not 403: existence is not leaked outside the membership set.
    let res = client
        .get(srv.url(&format!("/projects/{project_id}")))
        .bearer_auth(&outsider.access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_owners_manage_members() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let owner = register(&client, &srv, "owner@example.com").await;
    let editor = register(&client, &srv, "editor@example.com").await;
    let reader = register(&client, &srv, "reader@example.com").await;

    let project_id = create_project(&client, &srv, &owner.access).await;

    let res = add_member(&client, &srv, &owner.access, &project_id, &editor.user_id, "EDITOR").await;
    assert_eq!(res.status(), StatusCode::CREATED);

    // An EDITOR cannot add members, whatever the target role.
    let res = add_member(&client, &srv, &editor.access, &project_id, &reader.user_id, "READER").await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Nor update roles.
    let res = client
        .patch(srv.url(&format!("/projects/{project_id}/members")))
        .bearer_auth(&editor.access)
        .json(&json!({ "user_id": editor.user_id, "role": "OWNER" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_membership_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let owner = register(&client, &srv, "owner@example.com").await;
    let member = register(&client, &srv, "member@example.com").await;

    let project_id = create_project(&client, &srv, &owner.access).await;

    let res = add_member(&client, &srv, &owner.access, &project_id, &member.user_id, "EDITOR").await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = add_member(&client, &srv, &owner.access, &project_id, &member.user_id, "READER").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn add_member_validates_before_authorizing() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let owner = register(&client, &srv, "owner@example.com").await;
    let member = register(&client, &srv, "member@example.com").await;

    let project_id = create_project(&client, &srv, &owner.access).await;

    // Invalid role literal: 400 even for the owner.
    let res = add_member(&client, &srv, &owner.access, &project_id, &member.user_id, "ADMIN").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Unknown target user: 404.
    let res = add_member(
        &client,
        &srv,
        &owner.access,
        &project_id,
        &uuid::Uuid::now_v7().to_string(),
        "EDITOR",
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_member_role_checks_existence_before_ownership() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let owner = register(&client, &srv, "owner@example.com").await;
    let member = register(&client, &srv, "member@example.com").await;

    let project_id = create_project(&client, &srv, &owner.access).await;
    add_member(&client, &srv, &owner.access, &project_id, &member.user_id, "READER").await;

    // A non-owner probing a nonexistent project gets 404, not 403: existence
    // is checked first.
    let missing = uuid::Uuid::now_v7().to_string();
    let res = client
        .patch(srv.url(&format!("/projects/{missing}/members")))
        .bearer_auth(&member.access)
        .json(&json!({ "user_id": member.user_id, "role": "EDITOR" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Target without a membership row: 404.
    let outsider = register(&client, &srv, "outsider@example.com").await;
    let res = client
        .patch(srv.url(&format!("/projects/{project_id}/members")))
        .bearer_auth(&owner.access)
        .json(&json!({ "user_id": outsider.user_id, "role": "EDITOR" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // And the happy path overwrites the row.
    let res = client
        .patch(srv.url(&format!("/projects/{project_id}/members")))
        .bearer_auth(&owner.access)
        .json(&json!({ "user_id": member.user_id, "role": "EDITOR" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

// ---- comments & documents ----

#[tokio::test]
async fn readers_cannot_comment() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let owner = register(&client, &srv, "owner@example.com").await;
    let reader = register(&client, &srv, "reader@example.com").await;

    let project_id = create_project(&client, &srv, &owner.access).await;
    add_member(&client, &srv, &owner.access, &project_id, &reader.user_id, "READER").await;

    let res = create_comment(
        &client,
        &srv,
        &reader.access,
        json!({ "project": project_id, "content": "hi" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = create_comment(
        &client,
        &srv,
        &owner.access,
        json!({ "project": project_id, "content": "hi" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn comment_needs_content_or_files() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let owner = register(&client, &srv, "owner@example.com").await;
    let project_id = create_project(&client, &srv, &owner.access).await;

    let res = create_comment(
        &client,
        &srv,
        &owner.access,
        json!({ "project": project_id, "content": "" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // A file alone satisfies the invariant.
    let res = create_comment(
        &client,
        &srv,
        &owner.access,
        json!({
            "project": project_id,
            "content": "",
            "files": [{ "name": "notes.txt", "size_bytes": 2048 }],
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["documents"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn multi_file_violations_are_aggregated_by_filename() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let owner = register(&client, &srv, "owner@example.com").await;
    let project_id = create_project(&client, &srv, &owner.access).await;

    // 0.5 KiB, 3 KiB, 6 MiB: both violations must come back together; the
    // valid file suppresses nothing, and nothing is persisted.
    let res = create_comment(
        &client,
        &srv,
        &owner.access,
        json!({
            "project": project_id,
            "content": "",
            "files": [
                { "name": "tiny.txt", "size_bytes": 512 },
                { "name": "fine.txt", "size_bytes": 3072 },
                { "name": "huge.bin", "size_bytes": 6291456 },
            ],
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    let validations = body["validations"].as_object().unwrap();
    assert_eq!(validations.len(), 2);
    assert_eq!(validations["tiny.txt"], "File size must be at least 1KB.");
    assert_eq!(validations["huge.bin"], "File size cannot exceed 5MB.");

    let res = client
        .get(srv.url(&format!("/projects/{project_id}/comments")))
        .bearer_auth(&owner.access)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert!(body["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn comment_delete_is_owner_or_author() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let owner = register(&client, &srv, "owner@example.com").await;
    let author = register(&client, &srv, "author@example.com").await;
    let editor = register(&client, &srv, "editor@example.com").await;

    let project_id = create_project(&client, &srv, &owner.access).await;
    add_member(&client, &srv, &owner.access, &project_id, &author.user_id, "EDITOR").await;
    add_member(&client, &srv, &owner.access, &project_id, &editor.user_id, "EDITOR").await;

    let comment = |content: &str| json!({ "project": project_id, "content": content });

    // An unrelated editor may not delete someone else's comment.
    let res = create_comment(&client, &srv, &author.access, comment("mine")).await;
    let id = res.json::<Value>().await.unwrap()["id"].as_str().unwrap().to_string();
    let res = client
        .delete(srv.url(&format!("/comments/{id}")))
        .bearer_auth(&editor.access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The author may.
    let res = client
        .delete(srv.url(&format!("/comments/{id}")))
        .bearer_auth(&author.access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // And the project owner may delete anyone's comment.
    let res = create_comment(&client, &srv, &author.access, comment("another")).await;
    let id = res.json::<Value>().await.unwrap()["id"].as_str().unwrap().to_string();
    let res = client
        .delete(srv.url(&format!("/comments/{id}")))
        .bearer_auth(&owner.access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn document_upload_requires_editor_tier() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let owner = register(&client, &srv, "owner@example.com").await;
    let reader = register(&client, &srv, "reader@example.com").await;

    let project_id = create_project(&client, &srv, &owner.access).await;
    add_member(&client, &srv, &owner.access, &project_id, &reader.user_id, "READER").await;

    let res = create_comment(
        &client,
        &srv,
        &owner.access,
        json!({ "project": project_id, "content": "attach here" }),
    )
    .await;
    let comment_id = res.json::<Value>().await.unwrap()["id"].as_str().unwrap().to_string();

    let res = client
        .post(srv.url("/documents"))
        .bearer_auth(&reader.access)
        .json(&json!({
            "comment": comment_id,
            "file": { "name": "notes.txt", "size_bytes": 2048 },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(srv.url("/documents"))
        .bearer_auth(&owner.access)
        .json(&json!({
            "comment": comment_id,
            "file": { "name": "huge.bin", "size_bytes": 6291456 },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url("/documents"))
        .bearer_auth(&owner.access)
        .json(&json!({
            "comment": comment_id,
            "file": { "name": "notes.txt", "size_bytes": 2048 },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "document uploaded successfully");
}
