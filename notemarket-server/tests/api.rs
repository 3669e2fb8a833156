use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{Value, json};

#[path = "support/mod.rs"]
mod support;
use support::{build_test_app, page_count, sample_pdf, upload_body};

#[tokio::test]
async fn health_and_empty_catalog() -> Result<()> {
    let app = build_test_app().await?;

    let health = app.server.get("/api/v1/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["status"], "ok");

    let catalog = app.server.get("/api/v1/documents").await;
    catalog.assert_status_ok();
    let body: Value = catalog.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(body["data"]["sort"], "newest");
    Ok(())
}

#[tokio::test]
async fn writes_require_a_valid_token() -> Result<()> {
    let app = build_test_app().await?;

    let anonymous = app
        .server
        .post("/api/v1/documents")
        .json(&upload_body("Notater", 3, 1))
        .await;
    anonymous.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.json::<Value>()["status"], "error");

    let forged = app
        .server
        .get("/api/v1/me/profile")
        .add_header("Authorization", "Bearer not-a-jwt")
        .await;
    forged.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn upload_then_browse_with_filters() -> Result<()> {
    let app = build_test_app().await?;
    let kari = app.user("kari")?;

    let uploaded = app.upload(&kari, upload_body("Eksamensnotater", 5, 2)).await;
    assert_eq!(uploaded["course_code"], "INF1000");
    assert_eq!(uploaded["page_count"], 5);
    assert_eq!(uploaded["preview_page_count"], 2);
    assert_eq!(uploaded["semester"], "Høst 2024");
    assert_eq!(uploaded["owner_id"], kari.id());

    let mut cheap = upload_body("Sammendrag", 2, 1);
    cheap["university"] = json!("NTNU");
    cheap["course_code"] = json!("tdt4100");
    cheap["price"] = json!("25,50");
    app.upload(&kari, cheap).await;

    let all = app
        .server
        .get("/api/v1/documents")
        .add_query_param("sort", "price-low")
        .await;
    all.assert_status_ok();
    let body: Value = all.json();
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["documents"][0]["title"], "Sammendrag");
    assert_eq!(body["data"]["documents"][0]["price"], 25.5);
    assert_eq!(body["data"]["facets"]["universities"], json!(["NTNU", "Universitetet i Oslo"]));

    let filtered = app
        .server
        .get("/api/v1/documents")
        .add_query_param("university", "Universitetet i Oslo")
        .add_query_param("min_pages", 3)
        .await;
    let body: Value = filtered.json();
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["documents"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"]["documents"][0]["title"], "Eksamensnotater");
    assert_eq!(body["data"]["active_filters"].as_array().map(Vec::len), Some(2));
    // Facets still offer every loaded value.
    assert_eq!(body["data"]["facets"]["universities"], json!(["NTNU", "Universitetet i Oslo"]));

    let newest = app
        .server
        .get("/api/v1/documents")
        .add_query_param("limit", 1)
        .await;
    newest.assert_status_ok();
    let body: Value = newest.json();
    assert_eq!(body["data"]["documents"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"]["documents"][0]["title"], "Sammendrag");
    assert_eq!(body["data"]["total"], 2);

    let bad = app
        .server
        .get("/api/v1/documents")
        .add_query_param("max_price", "gratis")
        .await;
    bad.assert_status(StatusCode::BAD_REQUEST);

    let id = uploaded["id"].as_str().unwrap();
    let detail = app.server.get(&format!("/api/v1/documents/{id}")).await;
    detail.assert_status_ok();
    assert_eq!(detail.json::<Value>()["data"]["display_code"], "UiO-INF1000");

    let mine = app
        .server
        .get("/api/v1/me/documents")
        .add_header("Authorization", kari.bearer())
        .await;
    assert_eq!(mine.json::<Value>()["data"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn grade_without_proof_is_rejected() -> Result<()> {
    let app = build_test_app().await?;
    let kari = app.user("kari")?;

    let mut body = upload_body("Karakterbevis mangler", 3, 1);
    body["grade"] = json!("A");
    let response = app
        .server
        .post("/api/v1/documents")
        .add_header("Authorization", kari.bearer())
        .json(&body)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let message = response.json::<Value>()["error"]["message"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    assert!(message.contains("karakterbevis"));

    let catalog = app.server.get("/api/v1/documents").await;
    assert_eq!(catalog.json::<Value>()["data"]["total"], 0);
    Ok(())
}

#[tokio::test]
async fn non_pdf_uploads_are_rejected() -> Result<()> {
    let app = build_test_app().await?;
    let kari = app.user("kari")?;

    let mut body = upload_body("Ikke PDF", 1, 1);
    body["file_base64"] = json!("aGVsbG8gd29ybGQ=");
    let response = app
        .server
        .post("/api/v1/documents")
        .add_header("Authorization", kari.bearer())
        .json(&body)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn previews_are_gated_for_buyers() -> Result<()> {
    let app = build_test_app().await?;
    let kari = app.user("kari")?;
    let ola = app.user("ola")?;

    let uploaded = app.upload(&kari, upload_body("Forelesningsnotater", 5, 2)).await;
    let id = uploaded["id"].as_str().unwrap().to_string();

    let buyer = app
        .server
        .get(&format!("/api/v1/documents/{id}/preview"))
        .add_query_param("page", 4)
        .add_header("Authorization", ola.bearer())
        .await;
    buyer.assert_status_ok();
    let body: Value = buyer.json();
    let preview = &body["data"]["preview"];
    assert_eq!(preview["page"], 3);
    assert_eq!(preview["max_viewable_pages"], 2);
    assert_eq!(preview["locked_page_count"], 3);
    assert_eq!(preview["is_locked"], true);
    assert_eq!(preview["is_owner"], false);
    // Jumping straight to a later page is not an opening view.
    assert_eq!(body["data"]["document"]["view_count"], 0);

    let file = app.fetch_signed(body["data"]["url"].as_str().unwrap()).await;
    file.assert_status_ok();
    assert_eq!(file.header("content-type"), "application/pdf");
    assert_eq!(page_count(file.as_bytes()), 2);

    let owner = app
        .server
        .get(&format!("/api/v1/documents/{id}/preview"))
        .add_header("Authorization", kari.bearer())
        .await;
    let body: Value = owner.json();
    assert_eq!(body["data"]["preview"]["is_owner"], true);
    assert_eq!(body["data"]["preview"]["locked_page_count"], 0);
    assert_eq!(body["data"]["document"]["view_count"], 0);
    let file = app.fetch_signed(body["data"]["url"].as_str().unwrap()).await;
    assert_eq!(page_count(file.as_bytes()), 5);

    let anonymous = app
        .server
        .get(&format!("/api/v1/documents/{id}/preview"))
        .await;
    anonymous.assert_status_ok();
    assert_eq!(anonymous.json::<Value>()["data"]["document"]["view_count"], 1);
    Ok(())
}

#[tokio::test]
async fn tampered_links_are_refused() -> Result<()> {
    let app = build_test_app().await?;
    let kari = app.user("kari")?;
    let uploaded = app.upload(&kari, upload_body("Notater", 3, 1)).await;
    let id = uploaded["id"].as_str().unwrap();

    let body: Value = app
        .server
        .get(&format!("/api/v1/documents/{id}/preview"))
        .await
        .json();
    let url = body["data"]["url"].as_str().unwrap();
    let parsed = url::Url::parse(url)?;
    let expires = parsed
        .query_pairs()
        .find(|(k, _)| k == "expires")
        .map(|(_, v)| v.into_owned())
        .unwrap();

    let original_path = format!("/api/v1/files/{}", uploaded["file_path"].as_str().unwrap());
    let signature = parsed
        .query_pairs()
        .find(|(k, _)| k == "signature")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    // A preview signature does not unlock the full file.
    let response = app
        .server
        .get(&original_path)
        .add_query_param("expires", &expires)
        .add_query_param("signature", &signature)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let expired = app
        .server
        .get(parsed.path())
        .add_query_param("expires", 1)
        .add_query_param("signature", &signature)
        .await;
    expired.assert_status(StatusCode::FORBIDDEN);

    let malformed = app
        .server
        .get(parsed.path())
        .add_query_param("expires", &expires)
        .add_query_param("signature", "zz")
        .await;
    malformed.assert_status(StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn only_owners_edit_delete_and_download() -> Result<()> {
    let app = build_test_app().await?;
    let kari = app.user("kari")?;
    let ola = app.user("ola")?;
    let uploaded = app.upload(&kari, upload_body("Løsningsforslag", 3, 1)).await;
    let id = uploaded["id"].as_str().unwrap().to_string();
    let path = format!("/api/v1/documents/{id}");

    let download = app
        .server
        .get(&format!("{path}/download"))
        .add_header("Authorization", ola.bearer())
        .await;
    download.assert_status(StatusCode::FORBIDDEN);

    let delete = app
        .server
        .delete(&path)
        .add_header("Authorization", ola.bearer())
        .await;
    delete.assert_status(StatusCode::FORBIDDEN);

    let mut edit = upload_body("Løsningsforslag v2", 4, 2);
    edit["price"] = json!(149);
    let edited = app
        .server
        .put(&path)
        .add_header("Authorization", kari.bearer())
        .json(&edit)
        .await;
    edited.assert_status_ok();
    let body: Value = edited.json();
    assert_eq!(body["data"]["title"], "Løsningsforslag v2");
    assert_eq!(body["data"]["page_count"], 4);
    assert_ne!(body["data"]["file_path"], uploaded["file_path"]);

    let download = app
        .server
        .get(&format!("{path}/download"))
        .add_header("Authorization", kari.bearer())
        .await;
    download.assert_status_ok();
    assert_eq!(download.header("content-type"), "application/pdf");
    let disposition = download.header("content-disposition");
    let disposition = disposition.to_str()?;
    assert!(disposition.contains("filename*=UTF-8''INF1000_L%C3%B8sningsforslag_v2_kari.pdf"));
    assert_eq!(page_count(download.as_bytes()), 4);

    let delete = app
        .server
        .delete(&path)
        .add_header("Authorization", kari.bearer())
        .await;
    delete.assert_status(StatusCode::NO_CONTENT);
    app.server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn edit_without_file_keeps_the_pdf() -> Result<()> {
    let app = build_test_app().await?;
    let kari = app.user("kari")?;
    let uploaded = app.upload(&kari, upload_body("Notater", 3, 1)).await;
    let id = uploaded["id"].as_str().unwrap();

    let mut edit = upload_body("Notater", 3, 2);
    edit.as_object_mut().unwrap().remove("file_base64");
    let edited = app
        .server
        .put(&format!("/api/v1/documents/{id}"))
        .add_header("Authorization", kari.bearer())
        .json(&edit)
        .await;
    edited.assert_status_ok();
    let body: Value = edited.json();
    assert_eq!(body["data"]["file_path"], uploaded["file_path"]);
    assert_eq!(body["data"]["preview_page_count"], 2);
    Ok(())
}

#[tokio::test]
async fn profile_is_created_on_first_access() -> Result<()> {
    let app = build_test_app().await?;
    let kari = app.user("kari")?;

    let profile = app
        .server
        .get("/api/v1/me/profile")
        .add_header("Authorization", kari.bearer())
        .await;
    profile.assert_status_ok();
    let body: Value = profile.json();
    assert_eq!(body["data"]["username"], "kari");
    assert_eq!(body["data"]["id"], kari.id());

    let updated = app
        .server
        .put("/api/v1/me/profile")
        .add_header("Authorization", kari.bearer())
        .json(&json!({ "full_name": "Kari Nordmann" }))
        .await;
    updated.assert_status_ok();
    assert_eq!(updated.json::<Value>()["data"]["full_name"], "Kari Nordmann");
    Ok(())
}

#[tokio::test]
async fn deleting_an_account_removes_everything() -> Result<()> {
    let app = build_test_app().await?;
    let kari = app.user("kari")?;
    let ola = app.user("ola")?;
    let first = app.upload(&kari, upload_body("En", 2, 1)).await;
    app.upload(&kari, upload_body("To", 2, 1)).await;
    app.upload(&ola, upload_body("Tre", 2, 1)).await;

    // Materialize a preview copy so it has to be cleaned up too.
    let id = first["id"].as_str().unwrap();
    let preview: Value = app
        .server
        .get(&format!("/api/v1/documents/{id}/preview"))
        .add_header("Authorization", ola.bearer())
        .await
        .json();
    let preview_url = preview["data"]["url"].as_str().unwrap().to_string();

    let deleted = app
        .server
        .delete("/api/v1/me")
        .add_header("Authorization", kari.bearer())
        .await;
    deleted.assert_status_ok();
    let body: Value = deleted.json();
    assert_eq!(body["data"]["documents_removed"], 2);
    assert_eq!(body["data"]["profile_removed"], true);

    let catalog: Value = app.server.get("/api/v1/documents").await.json();
    assert_eq!(catalog["data"]["total"], 1);
    assert_eq!(catalog["data"]["documents"][0]["title"], "Tre");

    app.fetch_signed(&preview_url)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let after = app
        .server
        .get("/api/v1/me/profile")
        .add_header("Authorization", kari.bearer())
        .await;
    after.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn statistics_summarize_the_catalog() -> Result<()> {
    let app = build_test_app().await?;
    let kari = app.user("kari")?;
    app.upload(&kari, upload_body("En", 2, 1)).await;
    let mut other = upload_body("To", 2, 1);
    other["university"] = json!("NTNU");
    other["price"] = json!(51);
    app.upload(&kari, other).await;

    let stats = app.server.get("/api/v1/statistics").await;
    stats.assert_status_ok();
    let body: Value = stats.json();
    assert_eq!(body["data"]["total_documents"], 2);
    assert_eq!(body["data"]["documents_this_month"], 2);
    assert_eq!(body["data"]["unique_universities"], 2);
    assert_eq!(body["data"]["average_price"], 75.0);
    Ok(())
}

#[tokio::test]
async fn oversized_uploads_are_rejected() -> Result<()> {
    let app = build_test_app().await?;
    let kari = app.user("kari")?;
    let mut bytes = sample_pdf(1);
    bytes.resize(1024 * 1024 + 1, b' ');

    let mut body = upload_body("Stor fil", 1, 1);
    body["file_base64"] = json!(base64::Engine::encode(
        &base64::engine::general_purpose::STANDARD,
        &bytes
    ));
    let response = app
        .server
        .post("/api/v1/documents")
        .add_header("Authorization", kari.bearer())
        .json(&body)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}
