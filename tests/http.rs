mod common;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use common::{router, send, Reply, ScriptedStore};
use master_crud::{Record, Scalar};
use serde_json::json;

fn customer_row(id: i64, kode: &str, nama: &str) -> Record {
    let t = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    Record::new()
        .with("id", Scalar::Int(id))
        .with("kode", Scalar::Text(kode.into()))
        .with("nama", Scalar::Text(nama.into()))
        .with("alamat", Scalar::Null)
        .with("telepon", Scalar::Null)
        .with("email", Scalar::Null)
        .with("created_at", Scalar::Timestamp(t))
        .with("updated_at", Scalar::Timestamp(t))
        .with("deleted_at", Scalar::Null)
}

#[tokio::test]
async fn create_returns_created_row() {
    let store = ScriptedStore::new(vec![Reply::Row(Some(customer_row(1, "C1", "Alice")))]);
    let body = r#"{"kode":"C1","nama":"Alice","id":77,"created_at":"1999-01-01T00:00:00Z","unknown":true}"#;
    let (status, json) = send(router(store.clone()), "POST", "/customer", Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["id"], 1);
    assert_eq!(json["kode"], "C1");
    assert_eq!(json["nama"], "Alice");
    assert!(json["created_at"].is_string());

    let calls = store.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].sql.starts_with(
        "INSERT INTO \"customer\" (\"kode\", \"nama\", \"created_at\", \"updated_at\") VALUES ($1::text, $2::text, NOW(), NOW())"
    ));
    assert_eq!(
        calls[0].params,
        vec![Scalar::Text("C1".into()), Scalar::Text("Alice".into())]
    );
}

#[tokio::test]
async fn wide_numeric_passes_through_unrounded() {
    let row = Record::new()
        .with("id", Scalar::Int(2))
        .with("kode", Scalar::Text("P2".into()))
        .with("nama", Scalar::Text("Emas".into()))
        .with("harga", Scalar::Decimal("12345678901234567.89".into()));
    let store = ScriptedStore::new(vec![Reply::Row(Some(row))]);
    let body = r#"{"kode":"P2","nama":"Emas","harga":12345678901234567.89}"#;
    let (status, json) = send(router(store.clone()), "POST", "/produk", Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["harga"].to_string(), "12345678901234567.89");
    let calls = store.calls();
    assert!(calls[0].sql.contains("$3::numeric"));
    assert!(calls[0].sql.contains("\"harga\"::text AS \"harga\""));
    assert_eq!(calls[0].params[2], Scalar::Decimal("12345678901234567.89".into()));
}

#[tokio::test]
async fn hook_rejection_skips_store() {
    let store = ScriptedStore::new(vec![]);
    let body = r#"{"kode":"U1","nama":"Al","email":"al@example.com","tanggal_lahir":"1990-01-01"}"#;
    let (status, json) = send(router(store.clone()), "POST", "/users", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("nama must be at least 3 characters"));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let store = ScriptedStore::new(vec![]);
    let (status, json) = send(router(store.clone()), "POST", "/customer", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "bad_request");

    let (status, _) = send(router(store.clone()), "POST", "/customer", Some("[1,2]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(router(store.clone()), "PUT", "/produk/1", Some(r#"{"stok":"lots"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn invalid_id_never_reaches_store() {
    let store = ScriptedStore::new(vec![]);
    let (status, _) = send(router(store.clone()), "GET", "/customer/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(router(store.clone()), "DELETE", "/customer/-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn routing_errors() {
    let store = ScriptedStore::new(vec![]);
    let (status, json) = send(router(store.clone()), "GET", "/orders", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");

    let (status, json) = send(router(store.clone()), "POST", "/customer/1", Some("{}")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json["error"]["code"], "method_not_allowed");

    let (status, _) = send(router(store.clone()), "GET", "/customer/1/restore", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = send(router(store.clone()), "PUT", "/customer/1/archive", Some("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn undecodable_path_and_root_use_error_envelope() {
    let store = ScriptedStore::new(vec![]);
    let (status, json) = send(router(store.clone()), "GET", "/customer/%FF", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "bad_request");

    let (status, json) = send(router(store.clone()), "GET", "/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn get_one_missing_row_is_not_found() {
    let store = ScriptedStore::new(vec![Reply::Row(None)]);
    let (status, _) = send(router(store.clone()), "GET", "/customer/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(store.calls()[0].sql.ends_with("WHERE \"id\" = $1::bigint AND \"deleted_at\" IS NULL"));
}

#[tokio::test]
async fn update_without_fields_is_rejected() {
    let store = ScriptedStore::new(vec![]);
    let (status, json) = send(router(store.clone()), "PUT", "/customer/1", Some(r#"{"warna":"biru","id":3}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn update_of_missing_or_deleted_row_is_not_found() {
    let store = ScriptedStore::new(vec![Reply::Row(None)]);
    let (status, _) = send(router(store.clone()), "PUT", "/customer/1", Some(r#"{"nama":"Bob"}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let calls = store.calls();
    assert!(calls[0].sql.contains("\"deleted_at\" IS NULL"));
    assert_eq!(calls[0].params, vec![Scalar::Text("Bob".into()), Scalar::Int(1)]);
}

#[tokio::test]
async fn delete_returns_no_content_or_not_found() {
    let store = ScriptedStore::new(vec![Reply::Affected(1), Reply::Affected(0)]);
    let (status, json) = send(router(store.clone()), "DELETE", "/customer/4", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(json.is_null());

    let (status, _) = send(router(store.clone()), "DELETE", "/customer/4", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn restore_returns_row_or_not_found() {
    let store = ScriptedStore::new(vec![Reply::Row(Some(customer_row(4, "C4", "Dewi"))), Reply::Row(None)]);
    let (status, json) = send(router(store.clone()), "PUT", "/customer/4/restore", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], 4);
    assert!(json["deleted_at"].is_null());

    let (status, _) = send(router(store.clone()), "PATCH", "/customer/5/restore", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(store.calls()[0].sql.starts_with("UPDATE \"customer\" SET \"deleted_at\" = NULL WHERE \"id\" = $1::bigint RETURNING"));
}

#[tokio::test]
async fn list_envelope_with_search_and_clamped_limit() {
    let store = ScriptedStore::new(vec![
        Reply::Count(101),
        Reply::Rows(vec![customer_row(1, "C1", "Alice")]),
    ]);
    let (status, json) = send(router(store.clone()), "GET", "/customer?page=2&limit=500&q=ali", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["page"], 2);
    assert_eq!(json["limit"], 100);
    assert_eq!(json["total_data"], 101);
    assert_eq!(json["total_page"], 2);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let calls = store.calls();
    assert!(calls[0].sql.starts_with("SELECT COUNT(*)"));
    assert_eq!(calls[0].params, vec![Scalar::Text("%ali%".into())]);
    assert_eq!(
        calls[1].params,
        vec![Scalar::Text("%ali%".into()), Scalar::Int(100), Scalar::Int(100)]
    );
}

#[tokio::test]
async fn failed_count_degrades_total() {
    let store = ScriptedStore::new(vec![Reply::Fail, Reply::Rows(vec![customer_row(1, "C1", "Alice")])]);
    let (status, json) = send(router(store.clone()), "GET", "/customer", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_data"], 0);
    assert_eq!(json["total_page"], 0);
    assert_eq!(json["data"][0]["kode"], "C1");
}

#[tokio::test]
async fn store_failure_hides_statement() {
    let store = ScriptedStore::new(vec![Reply::Fail]);
    let (status, json) = send(router(store.clone()), "GET", "/customer/1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"error": {"code": "database_error", "message": "internal database error"}}));
}

#[tokio::test]
async fn operational_routes() {
    let store = ScriptedStore::new(vec![]);
    let (status, json) = send(router(store.clone()), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");

    let (status, json) = send(router(store.clone()), "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["database"], "ok");

    let (_, json) = send(router(store.clone()), "GET", "/version", None).await;
    assert_eq!(json["name"], "master-crud");
}
