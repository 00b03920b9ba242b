//! Scripted store double: records every statement and replays queued replies.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use master_crud::sql::QueryBuf;
use master_crud::{app, builtin_config, AppError, AppState, EntityDescriptor, Record, Registry, Store};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub enum Reply {
    Row(Option<Record>),
    Rows(Vec<Record>),
    Count(i64),
    Affected(u64),
    Fail,
}

#[derive(Default)]
pub struct ScriptedStore {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<QueryBuf>>,
}

impl ScriptedStore {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(ScriptedStore {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<QueryBuf> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, q: &QueryBuf) -> Reply {
        self.calls.lock().unwrap().push(q.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected statement: {}", q.sql))
    }
}

fn store_failure() -> AppError {
    AppError::Db(sqlx::Error::Protocol("relation \"customer\" does not exist".into()))
}

#[async_trait]
impl Store for ScriptedStore {
    async fn fetch_optional(&self, _entity: &EntityDescriptor, q: &QueryBuf) -> Result<Option<Record>, AppError> {
        match self.next(q) {
            Reply::Row(r) => Ok(r),
            Reply::Fail => Err(store_failure()),
            _ => panic!("fetch_optional got wrong reply for {}", q.sql),
        }
    }

    async fn fetch_all(&self, _entity: &EntityDescriptor, q: &QueryBuf) -> Result<Vec<Record>, AppError> {
        match self.next(q) {
            Reply::Rows(r) => Ok(r),
            Reply::Fail => Err(store_failure()),
            _ => panic!("fetch_all got wrong reply for {}", q.sql),
        }
    }

    async fn fetch_count(&self, q: &QueryBuf) -> Result<i64, AppError> {
        match self.next(q) {
            Reply::Count(n) => Ok(n),
            Reply::Fail => Err(store_failure()),
            _ => panic!("fetch_count got wrong reply for {}", q.sql),
        }
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError> {
        match self.next(q) {
            Reply::Affected(n) => Ok(n),
            Reply::Fail => Err(store_failure()),
            _ => panic!("execute got wrong reply for {}", q.sql),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn router(store: Arc<ScriptedStore>) -> Router {
    let registry = Registry::from_config(&builtin_config()).unwrap();
    app(AppState::new(store, registry))
}

pub async fn send(router: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();
    let resp: Response<Body> = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
