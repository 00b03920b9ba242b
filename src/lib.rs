//! Metadata-driven CRUD over registered master tables.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod hooks;
pub mod pagination;
pub mod record;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{builtin_config, load_from_path, EntityDescriptor, RegistryConfig, Registry};
pub use error::{AppError, ConfigError, ValidationError};
pub use hooks::{HookPayload, HookPoint, HookSet};
pub use record::{EntityId, Record, Scalar};
pub use routes::{app, common_routes_with_ready, entity_routes};
pub use service::CrudService;
pub use settings::Settings;
pub use state::AppState;
pub use store::{connect_with_retry, PgStore, Store};
