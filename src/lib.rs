pub mod api;
pub mod chain;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod projector;
pub mod store;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    Account, Address, Amount, DomainEvent, EventBody, EventMeta, Position, Timestamp, TokenId,
    TxHash, Vault, VaultDeposit,
};
pub use error::AppError;
pub use ingest::{IngestReport, Ingestor};
pub use projector::{Projection, Projector, SkipReason};
pub use store::{get_or_create, EntityStore, Store, StoreError};
