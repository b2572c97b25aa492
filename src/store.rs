//! Entity store interface.
//!
//! The projector never talks to a database directly; it goes through these
//! traits. The store is opened once per process and passed in explicitly;
//! test scaffolding builds its own against a temporary database.

use crate::domain::{
    identity, Account, Address, AmountLimitsUpdate, FactoryEventRecord, Position, PositionSeed,
    TokenPairUpdate, TreasuryUpdate, Vault, VaultDeposit, VaultDepositSeed,
};
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Error from the persistence backend. Domain conditions (missing entity,
/// clamped counter) are not errors; only backend failures surface here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// A derived entity with a deterministic identity and fully-specified
/// defaults.
pub trait StoredEntity: Send + Sync + Sized {
    /// Inputs needed to name and default-construct the entity.
    type Seed: Send + Sync;

    const KIND: &'static str;

    fn id_for(seed: &Self::Seed) -> String;
    fn with_defaults(seed: Self::Seed) -> Self;
    fn id(&self) -> &str;
}

/// Load/upsert access for one entity kind.
#[async_trait]
pub trait EntityStore<E: StoredEntity>: Send + Sync {
    async fn load(&self, id: &str) -> Result<Option<E>, StoreError>;
    async fn upsert(&self, entity: &E) -> Result<(), StoreError>;
}

/// An immutable audit row.
pub trait AuditRecord: Send + Sync {
    const KIND: &'static str;

    fn event_key(&self) -> &str;
}

/// Append-only access for one audit record kind. Records are never read
/// back or mutated by the projector.
#[async_trait]
pub trait AuditSink<R: AuditRecord>: Send + Sync {
    async fn append(&self, record: &R) -> Result<(), StoreError>;
}

/// The full store surface the projector needs.
pub trait Store:
    EntityStore<Account>
    + EntityStore<Vault>
    + EntityStore<VaultDeposit>
    + EntityStore<Position>
    + AuditSink<TreasuryUpdate>
    + AuditSink<TokenPairUpdate>
    + AuditSink<AmountLimitsUpdate>
    + AuditSink<FactoryEventRecord>
{
}

impl<T> Store for T where
    T: EntityStore<Account>
        + EntityStore<Vault>
        + EntityStore<VaultDeposit>
        + EntityStore<Position>
        + AuditSink<TreasuryUpdate>
        + AuditSink<TokenPairUpdate>
        + AuditSink<AmountLimitsUpdate>
        + AuditSink<FactoryEventRecord>
{
}

/// Get-or-create: the single entity-factory operation.
///
/// Returns the entity and whether it was created on this call. A fresh
/// entity is persisted immediately so its identity is stable for any later
/// lookup within the same or a subsequent event.
pub async fn get_or_create<S, E>(store: &S, seed: E::Seed) -> Result<(E, bool), StoreError>
where
    S: EntityStore<E> + ?Sized,
    E: StoredEntity,
{
    let id = E::id_for(&seed);
    if let Some(existing) = store.load(&id).await? {
        return Ok((existing, false));
    }
    let fresh = E::with_defaults(seed);
    store.upsert(&fresh).await?;
    debug!(kind = E::KIND, id = fresh.id(), "created entity with defaults");
    Ok((fresh, true))
}

impl StoredEntity for Account {
    type Seed = Address;

    const KIND: &'static str = "account";

    fn id_for(seed: &Address) -> String {
        identity::account_id(seed)
    }

    fn with_defaults(seed: Address) -> Self {
        Account::with_defaults(seed)
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl StoredEntity for Vault {
    type Seed = Address;

    const KIND: &'static str = "vault";

    fn id_for(seed: &Address) -> String {
        identity::vault_id(seed)
    }

    fn with_defaults(seed: Address) -> Self {
        Vault::with_defaults(seed)
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl StoredEntity for VaultDeposit {
    type Seed = VaultDepositSeed;

    const KIND: &'static str = "vaultDeposit";

    fn id_for(seed: &VaultDepositSeed) -> String {
        identity::vault_deposit_id(&seed.vault, &seed.account)
    }

    fn with_defaults(seed: VaultDepositSeed) -> Self {
        VaultDeposit::with_defaults(seed)
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl StoredEntity for Position {
    type Seed = PositionSeed;

    const KIND: &'static str = "position";

    fn id_for(seed: &PositionSeed) -> String {
        identity::position_id(&seed.vault, &seed.account, seed.token_id)
    }

    fn with_defaults(seed: PositionSeed) -> Self {
        Position::with_defaults(seed)
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl AuditRecord for TreasuryUpdate {
    const KIND: &'static str = "treasuryUpdate";

    fn event_key(&self) -> &str {
        &self.event_key
    }
}

impl AuditRecord for TokenPairUpdate {
    const KIND: &'static str = "tokenPairUpdate";

    fn event_key(&self) -> &str {
        &self.event_key
    }
}

impl AuditRecord for AmountLimitsUpdate {
    const KIND: &'static str = "amountLimitsUpdate";

    fn event_key(&self) -> &str {
        &self.event_key
    }
}

impl AuditRecord for FactoryEventRecord {
    const KIND: &'static str = "factoryEvent";

    fn event_key(&self) -> &str {
        &self.event_key
    }
}
