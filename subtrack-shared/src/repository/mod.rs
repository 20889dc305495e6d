//! Persistence access for subscriptions
//!
//! Handlers talk to storage only through [`SubscriptionRepository`]. The
//! repository is constructed once at startup and passed around explicitly
//! (in the API it sits in the router state), never held in a global.
//!
//! Implementations:
//!
//! - [`postgres::PgSubscriptionRepository`]: production, backed by sqlx
//! - [`memory::InMemorySubscriptionRepository`]: process-local, for tests and
//!   local experiments
//!
//! # Example
//!
//! ```
//! use subtrack_shared::models::subscription::{CostFilter, CreateSubscription};
//! use subtrack_shared::repository::{memory::InMemorySubscriptionRepository, SubscriptionRepository};
//! use uuid::Uuid;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), subtrack_shared::repository::RepositoryError> {
//! let repo = InMemorySubscriptionRepository::new();
//! repo.create(CreateSubscription {
//!     service_name: "Netflix".to_string(),
//!     price: 100,
//!     user_id: Uuid::new_v4(),
//!     start_date: "01-2025".to_string(),
//!     end_date: None,
//! })
//! .await?;
//!
//! assert_eq!(repo.total_cost(&CostFilter::default()).await?, 100);
//! # Ok(())
//! # }
//! ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::subscription::{
    CostFilter, CreateSubscription, FilterError, Subscription, UpdateSubscription,
};

/// Storage failure, carrying the driver's message unchanged
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0}")]
    Storage(String),
}

impl From<FilterError> for RepositoryError {
    fn from(err: FilterError) -> Self {
        RepositoryError::Storage(err.to_string())
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Storage(err.to_string())
    }
}

/// CRUD and aggregation over subscriptions
///
/// Every method is a single independent operation; there is no versioning,
/// so concurrent updates to one record resolve as last writer wins.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Stores a validated subscription and returns it with ID and timestamps
    async fn create(&self, data: CreateSubscription) -> Result<Subscription, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>, RepositoryError>;

    /// Every subscription, in insertion order
    async fn list(&self) -> Result<Vec<Subscription>, RepositoryError>;

    /// Applies a non-empty change set; `None` if the ID is unknown
    async fn update(
        &self,
        id: Uuid,
        changes: UpdateSubscription,
    ) -> Result<Option<Subscription>, RepositoryError>;

    /// Hard delete; `false` if nothing matched
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// Sum of `price` over matching subscriptions, 0 if none match
    ///
    /// A filter value the store cannot compare (a `user_id` that is not a
    /// UUID) fails with [`RepositoryError::Storage`].
    async fn total_cost(&self, filter: &CostFilter) -> Result<i64, RepositoryError>;

    /// Checks that storage is reachable
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Partial update entry point
    ///
    /// An empty change set writes nothing and returns the current record.
    /// Otherwise the changes are applied with [`update`](Self::update).
    /// Either way `None` means the ID is unknown; records are never created
    /// here.
    async fn patch(
        &self,
        id: Uuid,
        changes: UpdateSubscription,
    ) -> Result<Option<Subscription>, RepositoryError> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        self.update(id, changes).await
    }
}
