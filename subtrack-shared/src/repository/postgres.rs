//! PostgreSQL-backed repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepositoryError, SubscriptionRepository};
use crate::db::pool::health_check;
use crate::models::subscription::{CostFilter, CreateSubscription, Subscription, UpdateSubscription};

/// Repository over a shared sqlx pool
#[derive(Debug, Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn create(&self, data: CreateSubscription) -> Result<Subscription, RepositoryError> {
        Ok(Subscription::create(&self.pool, data).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>, RepositoryError> {
        Ok(Subscription::find_by_id(&self.pool, id).await?)
    }

    async fn list(&self) -> Result<Vec<Subscription>, RepositoryError> {
        Ok(Subscription::list_all(&self.pool).await?)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UpdateSubscription,
    ) -> Result<Option<Subscription>, RepositoryError> {
        Ok(Subscription::update(&self.pool, id, changes).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        Ok(Subscription::delete(&self.pool, id).await?)
    }

    async fn total_cost(&self, filter: &CostFilter) -> Result<i64, RepositoryError> {
        let criteria = filter.criteria()?;
        Ok(Subscription::total_cost(&self.pool, &criteria).await?)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(health_check(&self.pool).await?)
    }
}
