//! In-memory repository
//!
//! Keeps rows in insertion order behind a `tokio` read-write lock. Filtering
//! uses the same [`CostCriteria`](crate::models::subscription::CostCriteria)
//! as the SQL implementation, so date bounds compare text exactly like
//! PostgreSQL does under the `C` collation.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepositoryError, SubscriptionRepository};
use crate::models::subscription::{CostFilter, CreateSubscription, Subscription, UpdateSubscription};

#[derive(Debug, Default)]
pub struct InMemorySubscriptionRepository {
    rows: RwLock<Vec<Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(&self, data: CreateSubscription) -> Result<Subscription, RepositoryError> {
        let now = Utc::now();
        let sub = Subscription {
            id: Uuid::new_v4(),
            service_name: data.service_name,
            price: data.price,
            user_id: data.user_id,
            start_date: data.start_date,
            end_date: data.end_date,
            created_at: now,
            updated_at: now,
        };

        self.rows.write().await.push(sub.clone());
        Ok(sub)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>, RepositoryError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|s| s.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Subscription>, RepositoryError> {
        Ok(self.rows.read().await.clone())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UpdateSubscription,
    ) -> Result<Option<Subscription>, RepositoryError> {
        let mut rows = self.rows.write().await;
        let Some(sub) = rows.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        if let Some(service_name) = changes.service_name {
            sub.service_name = service_name;
        }
        if let Some(price) = changes.price {
            sub.price = price;
        }
        if let Some(user_id) = changes.user_id {
            sub.user_id = user_id;
        }
        if let Some(start_date) = changes.start_date {
            sub.start_date = start_date;
        }
        if let Some(end_date) = changes.end_date {
            sub.end_date = end_date;
        }
        sub.updated_at = Utc::now();

        Ok(Some(sub.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|s| s.id != id);
        Ok(rows.len() < before)
    }

    async fn total_cost(&self, filter: &CostFilter) -> Result<i64, RepositoryError> {
        let criteria = filter.criteria()?;

        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|s| criteria.matches(s))
            .map(|s| s.price)
            .sum())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_sub(user_id: Uuid, price: i64, start_date: &str) -> CreateSubscription {
        CreateSubscription {
            service_name: "Netflix".to_string(),
            price,
            user_id,
            start_date: start_date.to_string(),
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemorySubscriptionRepository::new();
        let user = Uuid::new_v4();

        let created = repo.create(new_sub(user, 100, "01-2025")).await.unwrap();
        let found = repo.find_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(found, created);
        assert_eq!(found.created_at, found.updated_at);
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let repo = InMemorySubscriptionRepository::new();
        let user = Uuid::new_v4();
        let first = repo.create(new_sub(user, 1, "01-2025")).await.unwrap();
        let second = repo.create(new_sub(user, 2, "02-2025")).await.unwrap();

        let ids: Vec<_> = repo.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_patch_touches_only_supplied_fields() {
        let repo = InMemorySubscriptionRepository::new();
        let user = Uuid::new_v4();
        let created = repo.create(new_sub(user, 100, "01-2025")).await.unwrap();

        let updated = repo
            .patch(
                created.id,
                UpdateSubscription {
                    price: Some(150),
                    end_date: Some(Some("12-2025".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.price, 150);
        assert_eq!(updated.end_date.as_deref(), Some("12-2025"));
        assert_eq!(updated.service_name, created.service_name);
        assert_eq!(updated.user_id, created.user_id);
        assert_eq!(updated.start_date, created.start_date);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_patch_clears_end_date() {
        let repo = InMemorySubscriptionRepository::new();
        let mut data = new_sub(Uuid::new_v4(), 100, "01-2025");
        data.end_date = Some("06-2025".to_string());
        let created = repo.create(data).await.unwrap();

        let updated = repo
            .patch(
                created.id,
                UpdateSubscription {
                    end_date: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.end_date, None);
    }

    #[tokio::test]
    async fn test_patch_empty_returns_current() {
        let repo = InMemorySubscriptionRepository::new();
        let created = repo.create(new_sub(Uuid::new_v4(), 100, "01-2025")).await.unwrap();

        let current = repo
            .patch(created.id, UpdateSubscription::default())
            .await
            .unwrap();
        assert_eq!(current, Some(created));

        let missing = repo
            .patch(Uuid::new_v4(), UpdateSubscription::default())
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_update_unknown_id_does_not_insert() {
        let repo = InMemorySubscriptionRepository::new();

        let result = repo
            .update(
                Uuid::new_v4(),
                UpdateSubscription {
                    price: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemorySubscriptionRepository::new();
        let created = repo.create(new_sub(Uuid::new_v4(), 100, "01-2025")).await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.find_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_total_cost_scenarios() {
        let repo = InMemorySubscriptionRepository::new();
        assert_eq!(repo.total_cost(&CostFilter::default()).await.unwrap(), 0);

        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        for (price, date) in [(100, "01-2024"), (200, "02-2024"), (300, "03-2024")] {
            repo.create(new_sub(first, price, date)).await.unwrap();
        }
        for (price, date) in [(101, "01-2024"), (202, "02-2024"), (303, "03-2024")] {
            repo.create(new_sub(second, price, date)).await.unwrap();
        }

        assert_eq!(repo.total_cost(&CostFilter::default()).await.unwrap(), 1206);

        let by_owner = CostFilter {
            user_id: Some(second.to_string()),
            ..Default::default()
        };
        assert_eq!(repo.total_cost(&by_owner).await.unwrap(), 606);

        let from_february = CostFilter {
            user_id: Some(second.to_string()),
            start_date: Some("02-2024".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.total_cost(&from_february).await.unwrap(), 505);

        let until_february = CostFilter {
            user_id: Some(second.to_string()),
            end_date: Some("02-2024".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.total_cost(&until_february).await.unwrap(), 303);

        let unknown_service = CostFilter {
            service_name: Some("Spotify".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.total_cost(&unknown_service).await.unwrap(), 0);

        let malformed_owner = CostFilter {
            user_id: Some("not-a-uuid".to_string()),
            ..Default::default()
        };
        assert_eq!(
            repo.total_cost(&malformed_owner).await,
            Err(RepositoryError::Storage(
                "invalid input syntax for type uuid: \"not-a-uuid\"".to_string()
            ))
        );
    }
}
