//! Subscription model and database operations
//!
//! A subscription is a billing record for a user's paid service over a
//! month range. Dates are kept as `MM-YYYY` text exactly as clients send them.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE subscriptions (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     service_name TEXT NOT NULL CHECK (service_name <> ''),
//!     price BIGINT NOT NULL CHECK (price > 0),
//!     user_id UUID NOT NULL,
//!     start_date VARCHAR(7) NOT NULL,
//!     end_date VARCHAR(7),
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use subtrack_shared::models::subscription::{CreateSubscription, Subscription};
//! use subtrack_shared::db::pool::{create_pool, DatabaseConfig};
//! use uuid::Uuid;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! let sub = Subscription::create(&pool, CreateSubscription {
//!     service_name: "Yandex Plus".to_string(),
//!     price: 400,
//!     user_id: Uuid::new_v4(),
//!     start_date: "07-2025".to_string(),
//!     end_date: None,
//! }).await?;
//!
//! let found = Subscription::find_by_id(&pool, sub.id).await?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::validation::{
    check_non_empty, check_non_nil, check_positive, validate_month_year, InputError,
    ValidationErrors,
};

/// A stored subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Subscription {
    /// Server-generated ID
    pub id: Uuid,

    /// Name of the paid service
    #[schema(example = "Yandex Plus")]
    pub service_name: String,

    /// Monthly price, always greater than zero
    #[schema(example = 400)]
    pub price: i64,

    /// Owning user (opaque)
    pub user_id: Uuid,

    /// First month, `MM-YYYY`
    #[schema(example = "07-2025")]
    pub start_date: String,

    /// Last month, `MM-YYYY`; absent for open-ended subscriptions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Body of a create request, as received
///
/// Every field is optional at this level so that a missing field is reported
/// as a validation failure rather than a malformed body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    #[schema(example = "Yandex Plus")]
    pub service_name: Option<String>,

    #[schema(example = 400)]
    pub price: Option<i64>,

    pub user_id: Option<Uuid>,

    #[schema(example = "07-2025")]
    pub start_date: Option<String>,

    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

/// Validated input for inserting a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSubscription {
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: String,
    pub end_date: Option<String>,
}

impl CreateSubscriptionRequest {
    /// Checks required fields, then date formats
    ///
    /// All missing or invalid required fields are reported together. Date
    /// checks only run once the required fields pass. An empty `end_date`
    /// is treated as absent.
    pub fn validate(self) -> Result<CreateSubscription, InputError> {
        let service_name = self.service_name.unwrap_or_default();
        let price = self.price.unwrap_or_default();
        let user_id = self.user_id.unwrap_or_default();
        let start_date = self.start_date.unwrap_or_default();

        let mut errors = ValidationErrors::new();
        check_non_empty(&mut errors, "service_name", &service_name);
        check_positive(&mut errors, "price", price);
        check_non_nil(&mut errors, "user_id", &user_id);
        check_non_empty(&mut errors, "start_date", &start_date);
        errors.into_result()?;

        validate_month_year(&start_date)?;

        let end_date = self.end_date.filter(|d| !d.is_empty());
        if let Some(end_date) = &end_date {
            validate_month_year(end_date)?;
        }

        Ok(CreateSubscription {
            service_name,
            price,
            user_id,
            start_date,
            end_date,
        })
    }
}

/// Body of a partial update, as received
///
/// Omitted fields (and explicit `null`s) leave the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateSubscriptionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    /// An empty string clears the end date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Validated set of changes for one subscription
///
/// `None` means "leave as is". For `end_date`, `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSubscription {
    pub service_name: Option<String>,
    pub price: Option<i64>,
    pub user_id: Option<Uuid>,
    pub start_date: Option<String>,
    pub end_date: Option<Option<String>>,
}

impl UpdateSubscription {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.service_name.is_none()
            && self.price.is_none()
            && self.user_id.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

impl UpdateSubscriptionRequest {
    /// Validates every supplied field before anything is written
    ///
    /// Supplied values must still satisfy the model invariants. Each
    /// supplied date is checked on its own and the first bad one rejects
    /// the whole update.
    pub fn validate(self) -> Result<UpdateSubscription, InputError> {
        let mut errors = ValidationErrors::new();
        if let Some(service_name) = &self.service_name {
            check_non_empty(&mut errors, "service_name", service_name);
        }
        if let Some(price) = self.price {
            check_positive(&mut errors, "price", price);
        }
        if let Some(user_id) = &self.user_id {
            check_non_nil(&mut errors, "user_id", user_id);
        }
        if let Some(start_date) = &self.start_date {
            check_non_empty(&mut errors, "start_date", start_date);
        }
        errors.into_result()?;

        if let Some(start_date) = &self.start_date {
            validate_month_year(start_date)?;
        }
        if let Some(end_date) = &self.end_date {
            validate_month_year(end_date)?;
        }

        Ok(UpdateSubscription {
            service_name: self.service_name,
            price: self.price,
            user_id: self.user_id,
            start_date: self.start_date,
            end_date: self
                .end_date
                .map(|d| if d.is_empty() { None } else { Some(d) }),
        })
    }
}

/// Optional filters for the cost aggregation, as received in the query string
///
/// Empty values are ignored. Note that `end_date` bounds the subscription's
/// *start* date, not its end date.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CostFilter {
    /// Exact owner match (UUID)
    pub user_id: Option<String>,

    /// Exact service name match
    pub service_name: Option<String>,

    /// Inclusive lower bound on `start_date` (`MM-YYYY`)
    pub start_date: Option<String>,

    /// Inclusive upper bound on `start_date` (`MM-YYYY`)
    pub end_date: Option<String>,
}

/// Normalised cost filter, ready to be matched or turned into SQL
///
/// Date bounds compare the `MM-YYYY` text byte by byte, so ordering is by
/// month first and only then by year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostCriteria<'a> {
    pub user_id: Option<Uuid>,
    pub service_name: Option<&'a str>,
    pub start_from: Option<&'a str>,
    pub start_until: Option<&'a str>,
}

/// A filter value the store cannot compare against its column
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// `user_id` is not a UUID
    #[error("invalid input syntax for type uuid: \"{0}\"")]
    InvalidUserId(String),
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl CostFilter {
    /// Drops empty values and parses the owner ID
    ///
    /// An owner ID that is not a UUID is an error, the same way the
    /// `uuid` column rejects it in SQL.
    pub fn criteria(&self) -> Result<CostCriteria<'_>, FilterError> {
        let user_id = match non_empty(&self.user_id) {
            Some(raw) => Some(
                Uuid::parse_str(raw).map_err(|_| FilterError::InvalidUserId(raw.to_string()))?,
            ),
            None => None,
        };

        Ok(CostCriteria {
            user_id,
            service_name: non_empty(&self.service_name),
            start_from: non_empty(&self.start_date),
            start_until: non_empty(&self.end_date),
        })
    }
}

impl CostCriteria<'_> {
    /// Whether a subscription falls under every active filter
    pub fn matches(&self, sub: &Subscription) -> bool {
        self.user_id.map_or(true, |id| sub.user_id == id)
            && self.service_name.map_or(true, |name| sub.service_name == name)
            && self
                .start_from
                .map_or(true, |from| sub.start_date.as_str() >= from)
            && self
                .start_until
                .map_or(true, |until| sub.start_date.as_str() <= until)
    }

    /// Appends ` AND ...` conditions for every active filter
    ///
    /// Dates compare under the `C` collation so the database orders them
    /// byte by byte, exactly like [`CostCriteria::matches`].
    pub fn push_conditions<'q>(&self, qb: &mut QueryBuilder<'q, Postgres>) {
        if let Some(user_id) = self.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(service_name) = self.service_name {
            qb.push(" AND service_name = ")
                .push_bind(service_name.to_string());
        }
        if let Some(from) = self.start_from {
            qb.push(" AND start_date COLLATE \"C\" >= ")
                .push_bind(from.to_string());
        }
        if let Some(until) = self.start_until {
            qb.push(" AND start_date COLLATE \"C\" <= ")
                .push_bind(until.to_string());
        }
    }
}

const RETURNING_COLUMNS: &str =
    " RETURNING id, service_name, price, user_id, start_date, end_date, created_at, updated_at";

impl Subscription {
    /// Inserts a subscription; the database assigns `id` and timestamps
    pub async fn create(pool: &PgPool, data: CreateSubscription) -> Result<Self, sqlx::Error> {
        let sub = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (service_name, price, user_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, service_name, price, user_id, start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(data.service_name)
        .bind(data.price)
        .bind(data.user_id)
        .bind(data.start_date)
        .bind(data.end_date)
        .fetch_one(pool)
        .await?;

        Ok(sub)
    }

    /// Finds a subscription by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sub = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, service_name, price, user_id, start_date, end_date, created_at, updated_at
            FROM subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(sub)
    }

    /// Lists every subscription in insertion order
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let subs = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, service_name, price, user_id, start_date, end_date, created_at, updated_at
            FROM subscriptions
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(subs)
    }

    /// Applies the supplied changes in a single statement
    ///
    /// Returns `None` when no row has the given ID. Callers must not pass an
    /// empty change set (see [`UpdateSubscription::is_empty`]); it would
    /// only bump `updated_at`.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateSubscription,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE subscriptions SET updated_at = NOW()");

        if let Some(service_name) = data.service_name {
            qb.push(", service_name = ").push_bind(service_name);
        }
        if let Some(price) = data.price {
            qb.push(", price = ").push_bind(price);
        }
        if let Some(user_id) = data.user_id {
            qb.push(", user_id = ").push_bind(user_id);
        }
        if let Some(start_date) = data.start_date {
            qb.push(", start_date = ").push_bind(start_date);
        }
        match data.end_date {
            Some(Some(end_date)) => {
                qb.push(", end_date = ").push_bind(end_date);
            }
            Some(None) => {
                qb.push(", end_date = NULL");
            }
            None => {}
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.push(RETURNING_COLUMNS);

        let sub = qb
            .build_query_as::<Subscription>()
            .fetch_optional(pool)
            .await?;

        Ok(sub)
    }

    /// Deletes a subscription, returning whether a row was removed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Sums `price` over the subscriptions matching `criteria`
    ///
    /// Returns 0 when nothing matches.
    pub async fn total_cost(pool: &PgPool, criteria: &CostCriteria<'_>) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COALESCE(SUM(price), 0)::BIGINT FROM subscriptions WHERE TRUE",
        );
        criteria.push_conditions(&mut qb);

        let total = qb.build_query_scalar::<i64>().fetch_one(pool).await?;

        Ok(total)
    }
}
