/// Subscription endpoints
///
/// All routes live under `/api/v1/subscriptions` and address a single record
/// through the `id` query parameter:
///
/// ```text
/// POST   /api/v1/subscriptions               create
/// GET    /api/v1/subscriptions[?id=]         read one, or list all
/// PUT    /api/v1/subscriptions?id=           partial update
/// DELETE /api/v1/subscriptions?id=           delete
/// GET    /api/v1/subscriptions/calculate     total cost with filters
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::QueryPairs,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use subtrack_shared::models::subscription::{
    CostFilter, CreateSubscriptionRequest, Subscription, UpdateSubscriptionRequest,
};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// `?id=` selector shared by read, update and delete
#[derive(Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IdQuery {
    /// Subscription ID (UUID)
    pub id: Option<String>,
}

impl IdQuery {
    fn non_empty(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    fn required(&self) -> ApiResult<&str> {
        self.non_empty().ok_or(ApiError::MissingParameter("id"))
    }
}

impl From<&QueryPairs> for IdQuery {
    fn from(pairs: &QueryPairs) -> Self {
        IdQuery {
            id: pairs.first_owned("id"),
        }
    }
}

/// Cost filters from the query string, first value of each key
fn cost_filter(pairs: &QueryPairs) -> CostFilter {
    CostFilter {
        user_id: pairs.first_owned("user_id"),
        service_name: pairs.first_owned("service_name"),
        start_date: pairs.first_owned("start_date"),
        end_date: pairs.first_owned("end_date"),
    }
}

/// Delete confirmation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    #[schema(example = "Subscription deleted successfully")]
    pub message: String,
}

/// Result of the cost aggregation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TotalCostResponse {
    /// Sum of `price` over matching subscriptions
    #[schema(example = 600)]
    pub total: i64,
}

/// A string that is not a UUID can't name a stored record
fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(raw.to_string()))
}

/// Create a subscription
#[utoipa::path(
    post,
    path = "/api/v1/subscriptions",
    tag = "subscriptions",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 200, description = "Created subscription", body = Subscription),
        (status = 400, description = "Malformed body, failed validation or bad date", body = crate::error::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_subscription(
    State(state): State<AppState>,
    payload: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> ApiResult<Json<Subscription>> {
    let Json(req) = payload?;
    let data = req.validate()?;

    let sub = state
        .repo
        .create(data)
        .await
        .map_err(ApiError::storage("Failed to create subscription"))?;

    tracing::info!(
        subscription_id = %sub.id,
        user_id = %sub.user_id,
        service_name = %sub.service_name,
        "Subscription created"
    );

    Ok(Json(sub))
}

/// Get one subscription by `id`, or all of them when `id` is absent
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions",
    tag = "subscriptions",
    params(IdQuery),
    responses(
        (status = 200, description = "The subscription, or every subscription when no id is given", body = [Subscription]),
        (status = 404, description = "Subscription not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_subscriptions(
    State(state): State<AppState>,
    pairs: QueryPairs,
) -> ApiResult<Response> {
    let query = IdQuery::from(&pairs);
    let Some(raw) = query.non_empty() else {
        let subs = state
            .repo
            .list()
            .await
            .map_err(ApiError::storage("Failed to fetch subscriptions"))?;

        tracing::debug!(count = subs.len(), "Listed subscriptions");
        return Ok(Json(subs).into_response());
    };

    let id = parse_id(raw)?;
    let sub = state
        .repo
        .find_by_id(id)
        .await
        .map_err(ApiError::storage("Failed to fetch subscriptions"))?
        .ok_or_else(|| ApiError::NotFound(raw.to_string()))?;

    Ok(Json(sub).into_response())
}

/// Update only the supplied fields of a subscription
///
/// An empty body returns the current record unchanged. Every supplied value
/// is validated before anything is written.
#[utoipa::path(
    put,
    path = "/api/v1/subscriptions",
    tag = "subscriptions",
    params(IdQuery),
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Updated subscription", body = Subscription),
        (status = 400, description = "Missing id, malformed body or invalid value", body = crate::error::ErrorResponse),
        (status = 404, description = "Subscription not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_subscription(
    State(state): State<AppState>,
    pairs: QueryPairs,
    payload: Result<Json<UpdateSubscriptionRequest>, JsonRejection>,
) -> ApiResult<Json<Subscription>> {
    let query = IdQuery::from(&pairs);
    let raw = query.required()?;
    let Json(req) = payload?;
    let changes = req.validate()?;
    let id = parse_id(raw)?;

    let sub = state
        .repo
        .patch(id, changes)
        .await
        .map_err(ApiError::storage("Failed to update subscription"))?
        .ok_or_else(|| ApiError::NotFound(raw.to_string()))?;

    tracing::info!(subscription_id = %sub.id, "Subscription updated");
    Ok(Json(sub))
}

/// Delete a subscription
#[utoipa::path(
    delete,
    path = "/api/v1/subscriptions",
    tag = "subscriptions",
    params(IdQuery),
    responses(
        (status = 200, description = "Subscription deleted", body = DeleteResponse),
        (status = 400, description = "Missing id", body = crate::error::ErrorResponse),
        (status = 404, description = "Subscription not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_subscription(
    State(state): State<AppState>,
    pairs: QueryPairs,
) -> ApiResult<Json<DeleteResponse>> {
    let query = IdQuery::from(&pairs);
    let raw = query.required()?;
    let id = parse_id(raw)?;

    let deleted = state
        .repo
        .delete(id)
        .await
        .map_err(ApiError::storage("Failed to delete subscription"))?;

    if !deleted {
        return Err(ApiError::NotFound(raw.to_string()));
    }

    tracing::info!(subscription_id = %id, "Subscription deleted");
    Ok(Json(DeleteResponse {
        message: "Subscription deleted successfully".to_string(),
    }))
}

/// Total cost of the subscriptions matching every supplied filter
///
/// `start_date` and `end_date` both bound the subscription's start date.
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/calculate",
    tag = "subscriptions",
    params(CostFilter),
    responses(
        (status = 200, description = "Total cost", body = TotalCostResponse),
        (status = 500, description = "Storage failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn calculate_total_cost(
    State(state): State<AppState>,
    pairs: QueryPairs,
) -> ApiResult<Json<TotalCostResponse>> {
    let filter = cost_filter(&pairs);
    let total = state
        .repo
        .total_cost(&filter)
        .await
        .map_err(ApiError::storage("Failed to count"))?;

    tracing::debug!(?filter, total, "Calculated total cost");
    Ok(Json(TotalCostResponse { total }))
}
