use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::routes::health::HealthResponse;
use crate::routes::subscriptions::{DeleteResponse, TotalCostResponse};
use subtrack_shared::models::subscription::{
    CreateSubscriptionRequest, Subscription, UpdateSubscriptionRequest,
};

/// OpenAPI document served at `/api-docs/openapi.json`
#[derive(OpenApi)]
#[openapi(
    info(title = "Subscription CRUDL API", description = "Tracks users' paid subscriptions"),
    paths(
        crate::routes::health::health_check,
        crate::routes::subscriptions::create_subscription,
        crate::routes::subscriptions::get_subscriptions,
        crate::routes::subscriptions::update_subscription,
        crate::routes::subscriptions::delete_subscription,
        crate::routes::subscriptions::calculate_total_cost,
    ),
    components(
        schemas(
            Subscription,
            CreateSubscriptionRequest,
            UpdateSubscriptionRequest,
            DeleteResponse,
            TotalCostResponse,
            HealthResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "health"),
        (name = "subscriptions")
    )
)]
pub struct ApiDoc;
