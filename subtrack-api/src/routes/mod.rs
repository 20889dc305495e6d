/// API route handlers
///
/// - `health`: Health check endpoint
/// - `subscriptions`: Subscription CRUD and cost aggregation

pub mod health;
pub mod subscriptions;
