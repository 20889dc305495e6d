/// Query string extraction
///
/// `axum::extract::Query` deserializes straight into a struct, which
/// rejects a key given twice (`?id=a&id=b`) with a plain-text 400.
/// [`QueryPairs`] keeps every pair in order instead, so handlers can take the
/// first value of each key, and reports undecodable input as an [`ApiError`].

use axum::{
    async_trait,
    extract::{rejection::QueryRejection, FromRequestParts, Query},
    http::request::Parts,
};

use crate::error::ApiError;

/// Raw `key=value` pairs of the query string, in request order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPairs(pub Vec<(String, String)>);

impl QueryPairs {
    /// First value given for `key`
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Owned copy of [`QueryPairs::first`]
    pub fn first_owned(&self, key: &str) -> Option<String> {
        self.first(key).map(str::to_string)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for QueryPairs
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state).await?;
        Ok(QueryPairs(pairs))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedQuery(rejection.body_text())
    }
}
