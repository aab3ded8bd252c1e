//! Typed REST collection clients.

use std::marker::PhantomData;

use ledger_domain::ApiRequest;
use ledger_domain::budget::{Budget, BudgetStatus, Page, Record};
use serde::Serialize;

use crate::error::ApiResult;
use crate::http::HttpClient;

/// Client for one REST collection of `R`.
pub struct ResourceApi<R> {
    client: HttpClient,
    record: PhantomData<fn() -> R>,
}

impl<R: Record> ResourceApi<R> {
    /// Creates a client for `R::COLLECTION`.
    #[must_use]
    pub const fn new(client: HttpClient) -> Self {
        Self {
            client,
            record: PhantomData,
        }
    }

    /// Lists records, accepting both paginated and bare array bodies.
    ///
    /// # Errors
    ///
    /// Returns the API error, or [`ApiError::Decode`](crate::error::ApiError::Decode)
    /// if the body is neither envelope.
    pub async fn list(&self, query: &[(&str, &str)]) -> ApiResult<Vec<R>> {
        let request = query
            .iter()
            .fold(ApiRequest::get(R::COLLECTION)?, |request, (key, value)| {
                request.with_query(*key, *value)
            });
        let page: Page<R> = self.client.json(request).await?;
        Ok(page.into_items())
    }

    /// Lists the records belonging to one period.
    ///
    /// # Errors
    ///
    /// Same as [`ResourceApi::list`].
    pub async fn list_for_period(&self, period: u64) -> ApiResult<Vec<R>> {
        self.list(&[("period", &period.to_string())]).await
    }

    /// Fetches one record.
    ///
    /// # Errors
    ///
    /// Returns the API error, or a decode error for an unexpected body.
    pub async fn get(&self, id: u64) -> ApiResult<R> {
        self.client.json(ApiRequest::get(R::item_path(id))?).await
    }

    /// Creates a record and returns the stored version.
    ///
    /// # Errors
    ///
    /// Returns the API error, or a decode error for an unexpected body.
    pub async fn create(&self, record: &R) -> ApiResult<R> {
        self.client
            .json(ApiRequest::post(R::COLLECTION, record)?)
            .await
    }

    /// Applies a partial update and returns the stored version.
    ///
    /// # Errors
    ///
    /// Returns the API error, or a decode error for an unexpected body.
    pub async fn update<P: Serialize + ?Sized>(&self, id: u64, patch: &P) -> ApiResult<R> {
        self.client
            .json(ApiRequest::patch(R::item_path(id), patch)?)
            .await
    }

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        self.client.send(ApiRequest::delete(R::item_path(id))?).await?;
        Ok(())
    }
}

impl ResourceApi<Budget> {
    /// Sets the payment status of a budget line.
    ///
    /// # Errors
    ///
    /// Same as [`ResourceApi::update`].
    pub async fn set_status(&self, id: u64, status: BudgetStatus) -> ApiResult<Budget> {
        self.update(id, &serde_json::json!({ "status": status })).await
    }
}

impl<R> Clone for ResourceApi<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            record: PhantomData,
        }
    }
}

impl<R> std::fmt::Debug for ResourceApi<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceApi")
            .field("record", &std::any::type_name::<R>())
            .finish_non_exhaustive()
    }
}
