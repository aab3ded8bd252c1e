//! Budget API clients built on the intercepted [`HttpClient`].

mod account;
mod resources;

use ledger_domain::budget::{
    Budget, BudgetCategory, DailySpending, Income, MiscellaneousCost, Period,
};

pub use account::{AccountApi, SIGNUP_PATH};
pub use resources::ResourceApi;

use crate::http::HttpClient;

/// Every collection of the budget API behind one client.
#[derive(Debug, Clone)]
pub struct BudgetApi {
    /// Budget periods.
    pub periods: ResourceApi<Period>,
    /// Income entries.
    pub incomes: ResourceApi<Income>,
    /// Budget categories.
    pub categories: ResourceApi<BudgetCategory>,
    /// Budget lines.
    pub budgets: ResourceApi<Budget>,
    /// Daily house spending entries.
    pub spendings: ResourceApi<DailySpending>,
    /// Miscellaneous costs.
    pub misc_costs: ResourceApi<MiscellaneousCost>,
    /// Account endpoints.
    pub account: AccountApi,
}

impl BudgetApi {
    /// Builds every collection client over `client`.
    #[must_use]
    pub fn new(client: &HttpClient) -> Self {
        Self {
            periods: ResourceApi::new(client.clone()),
            incomes: ResourceApi::new(client.clone()),
            categories: ResourceApi::new(client.clone()),
            budgets: ResourceApi::new(client.clone()),
            spendings: ResourceApi::new(client.clone()),
            misc_costs: ResourceApi::new(client.clone()),
            account: AccountApi::new(client.clone()),
        }
    }
}

/// Scripted transport shared by the service tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;

    use ledger_domain::{ApiRequest, ApiResponse};
    use parking_lot::Mutex;

    use crate::http::HttpClient;
    use crate::ports::{Transport, TransportError};

    /// Answers with scripted responses in order and records what was sent.
    #[derive(Default)]
    pub struct Scripted {
        responses: Mutex<VecDeque<ApiResponse>>,
        sent: Mutex<Vec<ApiRequest>>,
    }

    impl Scripted {
        pub fn client(responses: impl IntoIterator<Item = ApiResponse>) -> (Arc<Self>, HttpClient) {
            let transport = Arc::new(Self {
                responses: Mutex::new(responses.into_iter().collect()),
                sent: Mutex::default(),
            });
            let client = HttpClient::new(transport.clone());
            (transport, client)
        }

        pub fn sent(&self) -> Vec<ApiRequest> {
            self.sent.lock().clone()
        }
    }

    impl Transport for Scripted {
        fn send<'a>(
            &'a self,
            request: &'a ApiRequest,
        ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + Send + 'a>>
        {
            self.sent.lock().push(request.clone());
            let next = self
                .responses
                .lock()
                .pop_front()
                .ok_or_else(|| TransportError::Other("script exhausted".to_string()));
            Box::pin(async move { next })
        }
    }
}
