//! Application state shared across all HTTP handlers.

use bookery_core::{
    CatalogService, CatalogStore, Clock, OrderService, OrderStore, UserDirectory,
};
use std::sync::Arc;

/// Services and directories the handlers work against.
#[derive(Clone)]
pub struct AppState {
    /// Checkout and order lifecycle.
    pub orders: Arc<OrderService>,
    /// Catalog browsing and management.
    pub catalog: Arc<CatalogService>,
    /// Bearer-token resolution.
    pub users: Arc<dyn UserDirectory>,
}

impl AppState {
    /// Wires the services over the given stores and clock.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        orders: Arc<dyn OrderStore>,
        users: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders: Arc::new(OrderService::new(
                Arc::clone(&catalog),
                orders,
                Arc::clone(&clock),
            )),
            catalog: Arc::new(CatalogService::new(catalog, clock)),
            users,
        }
    }
}
