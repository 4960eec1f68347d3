//! In-memory order store.
//!
//! Same locking discipline as the catalog: one write lock per operation,
//! revision-guarded replacement via [`InMemoryOrders::put`].

use bookery_core::{
    Order, OrderFilter, OrderId, OrderStore, Page, PageRequest, StoreError, StoreFuture, UserId,
};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

struct StoredOrder {
    seq: u64,
    order: Order,
}

/// In-memory implementation of [`OrderStore`].
#[derive(Default)]
pub struct InMemoryOrders {
    orders: RwLock<HashMap<OrderId, StoredOrder>>,
    seq: AtomicU64,
}

impl InMemoryOrders {
    /// Creates an empty order store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn page_of(
        &self,
        filter: impl Fn(&Order) -> bool,
        page: PageRequest,
    ) -> Result<Page<Order>, StoreError> {
        let orders = self.orders.read().await;
        let mut matching: Vec<&StoredOrder> = orders
            .values()
            .filter(|stored| filter(&stored.order))
            .collect();
        // Newest first; the insertion sequence breaks created_at ties.
        matching.sort_by_key(|stored| Reverse((stored.order.created_at(), stored.seq)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset())
            .take(page.limit() as usize)
            .map(|stored| stored.order.clone())
            .collect();
        Ok(Page::new(items, page, total))
    }
}

impl OrderStore for InMemoryOrders {
    fn insert(&self, order: Order) -> StoreFuture<'_, Result<Order, StoreError>> {
        Box::pin(async move {
            let mut orders = self.orders.write().await;
            if orders.contains_key(&order.id()) {
                return Err(StoreError::Duplicate(format!(
                    "Order already exists: {}",
                    order.id()
                )));
            }
            let seq = self.seq.fetch_add(1, Ordering::Relaxed);
            orders.insert(order.id(), StoredOrder {
                seq,
                order: order.clone(),
            });
            Ok(order)
        })
    }

    fn find(&self, id: OrderId) -> StoreFuture<'_, Result<Option<Order>, StoreError>> {
        Box::pin(async move {
            Ok(self
                .orders
                .read()
                .await
                .get(&id)
                .map(|stored| stored.order.clone()))
        })
    }

    fn put(&self, order: Order) -> StoreFuture<'_, Result<Order, StoreError>> {
        Box::pin(async move {
            let mut orders = self.orders.write().await;
            let Some(stored) = orders.get_mut(&order.id()) else {
                return Err(StoreError::Storage(format!("No such order: {}", order.id())));
            };
            if stored.order.revision() != order.revision() {
                return Err(StoreError::RevisionConflict {
                    id: order.id().to_string(),
                    expected: order.revision(),
                    actual: stored.order.revision(),
                });
            }
            let updated = order.at_revision(stored.order.revision().next());
            stored.order = updated.clone();
            Ok(updated)
        })
    }

    fn list_by_user(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> StoreFuture<'_, Result<Page<Order>, StoreError>> {
        Box::pin(async move { self.page_of(|order| order.user() == user, page).await })
    }

    fn list(
        &self,
        filter: OrderFilter,
        page: PageRequest,
    ) -> StoreFuture<'_, Result<Page<Order>, StoreError>> {
        Box::pin(async move { self.page_of(|order| filter.matches(order), page).await })
    }
}
