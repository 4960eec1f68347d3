//! Persistence abstractions for the catalog, orders and users.
//!
//! The workflow never talks to a database directly; it goes through these
//! traits. Implementations are expected to provide document-database
//! semantics: single-document atomic updates and optimistic concurrency
//! via a per-document revision. The stock decrement is deliberately a
//! single conditional operation ("decrement by N only if stock >= N") so
//! that two concurrent reservations can never both succeed when stock
//! covers only one of them.
//!
//! The traits use explicit `Pin<Box<dyn Future>>` returns instead of
//! `async fn` so they stay usable as trait objects (`Arc<dyn CatalogStore>`).

use crate::catalog::{Book, BookId, CatalogQuery};
use crate::error::Error;
use crate::order::{Order, OrderId, OrderStatus};
use crate::users::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error as ThisError;

/// Boxed future returned by store trait methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Per-document revision used for optimistic concurrency control.
///
/// Every write that goes through [`CatalogStore::put`] or
/// [`OrderStore::put`] must present the revision it read; a mismatch means
/// the document changed underneath the caller.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Revision(u64);

impl Revision {
    /// Revision assigned to a freshly inserted document.
    #[must_use]
    pub const fn initial() -> Self {
        Self(1)
    }

    /// The revision after one more write.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw revision counter.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum StoreError {
    /// Optimistic concurrency conflict: the presented revision does not
    /// match the stored one.
    #[error("Revision conflict on {id}: expected {expected}, found {actual}")]
    RevisionConflict {
        /// Identifier of the conflicting document.
        id: String,
        /// The revision the caller presented.
        expected: Revision,
        /// The revision actually stored.
        actual: Revision,
    },

    /// A uniqueness constraint was violated.
    #[error("{0}")]
    Duplicate(String),

    /// The backing storage failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(message) => Self::InvalidRequest(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// A reservation attempt that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ReserveError {
    /// The book does not exist or is inactive.
    #[error("Book not found or is inactive: {0}")]
    NotFound(BookId),

    /// Available stock does not cover the requested quantity.
    #[error(
        "Insufficient stock for book \"{title}\". Available: {available}, Requested: {requested}"
    )]
    Insufficient {
        /// Title of the offending book.
        title: String,
        /// Stock available at the time of the attempt.
        available: u32,
        /// Quantity the caller asked for.
        requested: u32,
    },

    /// The backing storage failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ReserveError> for Error {
    fn from(err: ReserveError) -> Self {
        match err {
            ReserveError::NotFound(id) => Self::NotFound(format!("Book not found or is inactive: {id}")),
            ReserveError::Insufficient {
                title,
                available,
                requested,
            } => Self::InsufficientStock {
                title,
                available,
                requested,
            },
            ReserveError::Store(store) => store.into(),
        }
    }
}

/// One page of a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Page size used when the caller does not specify one.
    pub const DEFAULT_LIMIT: u32 = 10;

    /// Largest page size a caller may request.
    pub const MAX_LIMIT: u32 = 100;

    /// Builds a page request, clamping the page to at least 1 and the
    /// limit into `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Number of items to skip before this page starts.
    #[must_use]
    pub const fn offset(self) -> usize {
        ((self.page - 1) * self.limit) as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

/// A page of results together with pagination bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number that was served.
    pub page: u32,
    /// Total number of pages for the underlying result set.
    pub pages: u32,
    /// Total number of matching items across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// Builds a page from the sliced items, the request that produced it
    /// and the total match count.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        #[allow(clippy::cast_possible_truncation)] // capped by MAX_LIMIT pages arithmetic
        let pages = total.div_ceil(u64::from(request.limit())) as u32;
        Self {
            items,
            page: request.page(),
            pages,
            total,
        }
    }

    /// Maps the items while keeping the pagination bookkeeping.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            pages: self.pages,
            total: self.total,
        }
    }
}

/// Filters for the privileged order listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Only orders currently in this status.
    pub status: Option<OrderStatus>,
    /// Only orders owned by this user.
    pub user: Option<UserId>,
}

impl OrderFilter {
    /// Whether the order passes this filter.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|status| order.status() == status)
            && self.user.is_none_or(|user| order.user() == user)
    }
}

/// Catalog persistence: book lookup, listing and the stock reservation
/// primitive.
pub trait CatalogStore: Send + Sync {
    /// Looks up a book by id, active or not.
    fn find(&self, id: BookId) -> StoreFuture<'_, Result<Option<Book>, StoreError>>;

    /// Lists active books matching the query, ordered oldest first.
    fn list(
        &self,
        query: CatalogQuery,
        page: PageRequest,
    ) -> StoreFuture<'_, Result<Page<Book>, StoreError>>;

    /// Inserts a new book, rejecting a duplicate title+author pair.
    fn insert(&self, book: Book) -> StoreFuture<'_, Result<Book, StoreError>>;

    /// Replaces a book, guarded by the revision the caller read.
    fn put(&self, book: Book) -> StoreFuture<'_, Result<Book, StoreError>>;

    /// Atomically decrements stock by `quantity` if the book exists, is
    /// active and has at least `quantity` in stock, returning the book as
    /// read in the same atomic step.
    ///
    /// Only the stock field (and revision) changes; no full-record
    /// validation runs on this path.
    fn reserve_stock(
        &self,
        id: BookId,
        quantity: u32,
    ) -> StoreFuture<'_, Result<Book, ReserveError>>;

    /// Returns previously reserved stock. A missing book is a no-op: the
    /// compensation has nothing left to restore.
    fn release_stock(&self, id: BookId, quantity: u32) -> StoreFuture<'_, Result<(), StoreError>>;
}

/// Order persistence with revision-guarded updates.
pub trait OrderStore: Send + Sync {
    /// Persists a newly assembled order.
    fn insert(&self, order: Order) -> StoreFuture<'_, Result<Order, StoreError>>;

    /// Looks up an order by id.
    fn find(&self, id: OrderId) -> StoreFuture<'_, Result<Option<Order>, StoreError>>;

    /// Replaces an order, guarded by the revision the caller read.
    fn put(&self, order: Order) -> StoreFuture<'_, Result<Order, StoreError>>;

    /// Lists one user's orders, newest first.
    fn list_by_user(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> StoreFuture<'_, Result<Page<Order>, StoreError>>;

    /// Lists all orders matching the filter, newest first.
    fn list(
        &self,
        filter: OrderFilter,
        page: PageRequest,
    ) -> StoreFuture<'_, Result<Page<Order>, StoreError>>;
}
