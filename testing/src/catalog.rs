//! In-memory catalog store.
//!
//! Every operation takes the single write lock for the duration of its
//! read-check-write cycle, which is exactly the single-document atomic
//! update the external document database primitive provides. In
//! particular [`InMemoryCatalog::reserve_stock`] is one conditional
//! decrement: two concurrent reservations can never both succeed when
//! stock covers only one of them.

use bookery_core::{
    Book, BookId, CatalogQuery, CatalogStore, Page, PageRequest, ReserveError, StoreError,
    StoreFuture,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

struct StoredBook {
    seq: u64,
    book: Book,
}

/// In-memory implementation of [`CatalogStore`].
#[derive(Default)]
pub struct InMemoryCatalog {
    books: RwLock<HashMap<BookId, StoredBook>>,
    seq: AtomicU64,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for InMemoryCatalog {
    fn find(&self, id: BookId) -> StoreFuture<'_, Result<Option<Book>, StoreError>> {
        Box::pin(async move {
            Ok(self
                .books
                .read()
                .await
                .get(&id)
                .map(|stored| stored.book.clone()))
        })
    }

    fn list(
        &self,
        query: CatalogQuery,
        page: PageRequest,
    ) -> StoreFuture<'_, Result<Page<Book>, StoreError>> {
        Box::pin(async move {
            let books = self.books.read().await;
            let mut matching: Vec<&StoredBook> = books
                .values()
                .filter(|stored| query.matches(&stored.book))
                .collect();
            matching.sort_by_key(|stored| (stored.book.created_at, stored.seq));

            let total = matching.len() as u64;
            let items = matching
                .into_iter()
                .skip(page.offset())
                .take(page.limit() as usize)
                .map(|stored| stored.book.clone())
                .collect();
            Ok(Page::new(items, page, total))
        })
    }

    fn insert(&self, book: Book) -> StoreFuture<'_, Result<Book, StoreError>> {
        Box::pin(async move {
            let mut books = self.books.write().await;
            let duplicate = books.values().any(|stored| {
                stored.book.title == book.title && stored.book.author == book.author
            });
            if duplicate {
                return Err(StoreError::Duplicate(
                    "A book with the same title and author already exists.".to_string(),
                ));
            }
            let seq = self.seq.fetch_add(1, Ordering::Relaxed);
            books.insert(book.id, StoredBook {
                seq,
                book: book.clone(),
            });
            Ok(book)
        })
    }

    fn put(&self, book: Book) -> StoreFuture<'_, Result<Book, StoreError>> {
        Box::pin(async move {
            let mut books = self.books.write().await;
            let Some(stored) = books.get_mut(&book.id) else {
                return Err(StoreError::Storage(format!("No such book: {}", book.id)));
            };
            if stored.book.revision != book.revision {
                return Err(StoreError::RevisionConflict {
                    id: book.id.to_string(),
                    expected: book.revision,
                    actual: stored.book.revision,
                });
            }
            let mut updated = book;
            updated.revision = updated.revision.next();
            stored.book = updated.clone();
            Ok(updated)
        })
    }

    fn reserve_stock(
        &self,
        id: BookId,
        quantity: u32,
    ) -> StoreFuture<'_, Result<Book, ReserveError>> {
        Box::pin(async move {
            let mut books = self.books.write().await;
            let Some(stored) = books.get_mut(&id) else {
                return Err(ReserveError::NotFound(id));
            };
            if !stored.book.is_active {
                return Err(ReserveError::NotFound(id));
            }
            if stored.book.stock < quantity {
                return Err(ReserveError::Insufficient {
                    title: stored.book.title.clone(),
                    available: stored.book.stock,
                    requested: quantity,
                });
            }
            // Only the stock field changes on this path.
            stored.book.stock -= quantity;
            stored.book.revision = stored.book.revision.next();
            Ok(stored.book.clone())
        })
    }

    fn release_stock(&self, id: BookId, quantity: u32) -> StoreFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let mut books = self.books.write().await;
            // A vanished book leaves nothing to restore.
            if let Some(stored) = books.get_mut(&id) {
                stored.book.stock = stored.book.stock.saturating_add(quantity);
                stored.book.revision = stored.book.revision.next();
            }
            Ok(())
        })
    }
}
