//! Workflow services orchestrating the stores.
//!
//! [`OrderService`] owns the checkout and order lifecycle;
//! [`CatalogService`] owns catalog management. Both take their
//! dependencies as trait objects so tests can swap in the in-memory
//! stores and a fixed clock.

use crate::catalog::{Book, BookId, BookPatch, CatalogQuery, NewBook};
use crate::checkout::CheckoutRequest;
use crate::environment::Clock;
use crate::error::Error;
use crate::money::Money;
use crate::order::{LineItem, Order, OrderId, PaymentResult};
use crate::store::{CatalogStore, OrderFilter, OrderStore, Page, PageRequest};
use crate::users::{Capability, User};
use chrono::Datelike;
use std::sync::Arc;

/// Checkout and order lifecycle operations.
pub struct OrderService {
    catalog: Arc<dyn CatalogStore>,
    orders: Arc<dyn OrderStore>,
    clock: Arc<dyn Clock>,
}

impl OrderService {
    /// Creates a service over the given stores and clock.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        orders: Arc<dyn OrderStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            orders,
            clock,
        }
    }

    /// Validates a checkout request, reserves stock for every line item
    /// and persists the assembled order.
    ///
    /// Reservations are applied in request order. The first failure
    /// aborts the checkout, releases every reservation already applied
    /// for this order and surfaces the failure unchanged, so a failed
    /// multi-item checkout never leaves stock partially decremented.
    ///
    /// The persisted total is recomputed from the reserved line items
    /// plus tax and shipping; the client-declared total is only compared
    /// and logged.
    ///
    /// # Errors
    ///
    /// Returns the validation failure ([`Error::InvalidRequest`],
    /// [`Error::InvalidReference`]) or the reservation failure
    /// ([`Error::NotFound`], [`Error::InsufficientStock`]) that aborted
    /// the checkout, or [`Error::Internal`] when persistence fails.
    pub async fn checkout(&self, caller: &User, request: CheckoutRequest) -> Result<Order, Error> {
        let valid = request.validate()?;

        let mut reserved: Vec<LineItem> = Vec::with_capacity(valid.lines.len());
        for (book_id, quantity) in &valid.lines {
            match self.catalog.reserve_stock(*book_id, *quantity).await {
                Ok(book) => reserved.push(LineItem::from_book(&book, *quantity)),
                Err(err) => {
                    self.release(&reserved).await;
                    return Err(err.into());
                },
            }
        }

        let order = Order::assemble(
            caller.id,
            reserved.clone(),
            valid.shipping_address,
            valid.payment_method,
            valid.tax_amount,
            valid.shipping_amount,
            self.clock.now(),
        );

        if order.total_amount() != valid.declared_total {
            tracing::warn!(
                declared = valid.declared_total.cents(),
                computed = order.total_amount().cents(),
                order_id = %order.id(),
                "client-declared total differs from recomputed total; persisting the recomputed value"
            );
        }

        match self.orders.insert(order).await {
            Ok(created) => {
                tracing::info!(
                    order_id = %created.id(),
                    user = %created.user(),
                    total = created.total_amount().cents(),
                    "order created"
                );
                Ok(created)
            },
            Err(err) => {
                self.release(&reserved).await;
                Err(err.into())
            },
        }
    }

    /// Records a confirmed payment on an order and advances its status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] without the mutate capability,
    /// [`Error::InvalidReference`]/[`Error::NotFound`] for a bad id,
    /// [`Error::AlreadyPaid`] on a second application, or
    /// [`Error::InvalidRequest`] when the status cannot accept payment.
    pub async fn mark_paid(
        &self,
        caller: &User,
        raw_id: &str,
        payment: PaymentResult,
    ) -> Result<Order, Error> {
        caller.require(Capability::MutateOrderStatus)?;
        let mut order = self.load(OrderId::parse(raw_id)?).await?;
        order.record_payment(payment, self.clock.now())?;
        let updated = self.orders.put(order).await?;
        tracing::info!(order_id = %updated.id(), "order marked as paid");
        Ok(updated)
    }

    /// Records delivery on an order and advances its status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] without the mutate capability,
    /// [`Error::InvalidReference`]/[`Error::NotFound`] for a bad id,
    /// [`Error::AlreadyDelivered`] on a second application, or
    /// [`Error::InvalidRequest`] when the status cannot accept delivery.
    pub async fn mark_delivered(&self, caller: &User, raw_id: &str) -> Result<Order, Error> {
        caller.require(Capability::MutateOrderStatus)?;
        let mut order = self.load(OrderId::parse(raw_id)?).await?;
        order.record_delivery(self.clock.now())?;
        let updated = self.orders.put(order).await?;
        tracing::info!(order_id = %updated.id(), "order marked as delivered");
        Ok(updated)
    }

    /// Fetches a single order for its owner or a privileged reader.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReference`]/[`Error::NotFound`] for a bad
    /// id, or [`Error::Forbidden`] when the caller neither owns the order
    /// nor holds [`Capability::ReadAllOrders`].
    pub async fn get_order(&self, caller: &User, raw_id: &str) -> Result<Order, Error> {
        let order = self.load(OrderId::parse(raw_id)?).await?;
        if order.user() != caller.id && !caller.can(Capability::ReadAllOrders) {
            return Err(Error::Forbidden(
                "Not authorized to view this order.".to_string(),
            ));
        }
        Ok(order)
    }

    /// Lists the caller's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] without [`Capability::ReadOwnOrders`],
    /// or [`Error::Internal`] when the store fails.
    pub async fn my_orders(&self, caller: &User, page: PageRequest) -> Result<Page<Order>, Error> {
        caller.require(Capability::ReadOwnOrders)?;
        Ok(self.orders.list_by_user(caller.id, page).await?)
    }

    /// Lists all orders matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] without [`Capability::ReadAllOrders`],
    /// or [`Error::Internal`] when the store fails.
    pub async fn all_orders(
        &self,
        caller: &User,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, Error> {
        caller.require(Capability::ReadAllOrders)?;
        Ok(self.orders.list(filter, page).await?)
    }

    async fn load(&self, id: OrderId) -> Result<Order, Error> {
        self.orders
            .find(id)
            .await?
            .ok_or_else(|| Error::NotFound("Order not found.".to_string()))
    }

    /// Compensation: hand back stock reserved earlier in a failed
    /// checkout. Release failures are logged, not surfaced; the original
    /// failure is what the caller needs to see.
    async fn release(&self, reserved: &[LineItem]) {
        for item in reserved {
            if let Err(err) = self.catalog.release_stock(item.book, item.quantity).await {
                tracing::error!(
                    book = %item.book,
                    quantity = item.quantity,
                    error = %err,
                    "failed to release reserved stock"
                );
            }
        }
    }
}

/// Catalog browsing and management operations.
pub struct CatalogService {
    catalog: Arc<dyn CatalogStore>,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    /// Creates a service over the given store and clock.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogStore>, clock: Arc<dyn Clock>) -> Self {
        Self { catalog, clock }
    }

    /// Lists active books matching the query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] when the store fails.
    pub async fn browse(
        &self,
        query: CatalogQuery,
        page: PageRequest,
    ) -> Result<Page<Book>, Error> {
        Ok(self.catalog.list(query, page).await?)
    }

    /// Fetches a single active book.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReference`] for a malformed id or
    /// [`Error::NotFound`] when the book is absent or inactive.
    pub async fn fetch(&self, raw_id: &str) -> Result<Book, Error> {
        let id = BookId::parse(raw_id)?;
        match self.catalog.find(id).await? {
            Some(book) if book.is_active => Ok(book),
            _ => Err(Error::NotFound(
                "Book not found or is not active.".to_string(),
            )),
        }
    }

    /// Adds a book to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] without the catalog capability, or
    /// [`Error::InvalidRequest`] for a negative price, an empty genre
    /// set, an implausible publication year or a duplicate title+author
    /// pair.
    pub async fn add(&self, caller: &User, new: NewBook) -> Result<Book, Error> {
        caller.require(Capability::ManageCatalog)?;

        if new.price.is_negative() {
            return Err(Error::InvalidRequest("Price cannot be negative.".to_string()));
        }
        if new.genres.is_empty() {
            return Err(Error::InvalidRequest(
                "At least one genre is required.".to_string(),
            ));
        }
        let now = self.clock.now();
        if new.publication_year < 1000 || new.publication_year > now.year() + 5 {
            return Err(Error::InvalidRequest("Invalid publication year.".to_string()));
        }

        Ok(self.catalog.insert(Book::new(new, now)).await?)
    }

    /// Applies a partial update to a book.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] without the catalog capability,
    /// [`Error::NotFound`] for an absent book, or
    /// [`Error::InvalidRequest`] for a negative price or a patch that
    /// changes nothing.
    pub async fn update(&self, caller: &User, raw_id: &str, patch: BookPatch) -> Result<Book, Error> {
        caller.require(Capability::ManageCatalog)?;

        if patch.price.is_some_and(Money::is_negative) {
            return Err(Error::InvalidRequest("Price cannot be negative.".to_string()));
        }

        let id = BookId::parse(raw_id)?;
        let mut book = self
            .catalog
            .find(id)
            .await?
            .ok_or_else(|| Error::NotFound("Book not found.".to_string()))?;

        if !book.apply_patch(patch) {
            return Err(Error::InvalidRequest(
                "No valid data provided for book update or no changes detected.".to_string(),
            ));
        }
        book.updated_at = self.clock.now();
        Ok(self.catalog.put(book).await?)
    }

    /// Soft-deletes a book: clears the active flag, keeps the record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] without the catalog capability or
    /// [`Error::NotFound`] when the book is absent or already deleted.
    pub async fn deactivate(&self, caller: &User, raw_id: &str) -> Result<(), Error> {
        caller.require(Capability::ManageCatalog)?;

        let id = BookId::parse(raw_id)?;
        let mut book = match self.catalog.find(id).await? {
            Some(book) if book.is_active => book,
            _ => {
                return Err(Error::NotFound(
                    "Book not found or already deleted.".to_string(),
                ));
            },
        };
        book.is_active = false;
        book.updated_at = self.clock.now();
        self.catalog.put(book).await?;
        Ok(())
    }
}
