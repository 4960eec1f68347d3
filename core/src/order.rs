//! Orders: immutable line items with a mutable status and payment
//! lifecycle.
//!
//! Line items snapshot the catalog details (price, title, author, cover)
//! at order time; later catalog changes never reach a stored order. The
//! status enum advances only through [`OrderStatus::transition`], one
//! function owning the whole table, so an out-of-order event (delivering
//! an unpaid order) is rejected instead of silently applied.

use crate::catalog::{Book, BookId};
use crate::error::Error;
use crate::money::Money;
use crate::store::Revision;
use crate::users::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Generates a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReference`] if `raw` is not a well-formed
    /// identifier.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| Error::InvalidReference("Invalid order ID format.".to_string()))
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One book position within an order.
///
/// Price, title, author and cover are captured at order time and never
/// re-derived from the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Non-owning back-reference to the catalog entry.
    pub book: BookId,
    /// Title at order time.
    pub title: String,
    /// Author at order time.
    pub author: String,
    /// Cover image location at order time.
    pub cover_image_url: Option<String>,
    /// Unit price at order time.
    pub price: Money,
    /// Ordered quantity, at least 1.
    pub quantity: u32,
}

impl LineItem {
    /// Snapshots a reserved book into a line item.
    #[must_use]
    pub fn from_book(book: &Book, quantity: u32) -> Self {
        Self {
            book: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            cover_image_url: book.cover_image_url.clone(),
            price: book.price,
            quantity,
        }
    }

    /// Price of this line: unit price times quantity.
    #[must_use]
    pub const fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// Destination address for an order. All fields are required.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Postal code.
    pub postal_code: String,
    /// Country.
    pub country: String,
}

impl ShippingAddress {
    /// Checks that every field is present and non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when any field is blank.
    pub fn validate(&self) -> Result<(), Error> {
        let fields = [
            &self.address,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ];
        if fields.iter().any(|field| field.trim().is_empty()) {
            return Err(Error::InvalidRequest(
                "Missing required shipping address fields.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Supported payment methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Razorpay gateway.
    Razorpay,
    /// Credit card.
    #[serde(rename = "Credit Card")]
    CreditCard,
    /// Debit card.
    #[serde(rename = "Debit Card")]
    DebitCard,
    /// Net banking.
    #[serde(rename = "Net Banking")]
    NetBanking,
    /// Cash on delivery.
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Wire name of the payment method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Razorpay => "Razorpay",
            Self::CreditCard => "Credit Card",
            Self::DebitCard => "Debit Card",
            Self::NetBanking => "Net Banking",
            Self::CashOnDelivery => "Cash on Delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Razorpay" => Ok(Self::Razorpay),
            "Credit Card" => Ok(Self::CreditCard),
            "Debit Card" => Ok(Self::DebitCard),
            "Net Banking" => Ok(Self::NetBanking),
            "Cash on Delivery" => Ok(Self::CashOnDelivery),
            other => Err(Error::InvalidRequest(format!(
                "Unsupported payment method: {other}"
            ))),
        }
    }
}

/// Metadata recorded when a payment is confirmed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResult {
    /// External transaction identifier.
    pub transaction_id: String,
    /// Gateway-reported status string.
    pub status: String,
    /// Gateway-reported update time, if provided.
    pub update_time: Option<DateTime<Utc>>,
    /// Payer email, if provided.
    pub email_address: Option<String>,
}

/// Lifecycle status of an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, awaiting payment.
    Pending,
    /// Paid, being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled before fulfilment.
    Cancelled,
    /// Refunded after payment.
    Refunded,
}

impl OrderStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// Applies a lifecycle event, returning the next status.
    ///
    /// This is the only place status transitions are decided.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when the event is not valid in
    /// the current status, e.g. delivering an order that was never paid.
    pub fn transition(self, event: OrderEvent) -> Result<Self, Error> {
        match (self, event) {
            (Self::Pending, OrderEvent::Pay) => Ok(Self::Processing),
            (Self::Processing, OrderEvent::Ship) => Ok(Self::Shipped),
            (Self::Processing | Self::Shipped, OrderEvent::Deliver) => Ok(Self::Delivered),
            (Self::Pending | Self::Processing, OrderEvent::Cancel) => Ok(Self::Cancelled),
            (Self::Processing | Self::Shipped | Self::Delivered, OrderEvent::Refund) => {
                Ok(Self::Refunded)
            },
            (status, event) => Err(Error::InvalidRequest(format!(
                "Order in status '{status}' cannot accept event '{event}'."
            ))),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(Error::InvalidRequest(format!(
                "Unknown order status: {other}"
            ))),
        }
    }
}

/// Lifecycle events an order can receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderEvent {
    /// Payment was confirmed.
    Pay,
    /// The order was handed to the carrier.
    Ship,
    /// The order reached the customer.
    Deliver,
    /// The order was cancelled.
    Cancel,
    /// The payment was refunded.
    Refund,
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pay => "pay",
            Self::Ship => "ship",
            Self::Deliver => "deliver",
            Self::Cancel => "cancel",
            Self::Refund => "refund",
        };
        f.write_str(name)
    }
}

/// A purchase record.
///
/// Fields are private: line items are immutable after assembly and the
/// total is computed exactly once from them, so nothing outside this
/// module can break the `total = items + tax + shipping` invariant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user: UserId,
    items: Vec<LineItem>,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
    tax_amount: Money,
    shipping_amount: Money,
    total_amount: Money,
    status: OrderStatus,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
    is_delivered: bool,
    delivered_at: Option<DateTime<Utc>>,
    payment_result: Option<PaymentResult>,
    created_at: DateTime<Utc>,
    revision: Revision,
}

impl Order {
    /// Assembles a new pending order from reserved line items.
    ///
    /// The total is recomputed here from the line items plus tax and
    /// shipping; whatever total the client declared is not consulted.
    #[must_use]
    pub fn assemble(
        user: UserId,
        items: Vec<LineItem>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        tax_amount: Money,
        shipping_amount: Money,
        created_at: DateTime<Utc>,
    ) -> Self {
        let items_price: Money = items.iter().map(LineItem::line_total).sum();
        Self {
            id: OrderId::generate(),
            user,
            items,
            shipping_address,
            payment_method,
            tax_amount,
            shipping_amount,
            total_amount: items_price + tax_amount + shipping_amount,
            status: OrderStatus::Pending,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            payment_result: None,
            created_at,
            revision: Revision::initial(),
        }
    }

    /// Unique identifier.
    #[must_use]
    pub const fn id(&self) -> OrderId {
        self.id
    }

    /// Owning user.
    #[must_use]
    pub const fn user(&self) -> UserId {
        self.user
    }

    /// Ordered line items.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Destination address.
    #[must_use]
    pub const fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    /// Payment method chosen at checkout.
    #[must_use]
    pub const fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Tax portion of the total.
    #[must_use]
    pub const fn tax_amount(&self) -> Money {
        self.tax_amount
    }

    /// Shipping portion of the total.
    #[must_use]
    pub const fn shipping_amount(&self) -> Money {
        self.shipping_amount
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn items_price(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Authoritative total: items price plus tax plus shipping.
    #[must_use]
    pub const fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Whether payment has been recorded.
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        self.is_paid
    }

    /// When payment was recorded.
    #[must_use]
    pub const fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    /// Whether delivery has been recorded.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        self.is_delivered
    }

    /// When delivery was recorded.
    #[must_use]
    pub const fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    /// Payment metadata, once paid.
    #[must_use]
    pub fn payment_result(&self) -> Option<&PaymentResult> {
        self.payment_result.as_ref()
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Document revision for optimistic concurrency.
    #[must_use]
    pub const fn revision(&self) -> Revision {
        self.revision
    }

    /// Returns the order with the given revision. Store bookkeeping only.
    #[must_use]
    pub fn at_revision(mut self, revision: Revision) -> Self {
        self.revision = revision;
        self
    }

    /// Records a confirmed payment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyPaid`] when payment was already recorded,
    /// or [`Error::InvalidRequest`] when the status cannot accept payment.
    pub fn record_payment(
        &mut self,
        result: PaymentResult,
        at: DateTime<Utc>,
    ) -> Result<(), Error> {
        if self.is_paid {
            return Err(Error::AlreadyPaid);
        }
        self.status = self.status.transition(OrderEvent::Pay)?;
        self.is_paid = true;
        self.paid_at = Some(at);
        self.payment_result = Some(result);
        Ok(())
    }

    /// Records delivery.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyDelivered`] when delivery was already
    /// recorded, or [`Error::InvalidRequest`] when the status cannot
    /// accept delivery (e.g. the order was never paid).
    pub fn record_delivery(&mut self, at: DateTime<Utc>) -> Result<(), Error> {
        if self.is_delivered {
            return Err(Error::AlreadyDelivered);
        }
        self.status = self.status.transition(OrderEvent::Deliver)?;
        self.is_delivered = true;
        self.delivered_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;

    fn line(price_dollars: i64, quantity: u32) -> LineItem {
        LineItem {
            book: BookId::generate(),
            title: "Test Book".to_string(),
            author: "Test Author".to_string(),
            cover_image_url: None,
            price: Money::from_dollars(price_dollars),
            quantity,
        }
    }

    fn pending_order() -> Order {
        Order::assemble(
            UserId::generate(),
            vec![line(10, 3)],
            ShippingAddress {
                address: "221B Baker Street".to_string(),
                city: "London".to_string(),
                state: "Greater London".to_string(),
                postal_code: "NW1 6XE".to_string(),
                country: "UK".to_string(),
            },
            PaymentMethod::CreditCard,
            Money::from_dollars(1),
            Money::from_dollars(2),
            Utc::now(),
        )
    }

    fn payment() -> PaymentResult {
        PaymentResult {
            transaction_id: "txn-1".to_string(),
            status: "COMPLETED".to_string(),
            update_time: None,
            email_address: Some("payer@example.com".to_string()),
        }
    }

    #[test]
    fn assemble_recomputes_total_from_items() {
        let order = pending_order();
        assert_eq!(order.items_price(), Money::from_dollars(30));
        assert_eq!(order.total_amount(), Money::from_dollars(33));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(!order.is_paid());
        assert!(!order.is_delivered());
    }

    #[test]
    fn valid_transitions() {
        use OrderEvent as E;
        use OrderStatus as S;

        assert_eq!(S::Pending.transition(E::Pay).unwrap(), S::Processing);
        assert_eq!(S::Processing.transition(E::Ship).unwrap(), S::Shipped);
        assert_eq!(S::Processing.transition(E::Deliver).unwrap(), S::Delivered);
        assert_eq!(S::Shipped.transition(E::Deliver).unwrap(), S::Delivered);
        assert_eq!(S::Pending.transition(E::Cancel).unwrap(), S::Cancelled);
        assert_eq!(S::Processing.transition(E::Cancel).unwrap(), S::Cancelled);
        assert_eq!(S::Delivered.transition(E::Refund).unwrap(), S::Refunded);
    }

    #[test]
    fn deliver_before_pay_is_rejected() {
        let err = OrderStatus::Pending
            .transition(OrderEvent::Deliver)
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("pending"));
    }

    #[test]
    fn terminal_states_reject_further_events() {
        assert!(OrderStatus::Cancelled.transition(OrderEvent::Pay).is_err());
        assert!(OrderStatus::Refunded.transition(OrderEvent::Deliver).is_err());
        assert!(OrderStatus::Delivered.transition(OrderEvent::Pay).is_err());
    }

    #[test]
    fn record_payment_sets_fields_once() {
        let mut order = pending_order();
        let now = Utc::now();
        order.record_payment(payment(), now).unwrap();

        assert!(order.is_paid());
        assert_eq!(order.paid_at(), Some(now));
        assert_eq!(order.status(), OrderStatus::Processing);
        assert_eq!(
            order.payment_result().unwrap().transaction_id,
            "txn-1".to_string()
        );

        let err = order.record_payment(payment(), Utc::now()).unwrap_err();
        assert_eq!(err, Error::AlreadyPaid);
        assert_eq!(order.paid_at(), Some(now), "paidAt must be set only once");
    }

    #[test]
    fn record_delivery_requires_payment_first() {
        let mut order = pending_order();
        let err = order.record_delivery(Utc::now()).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(!order.is_delivered());

        order.record_payment(payment(), Utc::now()).unwrap();
        let delivered_at = Utc::now();
        order.record_delivery(delivered_at).unwrap();
        assert!(order.is_delivered());
        assert_eq!(order.delivered_at(), Some(delivered_at));
        assert_eq!(order.status(), OrderStatus::Delivered);

        let err = order.record_delivery(Utc::now()).unwrap_err();
        assert_eq!(err, Error::AlreadyDelivered);
        assert_eq!(order.delivered_at(), Some(delivered_at));
    }

    #[test]
    fn payment_method_wire_names_round_trip() {
        for method in [
            PaymentMethod::Razorpay,
            PaymentMethod::CreditCard,
            PaymentMethod::DebitCard,
            PaymentMethod::NetBanking,
            PaymentMethod::CashOnDelivery,
        ] {
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
        assert!("Barter".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn order_status_wire_names_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::Refunded,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }
}
