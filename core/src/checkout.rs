//! Checkout request validation.
//!
//! A [`CheckoutRequest`] mirrors the raw request body, optional fields
//! and all, so the whole validation contract lives here and is testable
//! without HTTP. Validation order: line items first, then shipping
//! address and payment method, then the amounts, then each line.

use crate::catalog::BookId;
use crate::error::Error;
use crate::money::Money;
use crate::order::{PaymentMethod, ShippingAddress};

/// A checkout request as submitted by the client.
#[derive(Clone, Debug, Default)]
pub struct CheckoutRequest {
    /// Requested line items.
    pub items: Vec<RequestedLine>,
    /// Destination address, if provided.
    pub shipping_address: Option<ShippingAddress>,
    /// Payment method name, if provided.
    pub payment_method: Option<String>,
    /// Client-declared tax amount.
    pub tax_amount: Option<Money>,
    /// Client-declared shipping amount.
    pub shipping_amount: Option<Money>,
    /// Client-declared total. Advisory only: the persisted total is
    /// always recomputed server-side.
    pub total_amount: Option<Money>,
}

/// One requested line, still unresolved against the catalog.
#[derive(Clone, Debug, Default)]
pub struct RequestedLine {
    /// Raw book identifier, if provided.
    pub book: Option<String>,
    /// Requested quantity, if provided.
    pub quantity: Option<i64>,
}

/// A checkout request that passed validation.
#[derive(Clone, Debug)]
pub struct ValidCheckout {
    /// Resolved (book, quantity) pairs, in request order.
    pub lines: Vec<(BookId, u32)>,
    /// Destination address.
    pub shipping_address: ShippingAddress,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Tax amount.
    pub tax_amount: Money,
    /// Shipping amount.
    pub shipping_amount: Money,
    /// The total the client declared, kept for comparison logging.
    pub declared_total: Money,
}

impl CheckoutRequest {
    /// Validates the request shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for an empty item list, missing
    /// shipping/payment/amount fields, a negative amount or a quantity
    /// below 1, and [`Error::InvalidReference`] for a malformed book id.
    pub fn validate(self) -> Result<ValidCheckout, Error> {
        if self.items.is_empty() {
            return Err(Error::InvalidRequest("No order items provided.".to_string()));
        }

        let shipping_address = self.shipping_address.ok_or_else(missing_details)?;
        shipping_address.validate()?;

        let payment_method: PaymentMethod =
            self.payment_method.ok_or_else(missing_details)?.parse()?;

        let tax_amount = require_amount("taxAmount", self.tax_amount)?;
        let shipping_amount = require_amount("shippingAmount", self.shipping_amount)?;
        let declared_total = require_amount("totalAmount", self.total_amount)?;

        let mut lines = Vec::with_capacity(self.items.len());
        for item in self.items {
            let quantity = item.quantity.unwrap_or(0);
            let raw_book = item.book.unwrap_or_default();
            if raw_book.is_empty() || quantity < 1 {
                return Err(Error::InvalidRequest(
                    "Each order item must have a valid book ID and a quantity of at least 1."
                        .to_string(),
                ));
            }
            let quantity = u32::try_from(quantity).map_err(|_| {
                Error::InvalidRequest(format!("Quantity out of range: {quantity}"))
            })?;
            lines.push((BookId::parse(&raw_book)?, quantity));
        }

        Ok(ValidCheckout {
            lines,
            shipping_address,
            payment_method,
            tax_amount,
            shipping_amount,
            declared_total,
        })
    }
}

fn missing_details() -> Error {
    Error::InvalidRequest(
        "Missing required order details (shippingAddress, paymentMethod, prices).".to_string(),
    )
}

fn require_amount(field: &str, value: Option<Money>) -> Result<Money, Error> {
    match value {
        None => Err(missing_details()),
        Some(amount) if amount.is_negative() => Err(Error::InvalidRequest(format!(
            "{field} cannot be negative."
        ))),
        Some(amount) => Ok(amount),
    }
}
