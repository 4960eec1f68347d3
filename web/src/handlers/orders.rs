//! HTTP handlers for the order workflow.

use crate::error::ApiError;
use crate::WebResult;
use crate::extractors::{CurrentUser, JsonBody, Pagination};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use bookery_core::{
    CheckoutRequest, Money, Order, OrderFilter, OrderStatus, Page, PaymentResult, RequestedLine,
    ShippingAddress, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body for `POST /orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    /// Requested line items.
    pub order_items: Option<Vec<OrderItemBody>>,
    /// Destination address.
    pub shipping_address: Option<ShippingAddressBody>,
    /// Payment method name.
    pub payment_method: Option<String>,
    /// Tax amount in cents.
    pub tax_amount: Option<i64>,
    /// Shipping amount in cents.
    pub shipping_amount: Option<i64>,
    /// Client-declared total in cents (advisory; recomputed server-side).
    pub total_amount: Option<i64>,
}

/// One requested line item.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemBody {
    /// Book identifier.
    pub book: Option<String>,
    /// Requested quantity.
    pub quantity: Option<i64>,
}

/// Shipping address fields; missing fields arrive blank and fail
/// validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressBody {
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// City.
    #[serde(default)]
    pub city: String,
    /// State or region.
    #[serde(default)]
    pub state: String,
    /// Postal code.
    #[serde(default)]
    pub postal_code: String,
    /// Country.
    #[serde(default)]
    pub country: String,
}

impl From<ShippingAddressBody> for ShippingAddress {
    fn from(body: ShippingAddressBody) -> Self {
        Self {
            address: body.address,
            city: body.city,
            state: body.state,
            postal_code: body.postal_code,
            country: body.country,
        }
    }
}

impl From<&ShippingAddress> for ShippingAddressBody {
    fn from(address: &ShippingAddress) -> Self {
        Self {
            address: address.address.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
        }
    }
}

impl CreateOrderBody {
    fn into_checkout(self) -> CheckoutRequest {
        CheckoutRequest {
            items: self
                .order_items
                .unwrap_or_default()
                .into_iter()
                .map(|item| RequestedLine {
                    book: item.book,
                    quantity: item.quantity,
                })
                .collect(),
            shipping_address: self.shipping_address.map(ShippingAddress::from),
            payment_method: self.payment_method,
            tax_amount: self.tax_amount.map(Money::from_cents),
            shipping_amount: self.shipping_amount.map(Money::from_cents),
            total_amount: self.total_amount.map(Money::from_cents),
        }
    }
}

/// Request body for `PUT /orders/:id/pay`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBody {
    /// External transaction identifier.
    pub transaction_id: Option<String>,
    /// Gateway-reported status.
    pub status: Option<String>,
    /// Gateway-reported update time.
    pub update_time: Option<DateTime<Utc>>,
    /// Payer email.
    pub email_address: Option<String>,
}

impl PaymentBody {
    fn into_payment_result(self) -> Result<PaymentResult, ApiError> {
        match (self.transaction_id, self.status) {
            (Some(transaction_id), Some(status))
                if !transaction_id.trim().is_empty() && !status.trim().is_empty() =>
            {
                Ok(PaymentResult {
                    transaction_id,
                    status,
                    update_time: self.update_time,
                    email_address: self.email_address,
                })
            },
            _ => Err(ApiError::bad_request(
                "Missing payment result details (transactionId, status).",
            )),
        }
    }
}

/// One line item as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    /// Referenced book id.
    pub book: String,
    /// Title snapshot.
    pub title: String,
    /// Author snapshot.
    pub author: String,
    /// Cover snapshot.
    pub cover_image_url: Option<String>,
    /// Unit price snapshot in cents.
    pub price: i64,
    /// Quantity.
    pub quantity: u32,
}

/// Payment metadata as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResultResponse {
    /// External transaction identifier.
    pub transaction_id: String,
    /// Gateway-reported status.
    pub status: String,
    /// Gateway-reported update time.
    pub update_time: Option<DateTime<Utc>>,
    /// Payer email.
    pub email_address: Option<String>,
}

/// An order as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    /// Order id.
    pub id: String,
    /// Owning user id.
    pub user: String,
    /// Line items.
    pub order_items: Vec<OrderItemResponse>,
    /// Destination address.
    pub shipping_address: ShippingAddressBody,
    /// Payment method.
    pub payment_method: String,
    /// Tax amount in cents.
    pub tax_amount: i64,
    /// Shipping amount in cents.
    pub shipping_amount: i64,
    /// Authoritative total in cents.
    pub total_amount: i64,
    /// Lifecycle status.
    pub order_status: String,
    /// Whether payment has been recorded.
    pub is_paid: bool,
    /// When payment was recorded.
    pub paid_at: Option<DateTime<Utc>>,
    /// Whether delivery has been recorded.
    pub is_delivered: bool,
    /// When delivery was recorded.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Payment metadata, once paid.
    pub payment_result: Option<PaymentResultResponse>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            user: order.user().to_string(),
            order_items: order
                .items()
                .iter()
                .map(|item| OrderItemResponse {
                    book: item.book.to_string(),
                    title: item.title.clone(),
                    author: item.author.clone(),
                    cover_image_url: item.cover_image_url.clone(),
                    price: item.price.cents(),
                    quantity: item.quantity,
                })
                .collect(),
            shipping_address: order.shipping_address().into(),
            payment_method: order.payment_method().to_string(),
            tax_amount: order.tax_amount().cents(),
            shipping_amount: order.shipping_amount().cents(),
            total_amount: order.total_amount().cents(),
            order_status: order.status().to_string(),
            is_paid: order.is_paid(),
            paid_at: order.paid_at(),
            is_delivered: order.is_delivered(),
            delivered_at: order.delivered_at(),
            payment_result: order.payment_result().map(|result| PaymentResultResponse {
                transaction_id: result.transaction_id.clone(),
                status: result.status.clone(),
                update_time: result.update_time,
                email_address: result.email_address.clone(),
            }),
            created_at: order.created_at(),
        }
    }
}

/// A page of orders as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    /// Orders on this page.
    pub orders: Vec<OrderResponse>,
    /// 1-based page number.
    pub page: u32,
    /// Total number of pages.
    pub pages: u32,
    /// Total number of matching orders.
    pub total_orders: u64,
}

impl From<Page<Order>> for OrderListResponse {
    fn from(page: Page<Order>) -> Self {
        Self {
            orders: page.items.iter().map(OrderResponse::from).collect(),
            page: page.page,
            pages: page.pages,
            total_orders: page.total,
        }
    }
}

/// Filters accepted by the privileged listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderParams {
    /// Only orders in this status.
    pub status: Option<String>,
    /// Only orders owned by this user.
    pub user_id: Option<String>,
}

/// `POST /orders`: place an order.
pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(body): JsonBody<CreateOrderBody>,
) -> WebResult<ApiResponse<OrderResponse>> {
    let order = state.orders.checkout(&user, body.into_checkout()).await?;
    Ok(ApiResponse::new(
        StatusCode::CREATED,
        OrderResponse::from(&order),
        "Order created successfully.",
    ))
}

/// `GET /orders/my`: the caller's orders, newest first.
pub async fn my_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Pagination(page): Pagination,
) -> WebResult<ApiResponse<OrderListResponse>> {
    let orders = state.orders.my_orders(&user, page).await?;
    Ok(ApiResponse::new(
        StatusCode::OK,
        orders.into(),
        "User orders fetched successfully.",
    ))
}

/// `GET /orders/:id`: one order, for its owner or a privileged reader.
pub async fn get_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> WebResult<ApiResponse<OrderResponse>> {
    let order = state.orders.get_order(&user, &id).await?;
    Ok(ApiResponse::new(
        StatusCode::OK,
        OrderResponse::from(&order),
        "Order fetched successfully.",
    ))
}

/// `PUT /orders/:id/pay`: record a confirmed payment.
pub async fn pay_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<PaymentBody>,
) -> WebResult<ApiResponse<OrderResponse>> {
    let payment = body.into_payment_result()?;
    let order = state.orders.mark_paid(&user, &id, payment).await?;
    Ok(ApiResponse::new(
        StatusCode::OK,
        OrderResponse::from(&order),
        "Order marked as paid successfully.",
    ))
}

/// `PUT /orders/:id/deliver`: record delivery.
pub async fn deliver_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> WebResult<ApiResponse<OrderResponse>> {
    let order = state.orders.mark_delivered(&user, &id).await?;
    Ok(ApiResponse::new(
        StatusCode::OK,
        OrderResponse::from(&order),
        "Order marked as delivered successfully.",
    ))
}

/// `GET /orders/admin/all`: every order, with optional filters.
pub async fn admin_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Pagination(page): Pagination,
    Query(params): Query<AdminOrderParams>,
) -> WebResult<ApiResponse<OrderListResponse>> {
    let status = match params.status.as_deref() {
        Some(raw) => Some(raw.parse::<OrderStatus>().map_err(ApiError::from)?),
        None => None,
    };
    let owner = match params.user_id.as_deref() {
        Some(raw) => Some(UserId::parse(raw).map_err(ApiError::from)?),
        None => None,
    };
    let filter = OrderFilter {
        status,
        user: owner,
    };
    let orders = state.orders.all_orders(&user, filter, page).await?;
    Ok(ApiResponse::new(
        StatusCode::OK,
        orders.into(),
        "All orders fetched successfully for admin.",
    ))
}
