//! Customer orders

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::users::ShippingAddress;
use super::{require_non_empty, require_non_negative, Resource, Validate};
use crate::error::{LaunchpadError, Result};
use crate::storage::traits::{to_document, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub product_type: String,
    pub sku: String,
    pub variant_id: Option<String>,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPricing {
    pub subtotal: f64,
    #[serde(default)]
    pub shipping_cost: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub discount: f64,
    pub total: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoDetails {
    pub blockchain: String,
    pub token: String,
    pub wallet_address: String,
    pub amount: f64,
    pub tx_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayment {
    pub method: String,
    pub status: String,
    pub transaction_id: String,
    pub crypto_details: Option<CryptoDetails>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderShipping {
    pub method: String,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub shipped_date: Option<DateTime<Utc>>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderHistoryEntry {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub note: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreate {
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub pricing: OrderPricing,
    pub payment: OrderPayment,
    pub shipping_address: ShippingAddress,
    pub shipping: Option<OrderShipping>,
    pub customer_notes: Option<String>,
}

impl Validate for OrderCreate {
    fn validate(&self) -> Result<()> {
        require_non_empty("user_id", &self.user_id)?;
        if self.items.is_empty() {
            return Err(LaunchpadError::ValidationError(
                "an order needs at least one item".to_string(),
            ));
        }
        for item in &self.items {
            if item.quantity == 0 {
                return Err(LaunchpadError::ValidationError(
                    "item quantity must be at least 1".to_string(),
                ));
            }
            require_non_negative("unit_price", item.unit_price)?;
            require_non_negative("total_price", item.total_price)?;
        }
        require_non_negative("subtotal", self.pricing.subtotal)?;
        require_non_negative("total", self.pricing.total)?;
        self.shipping_address.validate()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub shipping: Option<OrderShipping>,
    pub admin_notes: Option<String>,
}

impl Validate for OrderUpdate {}

/// Stored order record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub status: OrderStatus,
    pub order_type: String,
    pub items: Vec<OrderItem>,
    pub pricing: OrderPricing,
    pub payment: OrderPayment,
    pub shipping_address: ShippingAddress,
    pub shipping: Option<OrderShipping>,
    pub customer_notes: Option<String>,
    pub admin_notes: Option<String>,
    pub history: Vec<OrderHistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `ORD-<date>-<8 hex chars of the id>`
fn order_number(id: &str, now: DateTime<Utc>) -> String {
    let suffix: String = id
        .chars()
        .filter(char::is_ascii_hexdigit)
        .take(8)
        .collect::<String>()
        .to_ascii_uppercase();
    format!("ORD-{}-{}", now.format("%Y%m%d"), suffix)
}

/// The shared product type of all items, or `mixed`
fn order_type(items: &[OrderItem]) -> String {
    match items.split_first() {
        Some((first, rest)) if rest.iter().all(|i| i.product_type == first.product_type) => {
            first.product_type.clone()
        }
        Some(_) => "mixed".to_string(),
        None => "empty".to_string(),
    }
}

pub struct Orders;

impl Resource for Orders {
    const NAME: &'static str = "Order";
    const PATH: &'static str = "orders";
    const COLLECTION: &'static str = "orders";
    const FILTER_FIELDS: &'static [&'static str] = &["status", "user_id", "order_type"];

    type Create = OrderCreate;
    type Update = OrderUpdate;

    fn create_document(payload: OrderCreate, id: String, now: DateTime<Utc>) -> Result<Document> {
        to_document(&Order {
            order_number: order_number(&id, now),
            order_type: order_type(&payload.items),
            id,
            user_id: payload.user_id,
            status: OrderStatus::Pending,
            items: payload.items,
            pricing: payload.pricing,
            payment: payload.payment,
            shipping_address: payload.shipping_address,
            shipping: payload.shipping,
            customer_notes: payload.customer_notes,
            admin_notes: None,
            history: vec![OrderHistoryEntry {
                status: OrderStatus::Pending,
                timestamp: now,
                note: "Order created".to_string(),
            }],
            created_at: now,
            updated_at: now,
        })
    }

    /// A status change appends to `history`
    fn appended_entry(
        update: &OrderUpdate,
        current: &Document,
        now: DateTime<Utc>,
    ) -> Result<Option<(&'static str, Value)>> {
        let Some(status) = update.status else {
            return Ok(None);
        };
        if current.get("status").and_then(Value::as_str) == Some(status.as_str()) {
            return Ok(None);
        }
        let entry = OrderHistoryEntry {
            status,
            timestamp: now,
            note: update
                .admin_notes
                .clone()
                .unwrap_or_else(|| format!("Status changed to {}", status.as_str())),
        };
        Ok(Some(("history", serde_json::to_value(entry)?)))
    }
}
