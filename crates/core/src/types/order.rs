//! Order history record.

use std::fmt::Write as _;

use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};

use super::{CartLine, DeliveryMethod, OrderId, OrderStatus, format_amount};

/// Days between placing an order and its estimated delivery.
pub const DELIVERY_ESTIMATE_DAYS: u64 = 7;

/// A placed order, appended to the local order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_email: String,
    pub user_name: String,
    pub user_phone: String,
    pub delivery_method: DeliveryMethod,
    /// The shipping address, or the pickup label for in-person handover.
    pub user_address: String,
    /// Two-decimal total string carried over from the cart.
    pub total: String,
    pub status: OrderStatus,
    pub date: DateTime<Utc>,
    pub delivery_date: DateTime<Utc>,
    pub items: Vec<CartLine>,
}

impl Order {
    /// Estimated delivery for an order placed at `placed`.
    #[must_use]
    pub fn estimated_delivery(placed: DateTime<Utc>) -> DateTime<Utc> {
        placed
            .checked_add_days(Days::new(DELIVERY_ESTIMATE_DAYS))
            .unwrap_or(placed)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.qty)).sum()
    }

    /// Numbered item lines, one per cart line: `1. Name x2 - $20.00`.
    #[must_use]
    pub fn items_list(&self, currency_suffix: &str) -> String {
        self.items
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                format!(
                    "{}. {} x{} - ${}{currency_suffix}",
                    idx + 1,
                    line.name,
                    line.qty,
                    format_amount(line.line_total())
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Plain-text order summary handed to the customer after checkout, to be
    /// quoted when submitting payment proof.
    #[must_use]
    pub fn details_text(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "訂單編號 Order ID: {}", self.id);
        let _ = writeln!(text, "訂單總額 Total Amount: ${} HKD", self.total);
        let _ = writeln!(text, "客戶姓名 Name: {}", self.user_name);
        let _ = writeln!(text, "客戶電話 Phone: {}", self.user_phone);
        let _ = writeln!(text, "客戶 Email: {}", self.user_email);
        let _ = write!(
            text,
            "配送方式 Delivery Method: {}",
            self.delivery_method.label()
        );
        if self.delivery_method.requires_address() {
            let _ = write!(text, "\n收貨地址 Address: {}", self.user_address);
        }
        let _ = write!(text, "\n\n商品清單 Items:\n{}\n\n", self.items_list(""));
        text.push_str(
            "請在提交付款證明時包含以上信息。Please include the above information when submitting payment proof.",
        );
        text
    }

    /// Suggested file name when the summary is saved.
    #[must_use]
    pub fn details_file_name(&self) -> String {
        format!("Order_{}.txt", self.id)
    }
}
