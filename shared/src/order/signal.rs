//! Broadcast signals published by the order workflow

use serde::{Deserialize, Serialize};

/// Lifecycle signal broadcast to workflow subscribers
///
/// Delivery is best-effort: send errors (no subscribers) are ignored by
/// the publisher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSignal {
    Placed { order_id: String },
    Paid { order_id: String },
    Refunded { order_id: String, amount: f64 },
    Cancelled { order_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_serde_tag() {
        let signal = OrderSignal::Refunded {
            order_id: "o1".to_string(),
            amount: 12.5,
        };
        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["type"], "REFUNDED");
        assert_eq!(json["order_id"], "o1");
    }
}
