use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed exchange rate between Kopeki and one unit of real currency.
pub const KOPEKI_PER_CURRENCY_UNIT: u64 = 10_000;

/// Currency value of a Kopeki amount, for display and the ledger only.
pub fn currency_value(kopeki: u64) -> f64 {
    kopeki as f64 / KOPEKI_PER_CURRENCY_UNIT as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AwardTarget {
    Post,
    Comment,
}

/// A badge given by one user to another. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Award {
    pub id: Uuid,
    /// Key into the static award catalog
    pub type_id: String,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub entity_id: Uuid,
    pub entity_type: AwardTarget,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Buy,
    Sell,
    AwardGiven,
    AwardReceived,
    PostUnlock,
    PostIncome,
    BoardEntry,
    BoardEntryIncome,
}

/// Append-only ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Kopeki moved; the direction follows from `kind`
    pub amount: u64,
    /// Real-currency equivalent, recorded for buy/sell only
    #[serde(default)]
    pub currency_amount: Option<f64>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(user_id: Uuid, kind: TransactionType, amount: u64, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            amount,
            currency_amount: None,
            description: description.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_currency(mut self) -> Self {
        self.currency_amount = Some(currency_value(self.amount));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_rate_is_ten_thousand_per_unit() {
        assert_eq!(currency_value(10_000), 1.0);
        assert_eq!(currency_value(25_000), 2.5);
    }

    #[test]
    fn transaction_type_serializes_snake_case() {
        let json = serde_json::to_string(&TransactionType::AwardReceived).unwrap();
        assert_eq!(json, "\"award_received\"");
    }
}
