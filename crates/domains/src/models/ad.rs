use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a campaign.
///
/// `pending → active | rejected`, `active → rejected | completed`.
/// `rejected` and `completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdStatus {
    Pending,
    Active,
    Rejected,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingModel {
    /// Cost per click
    #[serde(rename = "CPC")]
    Cpc,
    /// Cost per thousand impressions
    #[serde(rename = "CPM")]
    Cpm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advertisement {
    pub id: Uuid,
    pub board_id: Uuid,
    /// The advertiser
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub link_url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub status: AdStatus,
    pub budget: f64,
    pub spent: f64,
    pub model: BillingModel,
    pub bid_amount: f64,
    pub views: u64,
    pub clicks: u64,
    pub created_at: DateTime<Utc>,
}

impl Advertisement {
    pub fn is_active(&self) -> bool {
        self.status == AdStatus::Active
    }

    /// Spend implied by the counters. Only the event matching the billing
    /// model is charged, so the total is exact regardless of call count.
    pub fn billed_amount(&self) -> f64 {
        match self.model {
            BillingModel::Cpm => self.views as f64 * self.bid_amount / 1000.0,
            BillingModel::Cpc => self.clicks as f64 * self.bid_amount,
        }
    }

    /// Recomputes `spent` and closes the campaign once the budget is used up.
    pub fn settle(&mut self) {
        self.spent = self.billed_amount();
        if self.spent >= self.budget {
            self.status = AdStatus::Completed;
        }
    }
}
