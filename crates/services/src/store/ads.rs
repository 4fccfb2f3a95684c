//! Advertising campaigns: review, delivery tracking, and spend accounting.

use chrono::Utc;
use domains::{AdStatus, Advertisement, DomainError, NewAd, Result, Session};
use tracing::{debug, info};
use uuid::Uuid;

use super::{require_text, Store};
use crate::persistence::Collection;

/// Campaign totals for one advertiser.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AdSpendSummary {
    pub campaigns: usize,
    pub active: usize,
    pub total_budget: f64,
    pub total_spent: f64,
    pub views: u64,
    pub clicks: u64,
}

impl Store {
    pub fn ad(&self, id: Uuid) -> Option<&Advertisement> {
        self.data.ads.iter().find(|a| a.id == id)
    }

    /// Submits a campaign for review; it always starts `pending`.
    pub fn create_ad(&mut self, session: &Session, new: NewAd) -> Result<&Advertisement> {
        let user_id = self.require_user(session)?.id;
        self.find_board(new.board_id)?;
        let title = require_text(&new.title, "title")?;
        let link_url = new.link_url.trim();
        if !(link_url.starts_with("https://") || link_url.starts_with("http://")) {
            return Err(DomainError::validation("link must be an http(s) URL"));
        }
        if !(new.budget.is_finite() && new.budget > 0.0) {
            return Err(DomainError::validation("budget must be positive"));
        }
        if !(new.bid_amount.is_finite() && new.bid_amount > 0.0) {
            return Err(DomainError::validation("bid must be positive"));
        }

        let ad = Advertisement {
            id: Uuid::new_v4(),
            board_id: new.board_id,
            user_id,
            title,
            content: new.content,
            link_url: link_url.to_string(),
            image_url: new.image_url,
            status: AdStatus::Pending,
            budget: new.budget,
            spent: 0.0,
            model: new.model,
            bid_amount: new.bid_amount,
            views: 0,
            clicks: 0,
            created_at: Utc::now(),
        };
        let id = ad.id;
        self.data.ads.push(ad);
        self.persist(&[Collection::Ads]);
        info!(ad_id = %id, "ad submitted");
        self.find_ad(id)
    }

    /// `pending → active`. Site admins only.
    pub fn approve_ad(&mut self, session: &Session, ad_id: Uuid) -> Result<()> {
        self.require_site_admin(session)?;
        let ad = self.ad_mut(ad_id)?;
        if ad.status != AdStatus::Pending {
            return Err(DomainError::validation("only pending ads can be approved"));
        }
        ad.status = AdStatus::Active;
        self.persist(&[Collection::Ads]);
        info!(ad_id = %ad_id, "ad approved");
        Ok(())
    }

    /// `pending | active → rejected`. Site admins review; owners may stop
    /// their own campaigns.
    pub fn reject_ad(&mut self, session: &Session, ad_id: Uuid) -> Result<()> {
        let user = self.require_user(session)?;
        let ad = self.find_ad(ad_id)?;
        if ad.user_id != user.id && !user.is_admin() {
            return Err(DomainError::forbidden("only the advertiser or a site admin can stop this ad"));
        }
        if !matches!(ad.status, AdStatus::Pending | AdStatus::Active) {
            return Err(DomainError::validation("ad is already closed"));
        }
        self.ad_mut(ad_id)?.status = AdStatus::Rejected;
        self.persist(&[Collection::Ads]);
        info!(ad_id = %ad_id, "ad rejected");
        Ok(())
    }

    /// Records a view. Returns false, changing nothing, unless the ad is active.
    pub fn track_ad_impression(&mut self, ad_id: Uuid) -> bool {
        self.track(ad_id, |ad| ad.views += 1)
    }

    /// Records a click. Returns false, changing nothing, unless the ad is active.
    pub fn track_ad_click(&mut self, ad_id: Uuid) -> bool {
        self.track(ad_id, |ad| ad.clicks += 1)
    }

    /// The active ad with the highest bid on a board.
    pub fn ad_for_board(&self, board_id: Uuid) -> Option<&Advertisement> {
        self.data
            .ads
            .iter()
            .filter(|a| a.board_id == board_id && a.is_active())
            .max_by(|a, b| a.bid_amount.total_cmp(&b.bid_amount))
    }

    pub fn ads_by(&self, user_id: Uuid) -> Vec<&Advertisement> {
        self.data.ads.iter().filter(|a| a.user_id == user_id).collect()
    }

    /// Review queue, oldest first.
    pub fn pending_ads(&self) -> Vec<&Advertisement> {
        self.data
            .ads
            .iter()
            .filter(|a| a.status == AdStatus::Pending)
            .collect()
    }

    pub fn ad_spend_summary(&self, user_id: Uuid) -> AdSpendSummary {
        self.ads_by(user_id)
            .into_iter()
            .fold(AdSpendSummary::default(), |mut summary, ad| {
                summary.campaigns += 1;
                summary.active += usize::from(ad.is_active());
                summary.total_budget += ad.budget;
                summary.total_spent += ad.spent;
                summary.views += ad.views;
                summary.clicks += ad.clicks;
                summary
            })
    }

    fn track(&mut self, ad_id: Uuid, record: impl FnOnce(&mut Advertisement)) -> bool {
        let Some(ad) = self.data.ads.iter_mut().find(|a| a.id == ad_id) else {
            return false;
        };
        if !ad.is_active() {
            return false;
        }
        record(ad);
        ad.settle();
        if ad.status == AdStatus::Completed {
            info!(ad_id = %ad_id, spent = ad.spent, "ad budget exhausted");
        } else {
            debug!(ad_id = %ad_id, views = ad.views, clicks = ad.clicks, "ad event tracked");
        }
        self.persist(&[Collection::Ads]);
        true
    }

    fn find_ad(&self, id: Uuid) -> Result<&Advertisement> {
        self.ad(id).ok_or_else(|| DomainError::not_found("ad", id))
    }

    fn ad_mut(&mut self, id: Uuid) -> Result<&mut Advertisement> {
        self.data
            .ads
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| DomainError::not_found("ad", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{empty_store, sign_up, sign_up_admin};
    use domains::{BillingModel, NewBoard};

    fn campaign(board_id: Uuid, model: BillingModel, bid: f64, budget: f64) -> NewAd {
        NewAd {
            board_id,
            title: "Buy widgets".into(),
            content: "The finest widgets".into(),
            link_url: "https://widgets.example".into(),
            image_url: None,
            budget,
            model,
            bid_amount: bid,
        }
    }

    struct Fixture {
        store: Store,
        admin: Session,
        advertiser: Session,
        board_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let mut store = empty_store().await;
        let admin = sign_up_admin(&mut store, "root");
        let advertiser = sign_up(&mut store, "shop");
        let board_id = store.create_board(&advertiser, NewBoard::open("market", "")).unwrap().id;
        Fixture {
            store,
            admin,
            advertiser,
            board_id,
        }
    }

    #[tokio::test]
    async fn new_ads_wait_for_review_and_do_not_track() {
        let Fixture {
            mut store,
            advertiser,
            board_id,
            ..
        } = fixture().await;
        let ad = store
            .create_ad(&advertiser, campaign(board_id, BillingModel::Cpm, 5.0, 100.0))
            .unwrap();
        assert_eq!(ad.status, AdStatus::Pending);
        let id = ad.id;

        assert!(!store.track_ad_impression(id));
        assert_eq!(store.ad(id).unwrap().views, 0);
        assert_eq!(store.pending_ads().len(), 1);
    }

    #[tokio::test]
    async fn only_site_admins_approve() {
        let Fixture {
            mut store,
            admin,
            advertiser,
            board_id,
        } = fixture().await;
        let id = store
            .create_ad(&advertiser, campaign(board_id, BillingModel::Cpc, 1.0, 10.0))
            .unwrap()
            .id;

        assert!(matches!(
            store.approve_ad(&advertiser, id),
            Err(DomainError::Forbidden(_))
        ));
        store.approve_ad(&admin, id).unwrap();
        assert!(store.ad(id).unwrap().is_active());
        assert!(matches!(store.approve_ad(&admin, id), Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn thousand_cpm_impressions_spend_the_bid() {
        let Fixture {
            mut store,
            admin,
            advertiser,
            board_id,
        } = fixture().await;
        let id = store
            .create_ad(&advertiser, campaign(board_id, BillingModel::Cpm, 5.0, 100.0))
            .unwrap()
            .id;
        store.approve_ad(&admin, id).unwrap();

        for _ in 0..1000 {
            assert!(store.track_ad_impression(id));
        }
        let ad = store.ad(id).unwrap();
        assert_eq!(ad.views, 1000);
        assert_eq!(ad.spent, 5.0);
        assert_eq!(ad.status, AdStatus::Active);
    }

    #[tokio::test]
    async fn exhausted_budget_completes_the_campaign() {
        let Fixture {
            mut store,
            admin,
            advertiser,
            board_id,
        } = fixture().await;
        let id = store
            .create_ad(&advertiser, campaign(board_id, BillingModel::Cpc, 2.0, 5.0))
            .unwrap()
            .id;
        store.approve_ad(&admin, id).unwrap();

        assert!(store.track_ad_click(id));
        assert!(store.track_ad_click(id));
        assert!(store.track_ad_click(id));
        assert!(!store.track_ad_click(id));
        let ad = store.ad(id).unwrap();
        assert_eq!(ad.status, AdStatus::Completed);
        assert_eq!(ad.clicks, 3);
        assert_eq!(ad.spent, 6.0);
    }

    #[tokio::test]
    async fn owners_can_stop_their_campaigns() {
        let Fixture {
            mut store,
            admin,
            advertiser,
            board_id,
        } = fixture().await;
        let stranger = sign_up(&mut store, "stranger");
        let id = store
            .create_ad(&advertiser, campaign(board_id, BillingModel::Cpm, 1.0, 10.0))
            .unwrap()
            .id;
        store.approve_ad(&admin, id).unwrap();

        assert!(matches!(store.reject_ad(&stranger, id), Err(DomainError::Forbidden(_))));
        store.reject_ad(&advertiser, id).unwrap();
        assert_eq!(store.ad(id).unwrap().status, AdStatus::Rejected);
        assert!(!store.track_ad_impression(id));
        assert!(matches!(store.approve_ad(&admin, id), Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn highest_active_bid_wins_the_slot() {
        let Fixture {
            mut store,
            admin,
            advertiser,
            board_id,
        } = fixture().await;
        let low = store
            .create_ad(&advertiser, campaign(board_id, BillingModel::Cpm, 1.0, 10.0))
            .unwrap()
            .id;
        let high = store
            .create_ad(&advertiser, campaign(board_id, BillingModel::Cpm, 9.0, 10.0))
            .unwrap()
            .id;
        assert!(store.ad_for_board(board_id).is_none());

        store.approve_ad(&admin, low).unwrap();
        assert_eq!(store.ad_for_board(board_id).unwrap().id, low);
        store.approve_ad(&admin, high).unwrap();
        assert_eq!(store.ad_for_board(board_id).unwrap().id, high);
    }

    #[tokio::test]
    async fn spend_summary_totals_campaigns() {
        let Fixture {
            mut store,
            admin,
            advertiser,
            board_id,
        } = fixture().await;
        let advertiser_id = advertiser.current_user().unwrap();
        let a = store
            .create_ad(&advertiser, campaign(board_id, BillingModel::Cpc, 1.5, 10.0))
            .unwrap()
            .id;
        store
            .create_ad(&advertiser, campaign(board_id, BillingModel::Cpm, 2.0, 20.0))
            .unwrap();
        store.approve_ad(&admin, a).unwrap();
        store.track_ad_click(a);
        store.track_ad_impression(a);

        let summary = store.ad_spend_summary(advertiser_id);
        assert_eq!(summary.campaigns, 2);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.total_budget, 30.0);
        assert_eq!(summary.total_spent, 1.5);
        assert_eq!((summary.views, summary.clicks), (1, 1));
    }

    #[tokio::test]
    async fn invalid_campaigns_are_rejected() {
        let Fixture {
            mut store,
            advertiser,
            board_id,
            ..
        } = fixture().await;
        let mut bad_link = campaign(board_id, BillingModel::Cpc, 1.0, 10.0);
        bad_link.link_url = "javascript:alert(1)".into();
        assert!(matches!(
            store.create_ad(&advertiser, bad_link),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            store.create_ad(&advertiser, campaign(board_id, BillingModel::Cpc, 1.0, 0.0)),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(
            store
                .create_ad(&Session::anonymous(), campaign(board_id, BillingModel::Cpc, 1.0, 5.0))
                .unwrap_err(),
            DomainError::NotLoggedIn
        );
    }
}
