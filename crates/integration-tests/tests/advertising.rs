use domains::{AdStatus, BillingModel, NewAd, NewBoard};
use integration_tests::{memory_store, sign_up, sign_up_admin};
use tokio_test::assert_ok;

#[tokio::test]
async fn thousand_cpm_impressions_cost_exactly_the_bid() {
    let mut store = memory_store().await;
    let (advertiser, advertiser_id) = sign_up(&mut store);
    let (admin, _) = sign_up_admin(&mut store);
    let board_id = store.create_board(&advertiser, NewBoard::open("ads", "")).unwrap().id;
    let ad_id = store
        .create_ad(
            &advertiser,
            NewAd {
                board_id,
                title: "Widgets".into(),
                content: "Buy one".into(),
                link_url: "https://widgets.example".into(),
                image_url: None,
                budget: 500.0,
                model: BillingModel::Cpm,
                bid_amount: 5.0,
            },
        )
        .unwrap()
        .id;
    assert_ok!(store.approve_ad(&admin, ad_id));

    for _ in 0..1000 {
        store.track_ad_impression(ad_id);
    }
    let ad = store.ad(ad_id).unwrap();
    assert_eq!(ad.views, 1000);
    assert_eq!(ad.spent, 5.0);
    assert_eq!(ad.status, AdStatus::Active);

    let summary = store.ad_spend_summary(advertiser_id);
    assert_eq!(summary.total_spent, 5.0);
    assert_eq!(summary.views, 1000);
}

#[tokio::test]
async fn campaign_stops_at_its_budget() {
    let mut store = memory_store().await;
    let (advertiser, _) = sign_up(&mut store);
    let (admin, _) = sign_up_admin(&mut store);
    let board_id = store.create_board(&advertiser, NewBoard::open("ads", "")).unwrap().id;
    let ad_id = store
        .create_ad(
            &advertiser,
            NewAd {
                board_id,
                title: "Gadgets".into(),
                content: "Click me".into(),
                link_url: "https://gadgets.example".into(),
                image_url: None,
                budget: 1.0,
                model: BillingModel::Cpm,
                bid_amount: 10.0,
            },
        )
        .unwrap()
        .id;
    assert_ok!(store.approve_ad(&admin, ad_id));

    let tracked = (0..500).filter(|_| store.track_ad_impression(ad_id)).count();
    let ad = store.ad(ad_id).unwrap();
    assert_eq!(tracked, 100);
    assert_eq!(ad.status, AdStatus::Completed);
    assert!(ad.spent >= ad.budget);
    assert!(store.ad_for_board(board_id).is_none());
}
