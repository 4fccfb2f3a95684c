use domains::{
    AwardTarget, BillingModel, KeyValueStore, MockKeyValueStore, NewAd, NewBoard, NewComment,
    NewEditorial, NewMessage, NewPost, NewProfilePost, Session, VoteType,
};
use integration_tests::{open, sign_up, sign_up_admin, PASSWORD};
use services::{Collection, Store};
use std::sync::Arc;
use storage_adapters::JsonFileKv;
use tokio_test::assert_ok;

/// Touches every collection so the round trip covers every entity type.
fn populate(store: &mut Store) -> Session {
    let (alice, _) = sign_up(store);
    let (bob, bob_id) = sign_up(store);
    let board_id = store.create_board(&alice, NewBoard::open("persist", "")).unwrap().id;
    let post_id = store
        .create_post(
            &bob,
            NewPost {
                board_id,
                title: "kept".into(),
                content: "across restarts".into(),
                media: vec![],
            },
        )
        .unwrap()
        .id;
    store
        .create_comment(
            &alice,
            NewComment {
                post_id,
                content: "indeed".into(),
                ..NewComment::default()
            },
        )
        .unwrap();
    let mut voter = Session::anonymous();
    store.cast_vote(&mut voter, post_id, VoteType::Up).unwrap();
    store
        .give_award(&alice, post_id, AwardTarget::Post, "gold", bob_id)
        .unwrap();
    store
        .send_message(
            &alice,
            NewMessage {
                recipient_id: bob_id,
                content: "see you".into(),
                ..NewMessage::default()
            },
        )
        .unwrap();
    store
        .create_profile_post(
            &bob,
            NewProfilePost {
                title: "paid".into(),
                price: 50,
                ..NewProfilePost::default()
            },
        )
        .unwrap();
    assert_ok!(store.follow_user(&alice, bob_id));

    let (admin, _) = sign_up_admin(store);
    store
        .create_editorial(
            &admin,
            NewEditorial {
                title: "Release notes".into(),
                content: "Persistence works".into(),
                media: vec![],
            },
        )
        .unwrap();
    let ad_id = store
        .create_ad(
            &bob,
            NewAd {
                board_id,
                title: "Bob's shop".into(),
                content: "Open late".into(),
                link_url: "https://bob.example".into(),
                image_url: Some("https://bob.example/logo.png".into()),
                budget: 12.5,
                model: BillingModel::Cpc,
                bid_amount: 0.25,
            },
        )
        .unwrap()
        .id;
    assert_ok!(store.approve_ad(&admin, ad_id));
    assert!(store.track_ad_click(ad_id));
    bob
}

#[tokio::test]
async fn collections_survive_a_restart_field_for_field() {
    let dir = tempfile::tempdir().unwrap();
    let kv: Arc<dyn KeyValueStore> = Arc::new(JsonFileKv::open(dir.path()).await.unwrap());

    let mut store = open(kv.clone()).await;
    let bob = populate(&mut store);
    store.flush().await;
    let before = store.collections().clone();
    drop(store);

    let reopened = open(Arc::new(JsonFileKv::open(dir.path()).await.unwrap())).await;
    assert_eq!(reopened.collections(), &before);
    for collection in Collection::ALL {
        assert!(
            dir.path().join(format!("{}.json", collection.key())).exists(),
            "{} was not persisted",
            collection.key()
        );
    }

    // Bob registered last, so he is the persisted current user.
    assert_eq!(reopened.resume_session().current_user(), bob.current_user());
    assert!(reopened.resume_session().anonymous_id().is_some());
}

#[tokio::test]
async fn logged_out_session_is_not_resumed() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(Arc::new(JsonFileKv::open(dir.path()).await.unwrap())).await;
    let (mut session, id) = sign_up(&mut store);
    let name = store.user(id).unwrap().username.clone();
    store.logout(&mut session);
    store.flush().await;

    let mut reopened = open(Arc::new(JsonFileKv::open(dir.path()).await.unwrap())).await;
    assert_eq!(reopened.resume_session().current_user(), None);
    let mut login = Session::anonymous();
    assert_ok!(reopened.authenticate(&mut login, &name, PASSWORD));
}

#[tokio::test]
async fn failing_storage_does_not_fail_mutations() {
    let mut kv = MockKeyValueStore::new();
    kv.expect_get().returning(|_| Ok(None));
    kv.expect_put_many()
        .returning(|_| Err(anyhow::anyhow!("quota exceeded")));

    let mut store = open(Arc::new(kv)).await;
    let (session, _) = sign_up(&mut store);
    assert_ok!(store.create_board(&session, NewBoard::open("volatile", "")));
    store.flush().await;
    assert_eq!(store.collections().boards.len(), 1);
}
