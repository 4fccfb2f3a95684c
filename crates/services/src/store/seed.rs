//! One-time demo dataset written when the store first loads with no users.

use domains::{
    BillingModel, NewAd, NewBoard, NewComment, NewEditorial, NewPost, NewProfilePost, Result,
    Session, User,
};
use tracing::info;

use super::Store;
use crate::persistence::Collection;

const DEMO_ADMIN: (&str, &str) = ("admin", "admin123");
const DEMO_USER: (&str, &str) = ("demo", "demo123");

impl Store {
    /// Seeds two users, a board with a post and a reply, an editorial, a paid
    /// profile post, and an ad awaiting review. Nobody is logged in afterwards.
    pub(super) fn seed_demo_data(&mut self) -> Result<()> {
        let admin = Session::for_user(self.provision_admin(DEMO_ADMIN.0, DEMO_ADMIN.1)?.id);

        let user = User::new(
            DEMO_USER.0,
            self.hash_password(DEMO_USER.1)?,
            self.options.starting_balance,
        );
        let demo = Session::for_user(user.id);
        self.data.users.push(user);
        self.persist(&[Collection::Users]);

        let board_id = self
            .create_board(
                &admin,
                NewBoard::open("general", "Talk about anything. Be kind."),
            )?
            .id;
        self.subscribe(&demo, board_id)?;

        let post_id = self
            .create_post(
                &admin,
                NewPost {
                    board_id,
                    title: "Welcome to The Qult".into(),
                    content: "Introduce yourself below, earn **Kopeki**, and hand out awards."
                        .into(),
                    media: vec![],
                },
            )?
            .id;
        self.create_comment(
            &demo,
            NewComment {
                post_id,
                parent_id: None,
                content: "Glad to be here!".into(),
                media: vec![],
            },
        )?;

        self.create_editorial(
            &admin,
            NewEditorial {
                title: "State of the Qult".into(),
                content: "Boards, awards, and paid posts are live.".into(),
                media: vec![],
            },
        )?;
        self.create_profile_post(
            &demo,
            NewProfilePost {
                title: "My secret recipe".into(),
                content: "Two parts patience, one part Kopeki.".into(),
                media: vec![],
                price: 500,
            },
        )?;
        self.create_ad(
            &demo,
            NewAd {
                board_id,
                title: "Demo's Bakery".into(),
                content: "Fresh bread every morning.".into(),
                link_url: "https://bakery.example".into(),
                image_url: None,
                budget: 50.0,
                model: BillingModel::Cpc,
                bid_amount: 0.5,
            },
        )?;

        info!(users = self.data.users.len(), "demo data seeded");
        Ok(())
    }
}
