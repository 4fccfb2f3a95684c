//! Content: board posts, threaded comments, profile posts, and editorials.

use chrono::Utc;
use domains::{
    Comment, DomainError, Editorial, NewComment, NewEditorial, NewPost, NewProfilePost, Post,
    PostPatch, ProfilePost, Result, Session,
};
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

use super::{require_text, validate_media, Store};
use crate::persistence::Collection;

impl Store {
    pub fn post(&self, id: Uuid) -> Option<&Post> {
        self.data.posts.iter().find(|p| p.id == id)
    }

    pub fn comment(&self, id: Uuid) -> Option<&Comment> {
        self.data.comments.iter().find(|c| c.id == id)
    }

    pub fn profile_post(&self, id: Uuid) -> Option<&ProfilePost> {
        self.data.profile_posts.iter().find(|p| p.id == id)
    }

    pub fn editorial(&self, id: Uuid) -> Option<&Editorial> {
        self.data.editorials.iter().find(|e| e.id == id)
    }

    /// Creates a post. Without a logged-in user the post is anonymous, which
    /// the board must allow. The board must be unlocked for the caller.
    pub fn create_post(&mut self, session: &Session, new: NewPost) -> Result<&Post> {
        let author_id = session.current_user();
        let board = self.ensure_access(new.board_id, session)?;
        if author_id.is_none() && !board.allow_anonymous_posts {
            return Err(DomainError::AnonymousNotAllowed("posts"));
        }
        let title = require_text(&new.title, "title")?;
        validate_media(&new.media)?;

        let post = Post {
            id: Uuid::new_v4(),
            title,
            content: new.content,
            media: new.media,
            board_id: new.board_id,
            author_id,
            created_at: Utc::now(),
        };
        let id = post.id;
        self.data.posts.push(post);
        self.persist(&[Collection::Posts]);
        info!(post_id = %id, board_id = %new.board_id, anonymous = author_id.is_none(), "post created");
        self.find_post(id)
    }

    /// Authors and site admins may edit a post.
    pub fn update_post(&mut self, session: &Session, post_id: Uuid, patch: PostPatch) -> Result<&Post> {
        let user = self.require_user(session)?;
        let post = self.find_post(post_id)?;
        if post.author_id != Some(user.id) && !user.is_admin() {
            return Err(DomainError::forbidden("only the author can edit this post"));
        }
        let title = patch
            .title
            .as_deref()
            .map(|t| require_text(t, "title"))
            .transpose()?;
        if let Some(media) = &patch.media {
            validate_media(media)?;
        }

        let post = self.post_mut(post_id)?;
        if let Some(title) = title {
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(media) = patch.media {
            post.media = media;
        }
        self.persist(&[Collection::Posts]);
        self.find_post(post_id)
    }

    /// Deletes a post with its whole comment tree and every vote on them.
    pub fn delete_post(&mut self, session: &Session, post_id: Uuid) -> Result<()> {
        let post = self.find_post(post_id)?;
        let board_id = post.board_id;
        self.require_author_or_staff(session, post.author_id, board_id)?;

        let mut removed: HashSet<Uuid> = self
            .data
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.id)
            .collect();
        self.data.comments.retain(|c| c.post_id != post_id);
        self.data.posts.retain(|p| p.id != post_id);
        removed.insert(post_id);
        self.data.votes.retain(|v| !removed.contains(&v.entity_id));

        self.persist(&[Collection::Posts, Collection::Comments, Collection::Votes]);
        info!(post_id = %post_id, comments = removed.len() - 1, "post deleted");
        Ok(())
    }

    /// Posts on a board, newest first. Empty if the board is locked for the caller.
    pub fn board_feed(&self, board_id: Uuid, session: &Session) -> Vec<&Post> {
        if !self.is_board_unlocked(board_id, session) {
            return Vec::new();
        }
        let mut posts: Vec<&Post> = self
            .data
            .posts
            .iter()
            .filter(|p| p.board_id == board_id)
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    pub fn create_comment(&mut self, session: &Session, new: NewComment) -> Result<&Comment> {
        let author_id = session.current_user();
        let board_id = self.find_post(new.post_id)?.board_id;
        let board = self.ensure_access(board_id, session)?;
        if author_id.is_none() && !board.allow_anonymous_comments {
            return Err(DomainError::AnonymousNotAllowed("comments"));
        }
        if let Some(parent_id) = new.parent_id {
            let parent = self
                .comment(parent_id)
                .ok_or_else(|| DomainError::not_found("comment", parent_id))?;
            if parent.post_id != new.post_id {
                return Err(DomainError::validation("reply must belong to the same post"));
            }
        }
        if new.content.trim().is_empty() && new.media.is_empty() {
            return Err(DomainError::validation("comment cannot be empty"));
        }
        validate_media(&new.media)?;

        let comment = Comment {
            id: Uuid::new_v4(),
            content: new.content,
            post_id: new.post_id,
            author_id,
            parent_id: new.parent_id,
            media: new.media,
            created_at: Utc::now(),
        };
        let id = comment.id;
        self.data.comments.push(comment);
        self.persist(&[Collection::Comments]);
        self.find_comment(id)
    }

    /// Deletes a comment and every reply beneath it, at any depth.
    pub fn delete_comment(&mut self, session: &Session, comment_id: Uuid) -> Result<()> {
        let comment = self.find_comment(comment_id)?;
        let board_id = self.find_post(comment.post_id)?.board_id;
        self.require_author_or_staff(session, comment.author_id, board_id)?;

        let mut removed = HashSet::from([comment_id]);
        let mut frontier = vec![comment_id];
        while let Some(parent) = frontier.pop() {
            for child in self
                .data
                .comments
                .iter()
                .filter(|c| c.parent_id == Some(parent))
            {
                if removed.insert(child.id) {
                    frontier.push(child.id);
                }
            }
        }
        self.data.comments.retain(|c| !removed.contains(&c.id));
        self.data.votes.retain(|v| !removed.contains(&v.entity_id));

        self.persist(&[Collection::Comments, Collection::Votes]);
        Ok(())
    }

    /// Comments on a post in the order they were written.
    pub fn comments_for_post(&self, post_id: Uuid) -> Vec<&Comment> {
        self.data
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .collect()
    }

    pub fn create_profile_post(&mut self, session: &Session, new: NewProfilePost) -> Result<&ProfilePost> {
        let author_id = self.require_user(session)?.id;
        let title = require_text(&new.title, "title")?;
        validate_media(&new.media)?;

        let post = ProfilePost {
            id: Uuid::new_v4(),
            title,
            content: new.content,
            media: new.media,
            author_id,
            price: new.price,
            unlocked_user_ids: Vec::new(),
            created_at: Utc::now(),
        };
        let id = post.id;
        self.data.profile_posts.push(post);
        self.persist(&[Collection::ProfilePosts]);
        info!(post_id = %id, price = new.price, "profile post created");
        self.find_profile_post(id)
    }

    pub fn delete_profile_post(&mut self, session: &Session, post_id: Uuid) -> Result<()> {
        let user = self.require_user(session)?;
        let post = self.find_profile_post(post_id)?;
        if post.author_id != user.id && !user.is_admin() {
            return Err(DomainError::forbidden("only the author can delete this post"));
        }
        self.data.profile_posts.retain(|p| p.id != post_id);
        self.data.votes.retain(|v| v.entity_id != post_id);
        self.persist(&[Collection::ProfilePosts, Collection::Votes]);
        Ok(())
    }

    /// Free posts are public; paid posts need the author or a paid unlock.
    pub fn can_view_profile_post(&self, post_id: Uuid, session: &Session) -> bool {
        let Some(post) = self.profile_post(post_id) else {
            return false;
        };
        match session.current_user() {
            Some(viewer) => post.is_unlocked_for(viewer),
            None => !post.is_paid(),
        }
    }

    /// A user's profile posts, newest first.
    pub fn profile_posts_by(&self, author_id: Uuid) -> Vec<&ProfilePost> {
        let mut posts: Vec<&ProfilePost> = self
            .data
            .profile_posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    pub fn create_editorial(&mut self, session: &Session, new: NewEditorial) -> Result<&Editorial> {
        let author_id = self.require_site_admin(session)?;
        validate_media(&new.media)?;
        let editorial = Editorial {
            id: Uuid::new_v4(),
            title: require_text(&new.title, "title")?,
            content: new.content,
            media: new.media,
            author_id,
            created_at: Utc::now(),
        };
        let id = editorial.id;
        self.data.editorials.push(editorial);
        self.persist(&[Collection::Editorials]);
        info!(editorial_id = %id, "editorial published");
        self.find_editorial(id)
    }

    pub fn update_editorial(
        &mut self,
        session: &Session,
        editorial_id: Uuid,
        patch: PostPatch,
    ) -> Result<&Editorial> {
        self.require_site_admin(session)?;
        let title = patch
            .title
            .as_deref()
            .map(|t| require_text(t, "title"))
            .transpose()?;
        if let Some(media) = &patch.media {
            validate_media(media)?;
        }
        let editorial = self
            .data
            .editorials
            .iter_mut()
            .find(|e| e.id == editorial_id)
            .ok_or_else(|| DomainError::not_found("editorial", editorial_id))?;
        if let Some(title) = title {
            editorial.title = title;
        }
        if let Some(content) = patch.content {
            editorial.content = content;
        }
        if let Some(media) = patch.media {
            editorial.media = media;
        }
        self.persist(&[Collection::Editorials]);
        self.find_editorial(editorial_id)
    }

    pub fn delete_editorial(&mut self, session: &Session, editorial_id: Uuid) -> Result<()> {
        self.require_site_admin(session)?;
        self.find_editorial(editorial_id)?;
        self.data.editorials.retain(|e| e.id != editorial_id);
        self.data.votes.retain(|v| v.entity_id != editorial_id);
        self.persist(&[Collection::Editorials, Collection::Votes]);
        Ok(())
    }

    /// Editorials, newest first.
    pub fn editorials(&self) -> Vec<&Editorial> {
        let mut editorials: Vec<&Editorial> = self.data.editorials.iter().collect();
        editorials.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        editorials
    }

    // ── Lookups ─────────────────────────────────────────────────────────────

    pub(super) fn find_post(&self, id: Uuid) -> Result<&Post> {
        self.post(id).ok_or_else(|| DomainError::not_found("post", id))
    }

    pub(super) fn find_comment(&self, id: Uuid) -> Result<&Comment> {
        self.comment(id).ok_or_else(|| DomainError::not_found("comment", id))
    }

    pub(super) fn find_profile_post(&self, id: Uuid) -> Result<&ProfilePost> {
        self.profile_post(id)
            .ok_or_else(|| DomainError::not_found("profile post", id))
    }

    fn find_editorial(&self, id: Uuid) -> Result<&Editorial> {
        self.editorial(id)
            .ok_or_else(|| DomainError::not_found("editorial", id))
    }

    fn post_mut(&mut self, id: Uuid) -> Result<&mut Post> {
        self.data
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::not_found("post", id))
    }

    /// Authors, board staff, and site admins may remove content.
    fn require_author_or_staff(&self, session: &Session, author_id: Option<Uuid>, board_id: Uuid) -> Result<()> {
        let user = self.require_user(session)?;
        if author_id == Some(user.id) {
            return Ok(());
        }
        self.require_board_staff(session, board_id).map(|_| ())
    }
}
