use crate::application::paginator::{Page, PageRequest, Paginator};
use crate::data::{GroupRepository, PostRepository, UserRepository};
use crate::domain::{
    Author, DomainError, FieldErrors, Group, Identity, NewPost, Post, PostFilter, PostForm,
    PostFormValues,
};
use crate::infrastructure::media::MediaStorage;
use std::sync::Arc;

pub struct GroupListing {
    pub group: Group,
    pub page: Page<Post>,
}

pub struct ProfileListing {
    pub author: Author,
    pub post_count: i64,
    pub page: Page<Post>,
}

pub struct PostDetail {
    pub post: Post,
    pub author_post_count: i64,
}

/// Result of a create or edit submission.
#[derive(Debug)]
pub enum Submission {
    Saved(Post),
    Rejected {
        values: PostFormValues,
        errors: FieldErrors,
    },
}

pub struct BlogService {
    post_repo: Arc<dyn PostRepository + Send + Sync>,
    group_repo: Arc<dyn GroupRepository + Send + Sync>,
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    media: Arc<MediaStorage>,
    paginator: Paginator,
}

impl BlogService {
    pub fn new(
        post_repo: Arc<dyn PostRepository + Send + Sync>,
        group_repo: Arc<dyn GroupRepository + Send + Sync>,
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        media: Arc<MediaStorage>,
    ) -> Self {
        Self {
            post_repo,
            group_repo,
            user_repo,
            media,
            paginator: Paginator::default(),
        }
    }

    async fn paginate(
        &self,
        filter: PostFilter,
        request: PageRequest,
    ) -> Result<Page<Post>, DomainError> {
        let total = self.post_repo.count(filter).await?;
        let window = self.paginator.window(total, request);
        let posts = self
            .post_repo
            .list(filter, window.limit(), window.offset())
            .await?;
        Ok(window.into_page(posts))
    }

    pub async fn index(&self, request: PageRequest) -> Result<Page<Post>, DomainError> {
        self.paginate(PostFilter::all(), request).await
    }

    pub async fn group_posts(
        &self,
        slug: &str,
        request: PageRequest,
    ) -> Result<GroupListing, DomainError> {
        let group = self.group_repo.find_by_slug(slug).await?;
        let page = self.paginate(PostFilter::by_group(group.id), request).await?;
        Ok(GroupListing { group, page })
    }

    pub async fn profile(
        &self,
        username: &str,
        request: PageRequest,
    ) -> Result<ProfileListing, DomainError> {
        let user = self.user_repo.find_by_username(username).await?;
        let page = self
            .paginate(PostFilter::by_author(user.id), request)
            .await?;

        Ok(ProfileListing {
            author: Author {
                id: user.id,
                username: user.username,
            },
            post_count: page.total,
            page,
        })
    }

    pub async fn post_detail(&self, id: i64) -> Result<PostDetail, DomainError> {
        let post = self.post_repo.find_by_id(id).await?;
        let author_post_count = self
            .post_repo
            .count(PostFilter::by_author(post.author.id))
            .await?;
        Ok(PostDetail {
            post,
            author_post_count,
        })
    }

    pub async fn groups(&self) -> Result<Vec<Group>, DomainError> {
        self.group_repo.list().await
    }

    /// Validates and persists a new post owned by `author`.
    pub async fn create_post(
        &self,
        author: &Identity,
        form: PostForm,
    ) -> Result<Submission, DomainError> {
        let values = form.values();
        let groups = self.group_repo.list().await?;

        let draft = match form.clean(&groups) {
            Ok(draft) => draft,
            Err(errors) => {
                tracing::debug!("Rejected post submission from user_id={}", author.user_id);
                return Ok(Submission::Rejected { values, errors });
            }
        };

        let image = match &draft.image {
            Some(upload) => Some(self.media.save_post_image(upload).await?),
            None => None,
        };

        let post = self
            .post_repo
            .create(
                author.user_id,
                NewPost {
                    text: draft.text,
                    group_id: draft.group_id,
                    image,
                },
            )
            .await?;

        tracing::info!("Post created: id={}, author_id={}", post.id, author.user_id);

        Ok(Submission::Saved(post))
    }

    /// Loads a post for editing; only its author gets it back.
    pub async fn post_for_edit(&self, id: i64, editor: &Identity) -> Result<Post, DomainError> {
        let post = self.post_repo.find_by_id(id).await?;

        if !post.is_authored_by(editor.user_id) {
            tracing::warn!(
                "User {} attempted to edit post {} owned by {}",
                editor.user_id,
                id,
                post.author.id
            );
            return Err(DomainError::Forbidden);
        }

        Ok(post)
    }

    pub async fn update_post(
        &self,
        id: i64,
        editor: &Identity,
        form: PostForm,
    ) -> Result<Submission, DomainError> {
        // Check if post exists and user is author
        self.post_for_edit(id, editor).await?;

        let values = form.values();
        let groups = self.group_repo.list().await?;

        let draft = match form.clean(&groups) {
            Ok(draft) => draft,
            Err(errors) => return Ok(Submission::Rejected { values, errors }),
        };

        let image = match &draft.image {
            Some(upload) => Some(self.media.save_post_image(upload).await?),
            None => None,
        };

        let post = self
            .post_repo
            .update(
                id,
                NewPost {
                    text: draft.text,
                    group_id: draft.group_id,
                    image,
                },
            )
            .await?;

        tracing::info!("Post updated: id={}, author_id={}", id, editor.user_id);

        Ok(Submission::Saved(post))
    }
}
