use crate::application::blog_service::{GroupListing, PostDetail, ProfileListing};
use crate::application::paginator::Page;
use crate::domain::{DomainError, FieldErrors, Group, Post, PostFormValues};
use actix_web::http::header::{self, ContentType};
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use askama::Template;

const DATE_FORMAT: &str = "%d %B %Y";

pub fn render<T: Template>(template: &T) -> Result<HttpResponse, DomainError> {
    render_with_status(template, StatusCode::OK)
}

pub fn render_with_status<T: Template>(
    template: &T,
    status: StatusCode,
) -> Result<HttpResponse, DomainError> {
    let html = template.render().map_err(|e| {
        tracing::error!("Template rendering failed: {}", e);
        DomainError::InternalError(format!("Template rendering failed: {}", e))
    })?;

    Ok(HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(html))
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub struct GroupLink {
    pub title: String,
    pub slug: String,
}

pub struct PostCard {
    pub id: i64,
    pub text: String,
    pub created_at: String,
    pub author_username: String,
    pub group: Option<GroupLink>,
    pub image_url: Option<String>,
}

impl From<Post> for PostCard {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            text: post.text,
            created_at: post.created_at.format(DATE_FORMAT).to_string(),
            author_username: post.author.username,
            group: post.group.map(|g| GroupLink {
                title: g.title,
                slug: g.slug,
            }),
            image_url: post.image.map(|path| format!("/media/{}", path)),
        }
    }
}

pub struct PageLink {
    pub number: i64,
    pub current: bool,
}

pub struct Pagination {
    pub number: i64,
    pub num_pages: i64,
    pub previous: Option<i64>,
    pub next: Option<i64>,
    pub pages: Vec<PageLink>,
}

fn cards(page: Page<Post>) -> (Vec<PostCard>, Pagination) {
    let pagination = Pagination {
        number: page.number,
        num_pages: page.num_pages,
        previous: page.previous_page_number(),
        next: page.next_page_number(),
        pages: page
            .page_range()
            .map(|number| PageLink {
                number,
                current: number == page.number,
            })
            .collect(),
    };
    (page.items.into_iter().map(PostCard::from).collect(), pagination)
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexTemplate {
    pub viewer: Option<String>,
    pub posts: Vec<PostCard>,
    pub pagination: Pagination,
}

impl IndexTemplate {
    pub fn new(viewer: Option<String>, page: Page<Post>) -> Self {
        let (posts, pagination) = cards(page);
        Self {
            viewer,
            posts,
            pagination,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupListTemplate {
    pub viewer: Option<String>,
    pub group: Group,
    pub posts: Vec<PostCard>,
    pub pagination: Pagination,
}

impl GroupListTemplate {
    pub fn new(viewer: Option<String>, listing: GroupListing) -> Self {
        let (posts, pagination) = cards(listing.page);
        Self {
            viewer,
            group: listing.group,
            posts,
            pagination,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfileTemplate {
    pub viewer: Option<String>,
    pub author_username: String,
    pub post_count: i64,
    pub posts: Vec<PostCard>,
    pub pagination: Pagination,
}

impl ProfileTemplate {
    pub fn new(viewer: Option<String>, listing: ProfileListing) -> Self {
        let (posts, pagination) = cards(listing.page);
        Self {
            viewer,
            author_username: listing.author.username,
            post_count: listing.post_count,
            posts,
            pagination,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailTemplate {
    pub viewer: Option<String>,
    pub post: PostCard,
    pub author_post_count: i64,
    pub can_edit: bool,
}

impl PostDetailTemplate {
    pub fn new(viewer: Option<String>, detail: PostDetail) -> Self {
        let can_edit = viewer.as_deref() == Some(detail.post.author.username.as_str());
        Self {
            viewer,
            post: PostCard::from(detail.post),
            author_post_count: detail.author_post_count,
            can_edit,
        }
    }
}

pub struct GroupOption {
    pub id: i64,
    pub title: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct PostFormTemplate {
    pub viewer: Option<String>,
    pub is_edit: bool,
    pub action: String,
    pub text: String,
    pub groups: Vec<GroupOption>,
    pub current_image: Option<String>,
    pub text_errors: Vec<String>,
    pub group_errors: Vec<String>,
    pub image_errors: Vec<String>,
}

impl PostFormTemplate {
    fn build(
        viewer: String,
        post_id: Option<i64>,
        values: PostFormValues,
        errors: FieldErrors,
        groups: &[Group],
        current_image: Option<String>,
    ) -> Self {
        let selected = values.group.trim().to_string();
        Self {
            viewer: Some(viewer),
            is_edit: post_id.is_some(),
            action: match post_id {
                Some(id) => format!("/posts/{}/edit/", id),
                None => "/create/".to_string(),
            },
            text: values.text,
            groups: groups
                .iter()
                .map(|g| GroupOption {
                    id: g.id,
                    title: g.title.clone(),
                    selected: g.id.to_string() == selected,
                })
                .collect(),
            current_image: current_image.map(|path| format!("/media/{}", path)),
            text_errors: errors.messages("text"),
            group_errors: errors.messages("group"),
            image_errors: errors.messages("image"),
        }
    }

    pub fn create(viewer: String, groups: &[Group]) -> Self {
        Self::build(
            viewer,
            None,
            PostFormValues::default(),
            FieldErrors::new(),
            groups,
            None,
        )
    }

    pub fn edit(viewer: String, post: Post, groups: &[Group]) -> Self {
        let values = PostFormValues {
            text: post.text,
            group: post.group.map(|g| g.id.to_string()).unwrap_or_default(),
        };
        Self::build(
            viewer,
            Some(post.id),
            values,
            FieldErrors::new(),
            groups,
            post.image,
        )
    }

    pub fn rejected(
        viewer: String,
        post_id: Option<i64>,
        values: PostFormValues,
        errors: FieldErrors,
        groups: &[Group],
        current_image: Option<String>,
    ) -> Self {
        Self::build(viewer, post_id, values, errors, groups, current_image)
    }
}

#[derive(Template)]
#[template(path = "users/signup.html")]
pub struct SignupTemplate {
    pub viewer: Option<String>,
    pub username: String,
    pub email: String,
    pub username_errors: Vec<String>,
    pub email_errors: Vec<String>,
    pub password_errors: Vec<String>,
}

impl SignupTemplate {
    pub fn new(username: String, email: String, errors: &FieldErrors) -> Self {
        Self {
            viewer: None,
            username,
            email,
            username_errors: errors.messages("username"),
            email_errors: errors.messages("email"),
            password_errors: errors.messages("password"),
        }
    }
}

#[derive(Template)]
#[template(path = "users/login.html")]
pub struct LoginTemplate {
    pub viewer: Option<String>,
    pub username: String,
    pub next: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "users/logged_out.html")]
pub struct LoggedOutTemplate {
    pub viewer: Option<String>,
}

#[derive(Template)]
#[template(path = "about/author.html")]
pub struct AboutAuthorTemplate {
    pub viewer: Option<String>,
}

#[derive(Template)]
#[template(path = "about/tech.html")]
pub struct AboutTechTemplate {
    pub viewer: Option<String>,
}

#[derive(Template)]
#[template(path = "core/404.html")]
pub struct NotFoundTemplate {
    pub viewer: Option<String>,
    pub path: Option<String>,
}

pub fn not_found_response(viewer: Option<String>, path: Option<String>) -> HttpResponse {
    let template = NotFoundTemplate { viewer, path };
    match render_with_status(&template, StatusCode::NOT_FOUND) {
        Ok(response) => response,
        Err(_) => HttpResponse::NotFound()
            .content_type(ContentType::plaintext())
            .body("Not found"),
    }
}
