use crate::application::blog_service::Submission;
use crate::application::paginator::PageRequest;
use crate::application::BlogService;
use crate::domain::DomainError;
use crate::presentation::forms::read_post_form;
use crate::presentation::identity::{viewer_name, CurrentUser};
use crate::presentation::views::{
    redirect, render, AboutAuthorTemplate, AboutTechTemplate, GroupListTemplate, IndexTemplate,
    PostDetailTemplate, PostFormTemplate, ProfileTemplate,
};
use actix_multipart::Multipart;
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use std::convert::Infallible;
use std::future::{ready, Ready};
use std::sync::Arc;
use url::form_urlencoded;

/// Page number from `?page=`.
///
/// Never rejects a request: a repeated key keeps its last value and anything
/// unparsable means the first page.
#[derive(Debug)]
pub struct PageQuery(PageRequest);

impl PageQuery {
    fn from_query_string(query: &str) -> Self {
        let page = form_urlencoded::parse(query.as_bytes())
            .filter(|(key, _)| key == "page")
            .map(|(_, value)| value.into_owned())
            .last();
        PageQuery(PageRequest::parse(page.as_deref()))
    }

    fn request(&self) -> PageRequest {
        self.0
    }
}

impl FromRequest for PageQuery {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(PageQuery::from_query_string(req.query_string())))
    }
}

// ============== Listing Handlers ==============

pub async fn index(
    blog_service: web::Data<Arc<BlogService>>,
    query: PageQuery,
    viewer: Option<CurrentUser>,
) -> Result<HttpResponse, DomainError> {
    let request = query.request();

    tracing::info!("Listing posts, {:?}", request);

    let page = blog_service.index(request).await?;
    render(&IndexTemplate::new(viewer_name(&viewer), page))
}

pub async fn group_posts(
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<String>,
    query: PageQuery,
    viewer: Option<CurrentUser>,
) -> Result<HttpResponse, DomainError> {
    let slug = path.into_inner();

    tracing::info!("Listing posts of group slug={}", slug);

    let listing = blog_service.group_posts(&slug, query.request()).await?;
    render(&GroupListTemplate::new(viewer_name(&viewer), listing))
}

pub async fn profile(
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<String>,
    query: PageQuery,
    viewer: Option<CurrentUser>,
) -> Result<HttpResponse, DomainError> {
    let username = path.into_inner();

    tracing::info!("Listing posts of author username={}", username);

    let listing = blog_service.profile(&username, query.request()).await?;
    render(&ProfileTemplate::new(viewer_name(&viewer), listing))
}

pub async fn post_detail(
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
    viewer: Option<CurrentUser>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();

    tracing::info!("Getting post with id={}", post_id);

    let detail = blog_service.post_detail(post_id).await?;
    render(&PostDetailTemplate::new(viewer_name(&viewer), detail))
}

// ============== Create / Edit Handlers ==============

pub async fn post_create_form(
    blog_service: web::Data<Arc<BlogService>>,
    user: CurrentUser,
) -> Result<HttpResponse, DomainError> {
    let groups = blog_service.groups().await?;
    render(&PostFormTemplate::create(
        user.identity().username.clone(),
        &groups,
    ))
}

pub async fn post_create(
    blog_service: web::Data<Arc<BlogService>>,
    user: CurrentUser,
    payload: Multipart,
) -> Result<HttpResponse, DomainError> {
    let identity = user.into_inner();

    tracing::info!("Creating post for user_id={}", identity.user_id);

    let form = read_post_form(payload).await?;

    match blog_service.create_post(&identity, form).await? {
        Submission::Saved(post) => Ok(redirect(&format!(
            "/profile/{}/",
            post.author.username
        ))),
        Submission::Rejected { values, errors } => {
            let groups = blog_service.groups().await?;
            render(&PostFormTemplate::rejected(
                identity.username,
                None,
                values,
                errors,
                &groups,
                None,
            ))
        }
    }
}

pub async fn post_edit_form(
    blog_service: web::Data<Arc<BlogService>>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let identity = user.into_inner();

    // Чужой пост: молча возвращаем на главную
    let post = match blog_service.post_for_edit(post_id, &identity).await {
        Ok(post) => post,
        Err(DomainError::Forbidden) => return Ok(redirect("/")),
        Err(err) => return Err(err),
    };

    let groups = blog_service.groups().await?;
    render(&PostFormTemplate::edit(identity.username, post, &groups))
}

pub async fn post_edit(
    blog_service: web::Data<Arc<BlogService>>,
    user: CurrentUser,
    path: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let identity = user.into_inner();

    tracing::info!("Updating post id={} for user_id={}", post_id, identity.user_id);

    // Авторство проверяем до чтения тела
    let current = match blog_service.post_for_edit(post_id, &identity).await {
        Ok(post) => post,
        Err(DomainError::Forbidden) => return Ok(redirect("/")),
        Err(err) => return Err(err),
    };

    let form = read_post_form(payload).await?;

    match blog_service.update_post(post_id, &identity, form).await {
        Ok(Submission::Saved(post)) => Ok(redirect(&format!("/posts/{}/", post.id))),
        Ok(Submission::Rejected { values, errors }) => {
            let groups = blog_service.groups().await?;
            render(&PostFormTemplate::rejected(
                identity.username,
                Some(post_id),
                values,
                errors,
                &groups,
                current.image,
            ))
        }
        Err(DomainError::Forbidden) => Ok(redirect("/")),
        Err(err) => Err(err),
    }
}

// ============== Static pages ==============

pub async fn about_author(viewer: Option<CurrentUser>) -> Result<HttpResponse, DomainError> {
    render(&AboutAuthorTemplate {
        viewer: viewer_name(&viewer),
    })
}

pub async fn about_tech(viewer: Option<CurrentUser>) -> Result<HttpResponse, DomainError> {
    render(&AboutTechTemplate {
        viewer: viewer_name(&viewer),
    })
}

// Тело страницы 404 дорисовывает errors::not_found_pages
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    tracing::info!("No route for {} {}", req.method(), req.path());
    HttpResponse::NotFound().finish()
}
