#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use yatube_server::application::auth_service::hash_password;
use yatube_server::application::{AuthService, BlogService};
use yatube_server::data::{GroupRepository, PostRepository, UserRepository};
use yatube_server::domain::group::CreateGroupRequest;
use yatube_server::domain::user::RegisterUserRequest;
use yatube_server::domain::{
    Author, DomainError, Group, GroupRef, NewPost, Post, PostFilter, User,
};
use yatube_server::infrastructure::jwt::JwtService;
use yatube_server::infrastructure::media::MediaStorage;
use yatube_server::presentation::identity::SESSION_COOKIE;
use yatube_server::presentation::errors::not_found_pages;
use yatube_server::presentation::routes;

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const PASSWORD: &str = "correct-horse-battery";
pub const BOUNDARY: &str = "----yatube-test-boundary";

/// Users, groups and posts kept in memory, in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    groups: Mutex<Vec<Group>>,
    posts: Mutex<Vec<Post>>,
}

impl MemoryStore {
    pub fn add_user(&self, username: &str) -> User {
        let mut users = self.users.lock().unwrap();
        let user = User {
            id: users.len() as i64 + 1,
            username: username.to_string(),
            email: format!("{}@example.com", username.to_lowercase()),
            password_hash: hash_password(PASSWORD).unwrap(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        user
    }

    pub fn add_group(&self, title: &str, slug: &str) -> Group {
        let mut groups = self.groups.lock().unwrap();
        let group = Group {
            id: groups.len() as i64 + 1,
            title: title.to_string(),
            slug: slug.to_string(),
            description: format!("About {}", title),
        };
        groups.push(group.clone());
        group
    }

    pub fn add_post_at(
        &self,
        author: &User,
        group: Option<&Group>,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Post {
        let mut posts = self.posts.lock().unwrap();
        let post = Post {
            id: posts.len() as i64 + 1,
            text: text.to_string(),
            created_at,
            author: Author {
                id: author.id,
                username: author.username.clone(),
            },
            group: group.map(|g| GroupRef {
                id: g.id,
                title: g.title.clone(),
                slug: g.slug.clone(),
            }),
            image: None,
        };
        posts.push(post.clone());
        post
    }

    /// Adds `count` posts, one minute apart, oldest first.
    pub fn add_posts(&self, author: &User, group: Option<&Group>, count: usize) -> Vec<Post> {
        let start = Utc.with_ymd_and_hms(2023, 3, 20, 9, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                self.add_post_at(
                    author,
                    group,
                    &format!("Test text {}", i),
                    start + Duration::minutes(i as i64),
                )
            })
            .collect()
    }

    pub fn find_user(&self, username: &str) -> User {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .unwrap()
    }

    pub fn post(&self, id: i64) -> Option<Post> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn latest_post(&self) -> Option<Post> {
        self.posts.lock().unwrap().last().cloned()
    }

    fn sorted(&self, filter: PostFilter) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }

    fn group_ref(&self, group_id: Option<i64>) -> Option<GroupRef> {
        let groups = self.groups.lock().unwrap();
        group_id.and_then(|id| {
            groups.iter().find(|g| g.id == id).map(|g| GroupRef {
                id: g.id,
                title: g.title.clone(),
                slug: g.slug.clone(),
            })
        })
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, author_id: i64, post: NewPost) -> Result<Post, DomainError> {
        let author = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == author_id)
            .cloned()
            .ok_or(DomainError::UserNotFound)?;
        let group = self.group_ref(post.group_id);

        let mut posts = self.posts.lock().unwrap();
        let created = Post {
            id: posts.len() as i64 + 1,
            text: post.text,
            created_at: Utc::now(),
            author: Author {
                id: author.id,
                username: author.username,
            },
            group,
            image: post.image,
        };
        posts.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError> {
        self.post(id).ok_or(DomainError::PostNotFound)
    }

    async fn update(&self, id: i64, post: NewPost) -> Result<Post, DomainError> {
        let group = self.group_ref(post.group_id);
        let mut posts = self.posts.lock().unwrap();
        let stored = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(DomainError::PostNotFound)?;
        stored.text = post.text;
        stored.group = group;
        if post.image.is_some() {
            stored.image = post.image;
        }
        Ok(stored.clone())
    }

    async fn count(&self, filter: PostFilter) -> Result<i64, DomainError> {
        Ok(self.sorted(filter).len() as i64)
    }

    async fn list(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, DomainError> {
        Ok(self
            .sorted(filter)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create(&self, req: CreateGroupRequest) -> Result<Group, DomainError> {
        if self.find_by_slug(&req.slug).await.is_ok() {
            return Err(DomainError::GroupAlreadyExists);
        }
        let mut group = self.add_group(&req.title, &req.slug);
        group.description = req.description;
        Ok(group)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Group, DomainError> {
        self.groups
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.slug == slug)
            .cloned()
            .ok_or(DomainError::GroupNotFound)
    }

    async fn list(&self) -> Result<Vec<Group>, DomainError> {
        let mut groups = self.groups.lock().unwrap().clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(
        &self,
        req: RegisterUserRequest,
        password_hash: String,
    ) -> Result<User, DomainError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.username == req.username || u.email == req.email)
        {
            return Err(DomainError::UserAlreadyExists);
        }
        let user = User {
            id: users.len() as i64 + 1,
            username: req.username,
            email: req.email,
            password_hash,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(DomainError::UserNotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, DomainError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(DomainError::UserNotFound)
    }
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub jwt: Arc<JwtService>,
    pub blog: Arc<BlogService>,
    pub auth: Arc<AuthService>,
    pub media_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let jwt = Arc::new(JwtService::new(SECRET).unwrap());
        let media_dir = tempfile::tempdir().unwrap();
        let media = Arc::new(MediaStorage::new(media_dir.path()));

        let blog = Arc::new(BlogService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            media,
        ));
        let auth = Arc::new(AuthService::new(store.clone(), jwt.clone()));

        Self {
            store,
            jwt,
            blog,
            auth,
            media_dir,
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(not_found_pages())
            .app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.blog.clone()))
            .app_data(web::Data::new(self.jwt.clone()))
            .configure(routes::configure)
    }

    pub fn session_for(&self, user: &User) -> Cookie<'static> {
        let token = self
            .jwt
            .generate_token(user.id, user.username.clone())
            .unwrap();
        Cookie::new(SESSION_COOKIE, token)
    }
}

pub fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri)
}

/// A `multipart/form-data` POST carrying text fields and an optional file.
pub fn multipart_post(
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> test::TestRequest {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    test::TestRequest::post()
        .uri(uri)
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

pub async fn body_text<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn template_marker(name: &str) -> String {
    format!("data-template=\"{}\"", name)
}

/// Number of post cards rendered on a listing page.
pub fn card_count(html: &str) -> usize {
    html.matches("<article class=\"post\"").count()
}

/// Ids of post cards in render order.
pub fn card_ids(html: &str) -> Vec<i64> {
    html.split("<article class=\"post\" data-post-id=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .filter_map(|id| id.parse().ok())
        .collect()
}
