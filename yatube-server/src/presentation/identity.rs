use crate::domain::Identity;
use crate::infrastructure::jwt::JwtService;
use actix_web::dev::Payload;
use actix_web::http::header::{self, Header};
use actix_web::http::StatusCode;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use std::future::{ready, Ready};
use std::sync::Arc;

pub const SESSION_COOKIE: &str = "token";
pub const LOGIN_URL: &str = "/auth/login/";

/// The authenticated caller of a request.
///
/// Handlers that require a login take this as an argument; public pages take
/// `Option<CurrentUser>` to know who is looking.
#[derive(Debug, Clone)]
pub struct CurrentUser(Identity);

impl CurrentUser {
    pub fn identity(&self) -> &Identity {
        &self.0
    }

    pub fn into_inner(self) -> Identity {
        self.0
    }
}

#[derive(Debug, thiserror::Error)]
#[error("login required to access {next}")]
pub struct LoginRequired {
    next: String,
}

impl LoginRequired {
    fn for_request(req: &HttpRequest) -> Self {
        let next = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());
        Self { next }
    }

    pub fn login_url(&self) -> String {
        format!("{}?next={}", LOGIN_URL, urlencoding::encode(&self.next))
    }
}

impl ResponseError for LoginRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, self.login_url()))
            .finish()
    }
}

// Cookie first (browser session), then a bearer header (scripts)
fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    Authorization::<Bearer>::parse(req)
        .ok()
        .map(|auth| auth.into_scheme().token().to_string())
}

fn authenticate(req: &HttpRequest) -> Option<Identity> {
    let token = session_token(req)?;

    let jwt_service = match req.app_data::<web::Data<Arc<JwtService>>>() {
        Some(service) => service,
        None => {
            tracing::error!("JWT service not configured");
            return None;
        }
    };

    jwt_service.verify_token(&token).ok()
}

impl FromRequest for CurrentUser {
    type Error = LoginRequired;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(match authenticate(req) {
            Some(identity) => Ok(CurrentUser(identity)),
            None => {
                tracing::debug!("Anonymous request to protected path {}", req.path());
                Err(LoginRequired::for_request(req))
            }
        })
    }
}

/// Username of the optional viewer, for page chrome.
pub fn viewer_name(viewer: &Option<CurrentUser>) -> Option<String> {
    viewer.as_ref().map(|user| user.identity().username.clone())
}

/// Username behind the request's session, if any. For code outside extractors.
pub fn viewer_of(req: &HttpRequest) -> Option<String> {
    authenticate(req).map(|identity| identity.username)
}
