use crate::application::AuthService;
use crate::domain::user::{LoginUserRequest, RegisterUserRequest};
use crate::domain::{DomainError, FieldErrors};
use crate::presentation::identity::SESSION_COOKIE;
use crate::presentation::views::{
    redirect, render, LoggedOutTemplate, LoginTemplate, SignupTemplate,
};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpResponse};
use std::sync::Arc;

const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

#[derive(serde::Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct LoginSubmission {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

/// Only local absolute paths are followed after login.
fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        "/"
    }
}

fn signed_in(token: String, location: &str) -> HttpResponse {
    let mut response = redirect(location);
    if let Err(e) = response.add_cookie(&session_cookie(token)) {
        tracing::error!("Failed to set session cookie: {}", e);
    }
    response
}

// ============== Signup ==============

pub async fn signup_form() -> Result<HttpResponse, DomainError> {
    render(&SignupTemplate::new(
        String::new(),
        String::new(),
        &FieldErrors::new(),
    ))
}

pub async fn signup(
    auth_service: web::Data<Arc<AuthService>>,
    form: web::Form<RegisterUserRequest>,
) -> Result<HttpResponse, DomainError> {
    let submitted = form.into_inner();
    let (username, email) = (submitted.username.clone(), submitted.email.clone());

    let request = match submitted.clean() {
        Ok(request) => request,
        Err(errors) => return render(&SignupTemplate::new(username, email, &errors)),
    };

    match auth_service.register(request).await {
        Ok((token, _user)) => Ok(signed_in(token, "/")),
        Err(DomainError::UserAlreadyExists) => {
            let mut errors = FieldErrors::new();
            errors.add(
                "username",
                "A user with that username or email already exists.",
            );
            render(&SignupTemplate::new(username, email, &errors))
        }
        Err(err) => Err(err),
    }
}

// ============== Login / Logout ==============

pub async fn login_form(query: web::Query<NextQuery>) -> Result<HttpResponse, DomainError> {
    render(&LoginTemplate {
        viewer: None,
        username: String::new(),
        next: query.into_inner().next.unwrap_or_default(),
        error: None,
    })
}

pub async fn login(
    auth_service: web::Data<Arc<AuthService>>,
    form: web::Form<LoginSubmission>,
) -> Result<HttpResponse, DomainError> {
    let LoginSubmission {
        username,
        password,
        next,
    } = form.into_inner();

    let request = LoginUserRequest {
        username: username.clone(),
        password,
    };

    match auth_service.login(request).await {
        Ok((token, _user)) => Ok(signed_in(token, safe_next(&next))),
        Err(DomainError::InvalidCredentials) => render(&LoginTemplate {
            viewer: None,
            username,
            next,
            error: Some(INVALID_LOGIN.to_string()),
        }),
        Err(err) => Err(err),
    }
}

pub async fn logout() -> Result<HttpResponse, DomainError> {
    let mut response = render(&LoggedOutTemplate { viewer: None })?;

    let mut removal = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    removal.make_removal();
    if let Err(e) = response.add_cookie(&removal) {
        tracing::error!("Failed to clear session cookie: {}", e);
    }

    Ok(response)
}
