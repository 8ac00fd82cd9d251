use crate::data::UserRepository;
use crate::domain::user::{LoginUserRequest, RegisterUserRequest};
use crate::domain::{DomainError, User};
use crate::infrastructure::jwt::JwtService;
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::Arc;

pub struct AuthService {
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    jwt_service: Arc<JwtService>,
}

pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            DomainError::InternalError(format!("Password hashing failed: {}", e))
        })
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            user_repo,
            jwt_service,
        }
    }

    /// Creates the account and returns a session token for it.
    ///
    /// `req` is expected to have passed `RegisterUserRequest::clean`.
    pub async fn register(&self, req: RegisterUserRequest) -> Result<(String, User), DomainError> {
        tracing::debug!("Registering username: {}, email: {}", req.username, req.email);

        // Check if user already exists
        if self.user_repo.find_by_username(&req.username).await.is_ok() {
            tracing::warn!("Registration failed: username already exists");
            return Err(DomainError::UserAlreadyExists);
        }
        if self.user_repo.find_by_email(&req.email).await.is_ok() {
            tracing::warn!("Registration failed: email already exists");
            return Err(DomainError::UserAlreadyExists);
        }

        let password_hash = hash_password(&req.password)?;
        let user = self.user_repo.create(req, password_hash).await?;

        let token = self
            .jwt_service
            .generate_token(user.id, user.username.clone())?;

        tracing::info!(
            "User registered successfully: id={}, username={}",
            user.id,
            user.username
        );
        Ok((token, user))
    }

    pub async fn login(&self, req: LoginUserRequest) -> Result<(String, User), DomainError> {
        tracing::debug!("Login attempt for username: {}", req.username);

        let user = match self.user_repo.find_by_username(req.username.trim()).await {
            Ok(u) => u,
            Err(DomainError::UserNotFound) => {
                tracing::warn!("User not found: {}", req.username);
                return Err(DomainError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|e| {
            tracing::error!("Invalid password hash format: {}", e);
            DomainError::InternalError(format!("Invalid password hash: {}", e))
        })?;

        if Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            tracing::warn!("Invalid password for user {}", user.username);
            return Err(DomainError::InvalidCredentials);
        }

        let token = self
            .jwt_service
            .generate_token(user.id, user.username.clone())?;

        tracing::info!(
            "User logged in successfully: id={}, username={}",
            user.id,
            user.username
        );
        Ok((token, user))
    }
}
