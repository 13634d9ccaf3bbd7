use std::net::IpAddr;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, warn};

use crate::audit;
use crate::auth::dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, ResetPasswordRequest};
use crate::auth::gate::RateGate;
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, is_strong, verify_password};
use crate::auth::reset::ResetTokenCodec;
use crate::error::{ApiError, ApiResult};
use crate::mailer::Mailer;
use crate::state::AppState;
use crate::users::store::{NewUser, StoreError, UserStore};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Orchestrates registration, login and the password-reset flow over the
/// injected store, mailer, token codec and rate gate.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    jwt: JwtKeys,
    reset: ResetTokenCodec,
    reset_base_url: String,
    gate: Arc<dyn RateGate>,
}

impl AuthService {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            mailer: state.mailer.clone(),
            jwt: JwtKeys::from_config(&state.config.jwt),
            reset: ResetTokenCodec::new(&state.config.jwt.secret, &state.config.reset),
            reset_base_url: state.config.reset.base_url.clone(),
            gate: state.gate.clone(),
        }
    }

    pub async fn register(
        &self,
        req: RegisterRequest,
        origin: Option<IpAddr>,
    ) -> ApiResult<()> {
        if !self.gate.allow(origin, "register") {
            return Err(ApiError::RateLimited);
        }

        let username = req.username.trim();
        if username.is_empty() {
            return Err(ApiError::Validation("Username is required".into()));
        }
        let email = normalize_email(&req.email);

        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(ApiError::Internal)?
            .is_some()
        {
            audit::record("register_email_taken", &email, origin);
            return Err(ApiError::Conflict("Email already registered".into()));
        }

        if !is_strong(&req.password) {
            audit::record("register_weak_password", &email, origin);
            return Err(ApiError::Validation(
                "Password does not meet strength requirements".into(),
            ));
        }

        let password_hash = hash_password(&req.password).map_err(ApiError::Internal)?;
        let user = self
            .users
            .create(NewUser {
                username,
                email: &email,
                password_hash: &password_hash,
            })
            .await
            .map_err(|e| match e {
                // Lost the race against a concurrent registration; same
                // outcome as the pre-check.
                StoreError::Duplicate => {
                    audit::record("register_email_taken", &email, origin);
                    ApiError::Conflict("Email already registered".into())
                }
                StoreError::Other(e) => ApiError::Internal(e),
            })?;

        audit::record("registered", &user.email, origin);
        Ok(())
    }

    pub async fn login(
        &self,
        req: LoginRequest,
        origin: Option<IpAddr>,
    ) -> ApiResult<LoginResponse> {
        if !self.gate.allow(origin, "login") {
            return Err(ApiError::RateLimited);
        }

        let (Some(email), Some(password)) = (
            req.email.filter(|e| !e.is_empty()),
            req.password.filter(|p| !p.is_empty()),
        ) else {
            audit::record("login_missing_credentials", "", origin);
            return Err(ApiError::Validation(
                "Email and password are required".into(),
            ));
        };

        let email = normalize_email(&email);
        if !is_valid_email(&email) {
            audit::record("login_invalid_email_format", &email, origin);
            return Err(ApiError::Validation("Invalid email format".into()));
        }

        let user = match self
            .users
            .find_by_email(&email)
            .await
            .map_err(ApiError::Internal)?
        {
            Some(u) => u,
            None => {
                // Same error as a wrong password; the response must not
                // reveal whether the email is registered.
                audit::record("login_invalid_credentials", &email, origin);
                return Err(ApiError::Unauthorized("Invalid credentials".into()));
            }
        };

        let ok = verify_password(&password, &user.password_hash).map_err(ApiError::Internal)?;
        if !ok {
            audit::record("login_invalid_credentials", &email, origin);
            return Err(ApiError::Unauthorized("Invalid credentials".into()));
        }

        let access_token = self.jwt.sign_access(user.id).map_err(ApiError::Internal)?;
        audit::record("login_success", &email, origin);
        Ok(LoginResponse {
            message: "Login successful".into(),
            access_token,
            user: PublicUser {
                id: user.id,
                username: user.username,
                email: user.email,
            },
        })
    }

    /// Always succeeds with the same generic outcome so callers cannot probe
    /// which emails exist. The reset link only goes out when the user does.
    pub async fn request_password_reset(
        &self,
        email: Option<String>,
        origin: Option<IpAddr>,
    ) -> ApiResult<()> {
        let Some(email) = email.map(|e| normalize_email(&e)).filter(|e| !e.is_empty()) else {
            return Ok(());
        };

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(ApiError::Internal)?;
        audit::record("reset_requested", &email, origin);
        let Some(user) = user else {
            return Ok(());
        };

        let token = match self.reset.encode(&user.email) {
            Ok(t) => t,
            Err(e) => {
                error!(error = %e, "reset token encode failed");
                return Ok(());
            }
        };
        let reset_url = format!("{}/reset-password?token={}", self.reset_base_url, token);
        let body = format!("Click the link to reset your password: {reset_url}");
        if let Err(e) = self
            .mailer
            .send(&user.email, "Password Reset Request", &body)
            .await
        {
            // Delivery problems stay server-side; the response is generic
            // either way.
            warn!(error = %e, "reset mail dispatch failed");
        }
        Ok(())
    }

    pub async fn reset_password(
        &self,
        req: ResetPasswordRequest,
        origin: Option<IpAddr>,
    ) -> ApiResult<()> {
        let email = self
            .reset
            .decode(&req.token)
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

        if !is_strong(&req.new_password) {
            audit::record("reset_weak_password", &email, origin);
            return Err(ApiError::Validation(
                "Password does not meet strength requirements".into(),
            ));
        }

        let password_hash = hash_password(&req.new_password).map_err(ApiError::Internal)?;
        self.users
            .update_password(user.id, &password_hash)
            .await
            .map_err(ApiError::Internal)?;

        audit::record("password_reset", &email, origin);
        Ok(())
    }
}
