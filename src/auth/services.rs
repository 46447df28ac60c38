use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{AuthResponse, LoginRequest, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo::{NewUser, User},
};
use crate::{error::AppError, state::AppState};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.]{3,30}$").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Trims and lowercases what needs it, then checks the shape of each field.
pub(crate) fn normalize_registration(mut req: RegisterRequest) -> Result<RegisterRequest, AppError> {
    req.username = req.username.trim().to_string();
    req.email = req.email.trim().to_lowercase();
    if !USERNAME_RE.is_match(&req.username) {
        return Err(AppError::validation(
            "username",
            "3-30 letters, digits, '_' or '.'",
        ));
    }
    if !is_valid_email(&req.email) {
        return Err(AppError::validation("email", "Invalid email"));
    }
    if req.password.len() < 8 {
        return Err(AppError::validation("password", "Password too short"));
    }
    Ok(req)
}

fn issue(keys: &JwtKeys, user: User) -> Result<AuthResponse, AppError> {
    Ok(AuthResponse {
        access_token: keys.sign_access(user.id)?,
        refresh_token: keys.sign_refresh(user.id)?,
        user: user.into(),
    })
}

pub async fn register(st: &AppState, req: RegisterRequest) -> Result<AuthResponse, AppError> {
    let req = normalize_registration(req)?;
    if User::taken(&st.db, &req.username, &req.email).await? {
        warn!(username = %req.username, "username or email already registered");
        return Err(AppError::Conflict("Username or email already registered".into()));
    }
    let hash = hash_password(&req.password)?;
    let user = User::create(
        &st.db,
        NewUser {
            username: &req.username,
            email: &req.email,
            password_hash: &hash,
            firstname: req.firstname.as_deref(),
            lastname: req.lastname.as_deref(),
            fcm_token: req.fcm_token.as_deref(),
        },
    )
    .await?;
    info!(user_id = %user.id, username = %user.username, "user registered");
    issue(&JwtKeys::from_ref(st), user)
}

pub async fn login(st: &AppState, req: LoginRequest) -> Result<AuthResponse, AppError> {
    let login = req.login.trim();
    let invalid = || AppError::Unauthorized("Invalid credentials".into());
    let Some(user) = User::find_by_login(&st.db, login).await? else {
        warn!(login = %login, "login unknown user");
        return Err(invalid());
    };
    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid());
    }
    info!(user_id = %user.id, "user logged in");
    issue(&JwtKeys::from_ref(st), user)
}

pub async fn refresh(st: &AppState, refresh_token: &str) -> Result<AuthResponse, AppError> {
    let keys = JwtKeys::from_ref(st);
    let claims = keys
        .verify_refresh(refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;
    let user = load(st, claims.sub).await?;
    issue(&keys, user)
}

pub async fn load(st: &AppState, user_id: Uuid) -> Result<User, AppError> {
    User::find_by_id(&st.db, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))
}
