use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::services::jwt::TokenPair;
use crate::application::use_cases::users::delete_user::DeleteUser;
use crate::application::use_cases::users::get_user::GetUser;
use crate::application::use_cases::users::list_users::ListUsers;
use crate::application::use_cases::users::login::Login;
use crate::application::use_cases::users::refresh_tokens::RefreshTokens;
use crate::application::use_cases::users::register::{Register, RegisterInput};
use crate::application::use_cases::users::request_password_reset::RequestPasswordReset;
use crate::application::use_cases::users::resend_verification::ResendVerification;
use crate::application::use_cases::users::reset_password::ResetPassword;
use crate::application::use_cases::users::update_profile::UpdateProfile;
use crate::application::use_cases::users::verify_email::VerifyEmail;
use crate::bootstrap::app_context::AppContext;
use crate::domain::users::user::{User, UserProfilePatch};
use crate::presentation::http::MessageResponse;
use crate::presentation::http::auth::{AdminUser, AuthUser};
use crate::presentation::http::error::ApiResult;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub patronymic: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub surname: String,
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    pub patronymic: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub surname: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub patronymic: String,
    pub surname: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub is_email_verified: bool,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            patronymic: u.patronymic,
            surname: u.surname,
            email: u.email,
            date_of_birth: u.date_of_birth,
            is_email_verified: u.is_email_verified,
            role: u.role.as_str().to_string(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// OAuth2 password flow form; `username` carries the email.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshForm {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordForm {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(t: TokenPair) -> Self {
        Self {
            access_token: t.access_token,
            refresh_token: t.refresh_token,
            token_type: t.token_type.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CodeQuery {
    pub code: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/user", post(register))
        .route("/user/token", post(login))
        .route("/user/refresh", post(refresh))
        .route("/user/self", get(get_self).patch(update_self))
        .route("/user/all", get(list_users))
        .route("/user/email", get(get_user_by_email))
        .route("/user/email/verify", post(verify_email))
        .route("/user/email/verify/resend", post(resend_verification))
        .route("/user/password/reset/email", post(request_password_reset))
        .route("/user/password/reset", post(reset_password))
        .route("/user/:id", get(get_user).delete(delete_user))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/user", tag = "Users", request_body = RegisterRequest, responses(
    (status = 201, body = UserResponse),
    (status = 400, body = crate::presentation::http::error::ErrorBody),
    (status = 409, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    req.validate()?;
    let repo = ctx.user_repo();
    let mailer = ctx.mailer();
    let uc = Register {
        repo: repo.as_ref(),
        mailer: mailer.as_ref(),
        code_ttl: ctx.verification_code_ttl(),
    };
    let user = uc
        .execute(&RegisterInput {
            name: req.name,
            patronymic: req.patronymic,
            surname: req.surname,
            email: req.email,
            password: req.password,
            date_of_birth: req.date_of_birth,
        })
        .await?;
    tracing::info!(user_id = user.id, "user_registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(post, path = "/api/user/token", tag = "Users",
    request_body(content = TokenForm, content_type = "application/x-www-form-urlencoded"),
    responses((status = 200, body = TokenResponse), (status = 400, body = crate::presentation::http::error::ErrorBody)))]
pub async fn login(
    State(ctx): State<AppContext>,
    Form(form): Form<TokenForm>,
) -> ApiResult<Json<TokenResponse>> {
    let repo = ctx.user_repo();
    let uc = Login {
        repo: repo.as_ref(),
        jwt: ctx.jwt(),
    };
    let tokens = uc.execute(&form.username, &form.password).await?;
    Ok(Json(tokens.into()))
}

#[utoipa::path(post, path = "/api/user/refresh", tag = "Users",
    request_body(content = RefreshForm, content_type = "application/x-www-form-urlencoded"),
    responses((status = 200, body = TokenResponse), (status = 400, body = crate::presentation::http::error::ErrorBody)))]
pub async fn refresh(
    State(ctx): State<AppContext>,
    Form(form): Form<RefreshForm>,
) -> ApiResult<Json<TokenResponse>> {
    let repo = ctx.user_repo();
    let uc = RefreshTokens {
        repo: repo.as_ref(),
        jwt: ctx.jwt(),
    };
    Ok(Json(uc.execute(&form.refresh_token).await?.into()))
}

#[utoipa::path(get, path = "/api/user/self", tag = "Users", responses((status = 200, body = UserResponse)))]
pub async fn get_self(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let repo = ctx.user_repo();
    let uc = GetUser {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(actor.user_id).await?.into()))
}

#[utoipa::path(patch, path = "/api/user/self", tag = "Users", request_body = UpdateProfileRequest,
    responses((status = 200, body = UserResponse)))]
pub async fn update_self(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;
    let repo = ctx.user_repo();
    let uc = UpdateProfile {
        repo: repo.as_ref(),
    };
    let patch = UserProfilePatch {
        name: req.name,
        patronymic: req.patronymic,
        surname: req.surname,
        date_of_birth: req.date_of_birth,
    };
    Ok(Json(uc.execute(actor.user_id, &patch).await?.into()))
}

#[utoipa::path(get, path = "/api/user/{id}", tag = "Users",
    params(("id" = i64, Path, description = "User id")),
    responses((status = 200, body = UserResponse), (status = 404, body = crate::presentation::http::error::ErrorBody)))]
pub async fn get_user(
    State(ctx): State<AppContext>,
    AuthUser(_actor): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    let repo = ctx.user_repo();
    let uc = GetUser {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

#[utoipa::path(delete, path = "/api/user/{id}", tag = "Users",
    params(("id" = i64, Path, description = "User id")),
    responses((status = 200, body = MessageResponse), (status = 403, body = crate::presentation::http::error::ErrorBody)))]
pub async fn delete_user(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let repo = ctx.user_repo();
    let uc = DeleteUser {
        repo: repo.as_ref(),
    };
    uc.execute(&actor, id).await?;
    tracing::info!(user_id = id, by = actor.user_id, "user_deleted");
    Ok(Json(MessageResponse::ok("user deleted")))
}

#[utoipa::path(get, path = "/api/user/all", tag = "Users", responses((status = 200, body = [UserResponse])))]
pub async fn list_users(
    State(ctx): State<AppContext>,
    AdminUser(actor): AdminUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let repo = ctx.user_repo();
    let uc = ListUsers {
        repo: repo.as_ref(),
    };
    let users = uc.execute(&actor).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/api/user/email", tag = "Users", params(EmailQuery),
    responses((status = 200, body = UserResponse), (status = 404, body = crate::presentation::http::error::ErrorBody)))]
pub async fn get_user_by_email(
    State(ctx): State<AppContext>,
    AdminUser(_actor): AdminUser,
    Query(q): Query<EmailQuery>,
) -> ApiResult<Json<UserResponse>> {
    let repo = ctx.user_repo();
    let uc = GetUser {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.by_email(&q.email).await?.into()))
}

#[utoipa::path(post, path = "/api/user/email/verify", tag = "Users", params(CodeQuery),
    responses((status = 200, body = MessageResponse), (status = 400, body = crate::presentation::http::error::ErrorBody)))]
pub async fn verify_email(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Query(q): Query<CodeQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let repo = ctx.user_repo();
    let uc = VerifyEmail {
        repo: repo.as_ref(),
    };
    uc.execute(actor.user_id, &q.code).await?;
    Ok(Json(MessageResponse::ok("email verified")))
}

#[utoipa::path(post, path = "/api/user/email/verify/resend", tag = "Users",
    responses((status = 200, body = MessageResponse)))]
pub async fn resend_verification(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    let repo = ctx.user_repo();
    let mailer = ctx.mailer();
    let uc = ResendVerification {
        repo: repo.as_ref(),
        mailer: mailer.as_ref(),
        code_ttl: ctx.verification_code_ttl(),
    };
    uc.execute(actor.user_id).await?;
    Ok(Json(MessageResponse::ok("verification code sent")))
}

#[utoipa::path(post, path = "/api/user/password/reset/email", tag = "Users", params(EmailQuery),
    security(()), responses((status = 200, body = MessageResponse)))]
pub async fn request_password_reset(
    State(ctx): State<AppContext>,
    Query(q): Query<EmailQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let repo = ctx.user_repo();
    let mailer = ctx.mailer();
    let uc = RequestPasswordReset {
        repo: repo.as_ref(),
        mailer: mailer.as_ref(),
        jwt: ctx.jwt(),
        frontend_url: ctx.frontend_url(),
    };
    uc.execute(&q.email).await?;
    Ok(Json(MessageResponse::ok(
        "if the account exists, a reset link has been sent",
    )))
}

#[utoipa::path(post, path = "/api/user/password/reset", tag = "Users",
    request_body(content = ResetPasswordForm, content_type = "application/x-www-form-urlencoded"),
    security(()), responses((status = 200, body = MessageResponse), (status = 400, body = crate::presentation::http::error::ErrorBody)))]
pub async fn reset_password(
    State(ctx): State<AppContext>,
    Form(form): Form<ResetPasswordForm>,
) -> ApiResult<Json<MessageResponse>> {
    let repo = ctx.user_repo();
    let uc = ResetPassword {
        repo: repo.as_ref(),
        jwt: ctx.jwt(),
    };
    uc.execute(&form.token, &form.password).await?;
    Ok(Json(MessageResponse::ok("password updated")))
}
