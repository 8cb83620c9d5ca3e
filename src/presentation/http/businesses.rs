use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::use_cases::businesses::add_member::AddMember;
use crate::application::use_cases::businesses::create_business::CreateBusiness;
use crate::application::use_cases::businesses::delete_business::DeleteBusiness;
use crate::application::use_cases::businesses::get_business::GetBusiness;
use crate::application::use_cases::businesses::list_businesses::ListBusinesses;
use crate::application::use_cases::businesses::list_members::ListMembers;
use crate::application::use_cases::businesses::lookup_company::LookupCompany;
use crate::application::use_cases::businesses::remove_member::RemoveMember;
use crate::application::use_cases::businesses::update_business::UpdateBusiness;
use crate::bootstrap::app_context::AppContext;
use crate::domain::businesses::business::{Business, BusinessPatch, NewBusiness};
use crate::presentation::http::MessageResponse;
use crate::presentation::http::auth::{AdminUser, AuthUser};
use crate::presentation::http::error::{ApiResult, ErrorBody};
use crate::presentation::http::users::UserResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBusinessRequest {
    pub inn: i64,
    pub ogrn: Option<i64>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub owner: String,
    #[validate(length(min = 1, max = 100, message = "must be 1..100 characters"))]
    pub short_name: String,
    #[validate(length(min = 1, max = 100, message = "must be 1..100 characters"))]
    pub full_name: String,
    #[validate(length(max = 10000))]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBusinessRequest {
    pub inn: Option<i64>,
    pub ogrn: Option<i64>,
    #[validate(length(max = 100))]
    pub owner: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be 1..100 characters"))]
    pub short_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be 1..100 characters"))]
    pub full_name: Option<String>,
    #[validate(length(max = 10000))]
    pub address: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BusinessResponse {
    pub id: i64,
    pub inn: i64,
    pub ogrn: Option<i64>,
    pub owner: String,
    pub short_name: String,
    pub full_name: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Business> for BusinessResponse {
    fn from(b: Business) -> Self {
        Self {
            id: b.id,
            inn: b.inn,
            ogrn: b.ogrn,
            owner: b.owner,
            short_name: b.short_name,
            full_name: b.full_name,
            address: b.address,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

fn to_list(items: Vec<Business>) -> Json<Vec<BusinessResponse>> {
    Json(items.into_iter().map(Into::into).collect())
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/business", post(create_business))
        .route("/business/all", get(list_all))
        .route("/business/user", get(list_mine))
        .route("/business/get_business_info/:inn", get(business_info))
        .route("/business/inn/:inn", get(get_by_inn))
        .route("/business/ogrn/:ogrn", get(get_by_ogrn))
        .route(
            "/business/:id",
            get(get_business).put(update_business).delete(delete_business),
        )
        .route("/business/:id/users", get(list_members))
        .route(
            "/business/:id/user/:user_id",
            post(add_member).delete(remove_member),
        )
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/business/get_business_info/{inn}", tag = "Businesses",
    params(("inn" = String, Path, description = "Taxpayer number, 10 or 12 digits")),
    security(()),
    responses(
        (status = 200, description = "Registry answer as returned by the provider", body = Object),
        (status = 400, body = ErrorBody),
        (status = 502, body = ErrorBody),
        (status = 503, body = ErrorBody)
    ))]
pub async fn business_info(
    State(ctx): State<AppContext>,
    Path(inn): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let registry = ctx.company_registry();
    let uc = LookupCompany {
        registry: registry.as_deref(),
    };
    Ok(Json(uc.execute(&inn).await?))
}

#[utoipa::path(post, path = "/api/business", tag = "Businesses", request_body = CreateBusinessRequest,
    responses((status = 201, body = BusinessResponse), (status = 409, body = ErrorBody)))]
pub async fn create_business(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Json(req): Json<CreateBusinessRequest>,
) -> ApiResult<(StatusCode, Json<BusinessResponse>)> {
    req.validate()?;
    let repo = ctx.business_repo();
    let uc = CreateBusiness {
        repo: repo.as_ref(),
    };
    let input = NewBusiness {
        inn: req.inn,
        ogrn: req.ogrn,
        owner: req.owner,
        short_name: req.short_name,
        full_name: req.full_name,
        address: req.address,
    };
    let business = uc.execute(&actor, &input).await?;
    Ok((StatusCode::CREATED, Json(business.into())))
}

#[utoipa::path(get, path = "/api/business/all", tag = "Businesses",
    responses((status = 200, body = [BusinessResponse])))]
pub async fn list_all(
    State(ctx): State<AppContext>,
    AdminUser(actor): AdminUser,
) -> ApiResult<Json<Vec<BusinessResponse>>> {
    let repo = ctx.business_repo();
    let uc = ListBusinesses {
        repo: repo.as_ref(),
    };
    Ok(to_list(uc.all(&actor).await?))
}

#[utoipa::path(get, path = "/api/business/user", tag = "Businesses",
    responses((status = 200, body = [BusinessResponse])))]
pub async fn list_mine(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Json<Vec<BusinessResponse>>> {
    let repo = ctx.business_repo();
    let uc = ListBusinesses {
        repo: repo.as_ref(),
    };
    Ok(to_list(uc.for_user(actor.user_id).await?))
}

#[utoipa::path(get, path = "/api/business/{id}", tag = "Businesses",
    params(("id" = i64, Path, description = "Business id")),
    responses((status = 200, body = BusinessResponse), (status = 404, body = ErrorBody)))]
pub async fn get_business(
    State(ctx): State<AppContext>,
    AuthUser(_actor): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<BusinessResponse>> {
    let repo = ctx.business_repo();
    let uc = GetBusiness {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

#[utoipa::path(get, path = "/api/business/inn/{inn}", tag = "Businesses",
    params(("inn" = i64, Path, description = "Taxpayer number")),
    responses((status = 200, body = BusinessResponse), (status = 404, body = ErrorBody)))]
pub async fn get_by_inn(
    State(ctx): State<AppContext>,
    AuthUser(_actor): AuthUser,
    Path(inn): Path<i64>,
) -> ApiResult<Json<BusinessResponse>> {
    let repo = ctx.business_repo();
    let uc = GetBusiness {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.by_inn(inn).await?.into()))
}

#[utoipa::path(get, path = "/api/business/ogrn/{ogrn}", tag = "Businesses",
    params(("ogrn" = i64, Path, description = "Primary state registration number")),
    responses((status = 200, body = BusinessResponse), (status = 404, body = ErrorBody)))]
pub async fn get_by_ogrn(
    State(ctx): State<AppContext>,
    AuthUser(_actor): AuthUser,
    Path(ogrn): Path<i64>,
) -> ApiResult<Json<BusinessResponse>> {
    let repo = ctx.business_repo();
    let uc = GetBusiness {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.by_ogrn(ogrn).await?.into()))
}

#[utoipa::path(put, path = "/api/business/{id}", tag = "Businesses",
    params(("id" = i64, Path, description = "Business id")),
    request_body = UpdateBusinessRequest,
    responses((status = 200, body = BusinessResponse), (status = 403, body = ErrorBody), (status = 404, body = ErrorBody)))]
pub async fn update_business(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBusinessRequest>,
) -> ApiResult<Json<BusinessResponse>> {
    req.validate()?;
    let repo = ctx.business_repo();
    let uc = UpdateBusiness {
        repo: repo.as_ref(),
    };
    let patch = BusinessPatch {
        inn: req.inn,
        ogrn: req.ogrn,
        owner: req.owner,
        short_name: req.short_name,
        full_name: req.full_name,
        address: req.address,
    };
    Ok(Json(uc.execute(&actor, id, &patch).await?.into()))
}

#[utoipa::path(delete, path = "/api/business/{id}", tag = "Businesses",
    params(("id" = i64, Path, description = "Business id")),
    responses(
        (status = 200, body = MessageResponse),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 409, body = ErrorBody)
    ))]
pub async fn delete_business(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let repo = ctx.business_repo();
    let files = ctx.file_store();
    let uc = DeleteBusiness {
        repo: repo.as_ref(),
        files: files.as_ref(),
    };
    uc.execute(&actor, id).await?;
    Ok(Json(MessageResponse::ok("business deleted")))
}

#[utoipa::path(get, path = "/api/business/{id}/users", tag = "Businesses",
    params(("id" = i64, Path, description = "Business id")),
    responses((status = 200, body = [UserResponse]), (status = 404, body = ErrorBody)))]
pub async fn list_members(
    State(ctx): State<AppContext>,
    AuthUser(_actor): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let repo = ctx.business_repo();
    let uc = ListMembers {
        repo: repo.as_ref(),
    };
    let users = uc.execute(id).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/api/business/{id}/user/{user_id}", tag = "Businesses",
    params(("id" = i64, Path, description = "Business id"), ("user_id" = i64, Path, description = "User id")),
    responses((status = 200, body = MessageResponse), (status = 404, body = ErrorBody), (status = 409, body = ErrorBody)))]
pub async fn add_member(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    let businesses = ctx.business_repo();
    let users = ctx.user_repo();
    let uc = AddMember {
        businesses: businesses.as_ref(),
        users: users.as_ref(),
    };
    uc.execute(&actor, id, user_id).await?;
    Ok(Json(MessageResponse::ok("user added to business")))
}

#[utoipa::path(delete, path = "/api/business/{id}/user/{user_id}", tag = "Businesses",
    params(("id" = i64, Path, description = "Business id"), ("user_id" = i64, Path, description = "User id")),
    responses((status = 200, body = MessageResponse), (status = 404, body = ErrorBody)))]
pub async fn remove_member(
    State(ctx): State<AppContext>,
    AuthUser(actor): AuthUser,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    let repo = ctx.business_repo();
    let uc = RemoveMember {
        repo: repo.as_ref(),
    };
    uc.execute(&actor, id, user_id).await?;
    Ok(Json(MessageResponse::ok("user removed from business")))
}
