use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::application::access::Actor;
use crate::application::services::jwt::TokenKind;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::error::ApiError;

/// Raw access token from the `Authorization: Bearer` header or the `access_token` cookie.
pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // 1) Prefer Authorization header if present
        if let Some(auth) = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(t) = auth
                .strip_prefix("Bearer ")
                .or_else(|| auth.strip_prefix("bearer "))
            {
                let t = t.trim();
                if !t.is_empty() {
                    return Ok(Bearer(t.to_string()));
                }
            }
        }

        // 2) Fallback to cookie `access_token`
        if let Some(cookie_hdr) = parts
            .headers
            .get(axum::http::header::COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(token) = get_cookie(cookie_hdr, "access_token") {
                return Ok(Bearer(token));
            }
        }

        Err(ApiError::unauthorized("missing bearer token"))
    }
}

/// Caller authenticated with a valid access token.
pub struct AuthUser(pub Actor);

#[axum::async_trait]
impl FromRequestParts<AppContext> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let Bearer(token) = Bearer::from_request_parts(parts, ctx).await?;
        let claims = ctx.jwt().verify(&token, TokenKind::Access)?;
        Ok(AuthUser(Actor::new(claims.user_id, claims.role())))
    }
}

/// Authenticated caller whose token carries the admin role.
pub struct AdminUser(pub Actor);

#[axum::async_trait]
impl FromRequestParts<AppContext> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(actor) = AuthUser::from_request_parts(parts, ctx).await?;
        if !actor.is_admin() {
            return Err(ApiError::forbidden("admin role required"));
        }
        Ok(AdminUser(actor))
    }
}

fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let kv = part.trim();
        if let Some((k, v)) = kv.split_once('=') {
            if k.trim() == name && !v.trim().is_empty() {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::get_cookie;

    #[test]
    fn cookie_lookup_finds_named_value() {
        let header = "theme=dark; access_token=abc.def ; other=1";
        assert_eq!(get_cookie(header, "access_token").as_deref(), Some("abc.def"));
        assert_eq!(get_cookie(header, "missing"), None);
        assert_eq!(get_cookie("access_token=", "access_token"), None);
    }
}
