//! Middleware for protecting authenticated routes.
//!
//! The gate extracts a bearer token from the `Authorization` header,
//! validates it, and attaches the resolved identity to the request
//! extensions. Each request is evaluated independently; no session state is
//! carried across requests.

use crate::auth::models::{AuthenticatedUser, authorities_for};
use crate::config::Config;
use crate::utils::jwt::JwtUtils;
use axum::{
    extract::Request,
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

/// JWT authentication middleware.
///
/// Missing, malformed, expired, and forged tokens are all rejected with a
/// bare 401 before protected handlers run.
pub async fn jwt_auth(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    let config = request
        .extensions()
        .get::<Config>()
        .cloned()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Check if it's a Bearer token
    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let jwt_utils = JwtUtils::new(&config);

    match jwt_utils.validate_token(token) {
        Ok(claims) => {
            let identity = AuthenticatedUser {
                user_id: claims.sub.clone(),
                authorities: authorities_for(&claims),
            };
            // Add claims and identity to request extensions for handlers
            request.extensions_mut().insert(claims);
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(_) => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Optional JWT authentication middleware.
///
/// An absent or invalid token leaves the request unauthenticated instead of
/// failing it; handlers receive `Option<AuthenticatedUser>`.
pub async fn optional_jwt_auth(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::to_string);

    let identity: Option<AuthenticatedUser> =
        match (request.extensions().get::<Config>().cloned(), token) {
            (Some(config), Some(token)) => JwtUtils::new(&config)
                .validate_token(&token)
                .ok()
                .map(|claims| AuthenticatedUser {
                    user_id: claims.sub.clone(),
                    authorities: authorities_for(&claims),
                }),
            _ => None,
        };

    // Always insert the Option, even if it's None
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
