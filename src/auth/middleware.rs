use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{info, instrument, warn};

use super::token::hash_token;
use crate::shared::{AppError, AppState};

/// JWT authentication middleware - validates Authorization Bearer header and adds AuthClaims to request.
/// Usage: .route_layer(middleware::from_fn_with_state(app_state.clone(), auth::jwt_auth))
/// Handlers can then extract Extension(claims): Extension<AuthClaims>.
#[instrument(skip(state, req, next))]
pub async fn jwt_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    info!(
        method = %req.method(),
        path = %req.uri().path(),
        "JWT authentication middleware triggered"
    );

    // Extract token from Authorization Bearer header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            warn!(path = %req.uri().path(), "Missing Authorization header in request");
            AppError::Unauthorized("Authentication required".to_string())
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            warn!("Invalid Authorization header format (expected Bearer token)");
            AppError::Unauthorized("Authentication required".to_string())
        })?
        .to_string();

    let claims = match state.token_config.validate_token(&token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("JWT authentication failed: {}", e);
            return Err(e);
        }
    };

    if state
        .blacklist_repository
        .is_revoked(&hash_token(&token))
        .await?
    {
        warn!(sub = claims.sub, "Rejected revoked token");
        return Err(AppError::Unauthorized("Token has been revoked".to_string()));
    }

    info!(
        sub = claims.sub,
        role = %claims.role,
        "Authentication successful, adding claims to request"
    );

    // Add claims and the raw token (logout needs it) to request extensions
    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(BearerToken(token));

    Ok(next.run(req).await)
}

/// The raw bearer token of an authenticated request
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);
