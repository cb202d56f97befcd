use axum::Extension;
use serde::Serialize;

use crate::middleware::{ApiResponse, SessionLookup};
use crate::scope::RequestScope;

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub scope: RequestScope,
    /// Session user id, when a valid session was presented
    pub session_user_id: Option<uuid::Uuid>,
}

/// GET /api/auth/whoami - the scope this request resolved to
pub async fn get(scope: RequestScope, session: Option<Extension<SessionLookup>>) -> ApiResponse<WhoAmI> {
    let session_user_id = session.and_then(|Extension(lookup)| lookup.user().map(|u| u.id));

    ApiResponse::success(WhoAmI { scope, session_user_id })
}
