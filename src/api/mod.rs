mod reports;

use axum::Router;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().nest("/admin/reports", reports::routes())
}
