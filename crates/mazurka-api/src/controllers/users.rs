use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use mazurka_pool::Row;

use crate::controllers::AppState;
use crate::error::ApiError;

const LIST_USERS_SQL: &str = "SELECT * FROM users";

pub fn routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}

/// `GET /users` - every row of the users table, in whatever shape and
/// order the database returns them.
///
/// A connection is borrowed for exactly the duration of the query and goes
/// back to the pool on success and failure alike. Failures surface as the
/// opaque 500 body via `ApiError`.
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<Row>>, ApiError> {
    let rows = state.pool.query(LIST_USERS_SQL, &[]).await?;
    Ok(Json(rows))
}
