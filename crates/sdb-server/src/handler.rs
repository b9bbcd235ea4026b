use axum::extract::{Query, State};
use axum::response::{Html, Json};
use serde::Deserialize;

use sdb_core::{Command, CoreResult, Database};
use sdb_store::EntityStore;

use crate::error::{ServerError, ServerResult};
use crate::router::SharedDatabase;

/// Query parameters accepted by the variable routes.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    pub name: Option<String>,
    pub value: Option<String>,
}

/// Missing and empty parameters are both rejected.
fn required(field: Option<String>) -> ServerResult<String> {
    field
        .filter(|s| !s.is_empty())
        .ok_or(ServerError::InvalidParameters)
}

const HOME_PAGE: &str = r#"<h1>Welcome to sdb</h1>
<p>Use the following commands to interact with the store:</p>
<ul>
    <li><strong>/set?name={variable_name}&amp;value={variable_value}</strong> - Set a variable</li>
    <li><strong>/get?name={variable_name}</strong> - Get the value of a variable</li>
    <li><strong>/unset?name={variable_name}</strong> - Unset a variable</li>
    <li><strong>/numequalto?value={variable_value}</strong> - Count variables holding a value</li>
    <li><strong>/undo</strong> - Undo the last SET/UNSET operation</li>
    <li><strong>/redo</strong> - Redo the most recent undone operation</li>
    <li><strong>/end</strong> - Clean up all data</li>
    <li><strong>/history</strong> - Display history of commands</li>
</ul>
"#;

/// Usage page.
pub async fn home_handler() -> Html<&'static str> {
    Html(HOME_PAGE)
}

/// Run `op` on the blocking pool. Database calls take a `std` lock and, with
/// the file backend, sync and rename a snapshot per mutation.
async fn blocking<T, F>(db: SharedDatabase, op: F) -> ServerResult<T>
where
    F: FnOnce(&Database<Box<dyn EntityStore>>) -> CoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || op(&db))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(result?)
}

pub async fn set_handler(
    State(db): State<SharedDatabase>,
    Query(params): Query<Params>,
) -> ServerResult<String> {
    let name = required(params.name)?;
    let value = required(params.value)?;
    Ok(blocking(db, move |db| db.set(&name, &value)).await?.to_string())
}

pub async fn get_handler(
    State(db): State<SharedDatabase>,
    Query(params): Query<Params>,
) -> ServerResult<String> {
    let name = required(params.name)?;
    Ok(blocking(db, move |db| db.get(&name)).await?.to_string())
}

pub async fn unset_handler(
    State(db): State<SharedDatabase>,
    Query(params): Query<Params>,
) -> ServerResult<String> {
    let name = required(params.name)?;
    Ok(blocking(db, move |db| db.unset(&name)).await?.to_string())
}

pub async fn num_equal_to_handler(
    State(db): State<SharedDatabase>,
    Query(params): Query<Params>,
) -> ServerResult<String> {
    let value = required(params.value)?;
    Ok(blocking(db, move |db| db.num_equal_to(&value)).await?.to_string())
}

pub async fn undo_handler(State(db): State<SharedDatabase>) -> ServerResult<String> {
    Ok(blocking(db, |db| db.undo()).await?.to_string())
}

pub async fn redo_handler(State(db): State<SharedDatabase>) -> ServerResult<String> {
    Ok(blocking(db, |db| db.redo()).await?.to_string())
}

pub async fn end_handler(State(db): State<SharedDatabase>) -> ServerResult<String> {
    Ok(blocking(db, |db| db.end()).await?.to_string())
}

/// The undo stack as a JSON array, oldest first.
pub async fn history_handler(
    State(db): State<SharedDatabase>,
) -> ServerResult<Json<Vec<Command>>> {
    Ok(Json(blocking(db, |db| db.history()).await?))
}
