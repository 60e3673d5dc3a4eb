//! [[ plural_title ]] handlers
//!
//! Generated from the `[[ kit.name ]]` kit ([[ kit.strategy ]] styling).

use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::templates;

#[cfg(test)]
mod tests;

/// A row of `[[ table ]]`
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct [[ singular ]] {
    pub id: i64,
[% for field in fields %]
    pub [[ field.column ]]: [[ field.rust_type ]],
[% endfor %]
}

/// Submitted form values
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct [[ singular ]]Form {
[% for field in fields %]
[% if field.input_type == "checkbox" %]
    #[serde(default)]
[% endif %]
    pub [[ field.column ]]: [[ field.rust_type ]],
[% endfor %]
}
[% if paginated %]

/// Pagination query string
#[derive(Debug, Deserialize)]
pub struct PageQuery {
[% if options.pagination == "cursor" %]
    pub after: Option<i64>,
[% else %]
    pub page: Option<i64>,
[% endif %]
}

const PAGE_SIZE: i64 = [[ options.page_size ]];
[% endif %]

/// Template rendered by [`templates::render`] (minijinja)
const TEMPLATE: &str = "[[ package ]]/[[ package ]].html";

#[derive(Serialize)]
struct [[ plural ]]Page {
    mode: &'static str,
    title: String,
    action: String,
    items: Vec<[[ singular ]]>,
    values: [[ singular ]]Form,
[% if options.pagination == "cursor" %]
    has_more: bool,
    next_cursor: i64,
[% elif paginated %]
    page: i64,
    total_pages: i64,
[% endif %]
}

impl [[ plural ]]Page {
    fn list(items: Vec<[[ singular ]]>) -> Self {
        Self {
            mode: "list",
            title: "[[ plural_title ]]".to_string(),
            action: String::new(),
            items,
            values: [[ singular ]]Form::default(),
[% if options.pagination == "cursor" %]
            has_more: false,
            next_cursor: 0,
[% elif paginated %]
            page: 1,
            total_pages: 1,
[% endif %]
        }
    }

    fn form(title: &str, action: String, values: [[ singular ]]Form) -> Self {
        Self {
            mode: "form",
            title: title.to_string(),
            action,
            values,
            ..Self::list(Vec::new())
        }
    }
}

/// Routes mounted at `[[ route_path ]]`
pub fn router(pool: DbPool) -> Router {
    Router::new()
        .route("/", get(index).post(create))
        .route("/new", get(new))
        .route("/{id}", get(show).put(update).post(update).delete(destroy))
        .route("/{id}/edit", get(edit))
        .with_state(pool)
}

fn render(page: &[[ plural ]]Page) -> Response {
    match templates::render(TEMPLATE, page) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to render [[ package ]] template");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn db_error(err: sqlx::Error) -> Response {
    tracing::error!(error = %err, "[[ table ]] query failed");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

[% if paginated %]
async fn index(State(pool): State<DbPool>, Query(query): Query<PageQuery>) -> Response {
[% if options.pagination == "cursor" %]
    let after = query.after.unwrap_or(0);
    let items = match sqlx::query_as::<_, [[ singular ]]>(
        "SELECT id, [% for field in fields %][[ field.column ]][% if not loop.last %], [% endif %][% endfor %] FROM [[ table ]] WHERE id > [[ placeholder(1) ]] ORDER BY id LIMIT [[ placeholder(2) ]]",
    )
    .bind(after)
    .bind(PAGE_SIZE + 1)
    .fetch_all(&pool)
    .await
    {
        Ok(items) => items,
        Err(err) => return db_error(err),
    };
    let mut page = [[ plural ]]Page::list(items);
    page.has_more = page.items.len() as i64 > PAGE_SIZE;
    page.items.truncate(PAGE_SIZE as usize);
    page.next_cursor = page.items.last().map_or(after, |item| item.id);
[% else %]
    let current = query.page.unwrap_or(1).max(1);
    let total: i64 = match sqlx::query_scalar("SELECT COUNT(*) FROM [[ table ]]")
        .fetch_one(&pool)
        .await
    {
        Ok(total) => total,
        Err(err) => return db_error(err),
    };
    let items = match sqlx::query_as::<_, [[ singular ]]>(
        "SELECT id, [% for field in fields %][[ field.column ]][% if not loop.last %], [% endif %][% endfor %] FROM [[ table ]] ORDER BY id LIMIT [[ placeholder(1) ]] OFFSET [[ placeholder(2) ]]",
    )
    .bind(PAGE_SIZE)
    .bind((current - 1) * PAGE_SIZE)
    .fetch_all(&pool)
    .await
    {
        Ok(items) => items,
        Err(err) => return db_error(err),
    };
    let mut page = [[ plural ]]Page::list(items);
    page.page = current;
    page.total_pages = ((total + PAGE_SIZE - 1) / PAGE_SIZE).max(1);
[% endif %]
    render(&page)
}
[% else %]
async fn index(State(pool): State<DbPool>) -> Response {
    match sqlx::query_as::<_, [[ singular ]]>(
        "SELECT id, [% for field in fields %][[ field.column ]][% if not loop.last %], [% endif %][% endfor %] FROM [[ table ]] ORDER BY id",
    )
    .fetch_all(&pool)
    .await
    {
        Ok(items) => render(&[[ plural ]]Page::list(items)),
        Err(err) => db_error(err),
    }
}
[% endif %]

async fn new() -> Response {
    render(&[[ plural ]]Page::form(
        "New [[ singular_title ]]",
        "[[ route_path ]]".to_string(),
        [[ singular ]]Form::default(),
    ))
}

async fn show(State(pool): State<DbPool>, Path(id): Path<i64>) -> Response {
    match find(&pool, id).await {
        Ok(Some(item)) => render(&[[ plural ]]Page::list(vec![item])),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => db_error(err),
    }
}

async fn edit(State(pool): State<DbPool>, Path(id): Path<i64>) -> Response {
    match find(&pool, id).await {
        Ok(Some(item)) => render(&[[ plural ]]Page::form(
            "Edit [[ singular_title ]]",
            format!("[[ route_path ]]/{id}"),
            [[ singular ]]Form {
[% for field in fields %]
                [[ field.column ]]: item.[[ field.column ]],
[% endfor %]
            },
        )),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => db_error(err),
    }
}

async fn create(State(pool): State<DbPool>, Form(form): Form<[[ singular ]]Form>) -> Response {
    let result = sqlx::query(
        "INSERT INTO [[ table ]] ([% for field in fields %][[ field.column ]][% if not loop.last %], [% endif %][% endfor %]) VALUES ([% for field in fields %][[ placeholder(loop.index) ]][% if not loop.last %], [% endif %][% endfor %])",
    )
[% for field in fields %]
    .bind(form.[[ field.column ]])
[% endfor %]
    .execute(&pool)
    .await;

    match result {
        Ok(_) => index_redirect(),
        Err(err) => db_error(err),
    }
}

async fn update(
    State(pool): State<DbPool>,
    Path(id): Path<i64>,
    Form(form): Form<[[ singular ]]Form>,
) -> Response {
    let result = sqlx::query(
        "UPDATE [[ table ]] SET [% for field in fields %][[ field.column ]] = [[ placeholder(loop.index) ]], [% endfor %]updated_at = CURRENT_TIMESTAMP WHERE id = [[ placeholder(fields | length + 1) ]]",
    )
[% for field in fields %]
    .bind(form.[[ field.column ]])
[% endfor %]
    .bind(id)
    .execute(&pool)
    .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => StatusCode::NOT_FOUND.into_response(),
        Ok(_) => index_redirect(),
        Err(err) => db_error(err),
    }
}

async fn destroy(State(pool): State<DbPool>, Path(id): Path<i64>) -> Response {
    match sqlx::query("DELETE FROM [[ table ]] WHERE id = [[ placeholder(1) ]]")
        .bind(id)
        .execute(&pool)
        .await
    {
        Ok(_) => StatusCode::OK.into_response(),
        Err(err) => db_error(err),
    }
}

async fn find(pool: &DbPool, id: i64) -> Result<Option<[[ singular ]]>, sqlx::Error> {
    sqlx::query_as::<_, [[ singular ]]>(
        "SELECT id, [% for field in fields %][[ field.column ]][% if not loop.last %], [% endif %][% endfor %] FROM [[ table ]] WHERE id = [[ placeholder(1) ]]",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

fn index_redirect() -> Response {
    ([("HX-Redirect", "[[ route_path ]]")], StatusCode::SEE_OTHER).into_response()
}
