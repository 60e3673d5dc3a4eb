//! [[ singular_title ]] view
//!
//! Generated from the `[[ kit.name ]]` kit ([[ kit.strategy ]] styling).

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;

use crate::templates;

#[cfg(test)]
mod tests;

/// Template rendered by [`templates::render`] (minijinja)
const TEMPLATE: &str = "[[ package ]]/[[ package ]].html";

#[derive(Serialize, Default)]
struct [[ singular ]]Page {
    title: String,
}

/// Routes mounted at `[[ route_path ]]`
pub fn router() -> Router {
    Router::new().route("/", get(show))
}

async fn show() -> Response {
    let page = [[ singular ]]Page {
        title: "[[ singular_title ]]".to_string(),
    };
    match templates::render(TEMPLATE, &page) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to render [[ package ]] template");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
