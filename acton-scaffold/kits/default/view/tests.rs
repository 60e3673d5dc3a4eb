//! Tests for the [[ package ]] view

use super::*;

#[test]
fn page_renders() {
    let page = [[ singular ]]Page {
        title: "[[ singular_title ]]".to_string(),
    };
    let html = templates::render(TEMPLATE, &page).expect("page renders");
    assert!(html.contains("[[ package ]]-section"));
}
