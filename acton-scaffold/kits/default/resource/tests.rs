//! Tests for the [[ package ]] handlers

use super::*;

fn sample_form() -> [[ singular ]]Form {
    [[ singular ]]Form {
[% for field in fields %]
        [[ field.column ]]: [% if field.optional %]Some([[ field.sample_value ]])[% else %][[ field.sample_value ]][% endif %],
[% endfor %]
    }
}

#[test]
fn list_page_renders() {
    let page = [[ plural ]]Page::list(Vec::new());
    let html = templates::render(TEMPLATE, &page).expect("list page renders");
    assert!(html.contains("[[ package ]]-section"));
}

#[test]
fn form_page_renders() {
    let page = [[ plural ]]Page::form("New [[ singular_title ]]", "[[ route_path ]]".to_string(), sample_form());
    let html = templates::render(TEMPLATE, &page).expect("form page renders");
    assert!(html.contains("New [[ singular_title ]]"));
}
