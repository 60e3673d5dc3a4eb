//! Kits embedded in the binary (lowest cascade tier)

/// Names of the embedded kits
const KITS: &[&str] = &["default"];

// Keyed by `<kit>/<path relative to the kit root>`
static EMBEDDED_KITS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "default/kit.toml" => include_str!("../../kits/default/kit.toml"),
    // Resource
    "default/resource/handler.rs" => include_str!("../../kits/default/resource/handler.rs"),
    "default/resource/template.html" => include_str!("../../kits/default/resource/template.html"),
    "default/resource/tests.rs" => include_str!("../../kits/default/resource/tests.rs"),
    "default/resource/schema.sql" => include_str!("../../kits/default/resource/schema.sql"),
    "default/resource/queries.sql" => include_str!("../../kits/default/resource/queries.sql"),
    "default/resource/migration_up.sql" => include_str!("../../kits/default/resource/migration_up.sql"),
    "default/resource/migration_down.sql" => include_str!("../../kits/default/resource/migration_down.sql"),
    // View
    "default/view/handler.rs" => include_str!("../../kits/default/view/handler.rs"),
    "default/view/template.html" => include_str!("../../kits/default/view/template.html"),
    "default/view/tests.rs" => include_str!("../../kits/default/view/tests.rs"),
    // Components
    "default/components/pagination.html" => include_str!("../../kits/default/components/pagination.html"),
    "default/components/modal.html" => include_str!("../../kits/default/components/modal.html"),
    "default/components/form_field.html" => include_str!("../../kits/default/components/form_field.html"),
};

/// Embedded file body
pub fn get(kit: &str, path: &str) -> Option<&'static str> {
    EMBEDDED_KITS.get(format!("{kit}/{path}").as_str()).copied()
}

/// Names of all embedded kits
pub fn kit_names() -> Vec<String> {
    KITS.iter().map(ToString::to_string).collect()
}
