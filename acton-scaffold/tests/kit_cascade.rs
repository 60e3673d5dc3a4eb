//! Kit cascade resolution across project, user and built-in tiers

use acton_scaffold::kit::{KitError, KitResolver, KitTier};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Temp dir holding `project/` and `user/` kit roots
struct Tiers {
    temp: TempDir,
}

impl Tiers {
    fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    fn project(&self) -> std::path::PathBuf {
        self.temp.path().join("project")
    }

    fn user(&self) -> std::path::PathBuf {
        self.temp.path().join("user")
    }

    fn resolver(&self) -> KitResolver {
        KitResolver::new(self.project(), Some(self.user()))
    }
}

fn write(root: &Path, path: &str, contents: &str) {
    let file = root.join(path);
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, contents).unwrap();
}

fn manifest(name: &str, styling: &str) -> String {
    format!("name = \"{name}\"\nversion = \"1.2.0\"\nstyling = \"{styling}\"\n")
}

#[test]
fn test_builtin_kit_without_overrides() {
    let tiers = Tiers::new();
    let resolver = tiers.resolver();

    let kit = resolver.load("default").unwrap();
    assert_eq!(kit.tier(), KitTier::BuiltIn);
    assert_eq!(kit.location(), "builtin:default");
    assert_eq!(
        resolver.template_origin("default", "resource/handler.rs").unwrap(),
        KitTier::BuiltIn
    );
}

#[test]
fn test_single_file_override_inherits_the_rest() {
    let tiers = Tiers::new();
    write(&tiers.project(), "default/resource/handler.rs", "// project handler\n");
    let resolver = tiers.resolver();

    // No manifest in the project tier: the kit itself still comes from the binary.
    assert_eq!(resolver.load("default").unwrap().tier(), KitTier::BuiltIn);

    let handler = resolver.resolve_template("default", "resource/handler.rs").unwrap();
    assert_eq!(handler.tier, KitTier::Project);
    assert_eq!(handler.body, "// project handler\n");
    assert_eq!(
        resolver.template_origin("default", "resource/template.html").unwrap(),
        KitTier::BuiltIn
    );
}

#[test]
fn test_project_beats_user_beats_builtin() {
    let tiers = Tiers::new();
    write(&tiers.user(), "default/view/handler.rs", "// user\n");
    write(&tiers.user(), "default/view/tests.rs", "// user tests\n");
    write(&tiers.project(), "default/view/handler.rs", "// project\n");
    let resolver = tiers.resolver();

    assert_eq!(
        resolver.resolve_template("default", "view/handler.rs").unwrap().body,
        "// project\n"
    );
    assert_eq!(
        resolver.template_origin("default", "view/tests.rs").unwrap(),
        KitTier::User
    );
    assert_eq!(
        resolver.template_origin("default", "view/template.html").unwrap(),
        KitTier::BuiltIn
    );
}

#[test]
fn test_removing_an_override_falls_through_one_tier() {
    let tiers = Tiers::new();
    write(&tiers.project(), "default/view/handler.rs", "// project\n");
    write(&tiers.user(), "default/view/handler.rs", "// user\n");
    let resolver = tiers.resolver();

    let handler = resolver.resolve_template("default", "view/handler.rs").unwrap();
    assert_eq!(handler.tier, KitTier::Project);
    assert_eq!(handler.body, "// project\n");

    fs::remove_file(tiers.project().join("default/view/handler.rs")).unwrap();
    let handler = resolver.resolve_template("default", "view/handler.rs").unwrap();
    assert_eq!(handler.tier, KitTier::User);
    assert_eq!(handler.body, "// user\n");

    fs::remove_file(tiers.user().join("default/view/handler.rs")).unwrap();
    let handler = resolver.resolve_template("default", "view/handler.rs").unwrap();
    assert_eq!(handler.tier, KitTier::BuiltIn);
    assert!(handler.body.contains("templates::render(TEMPLATE, &page)"));
}

#[test]
fn test_component_override() {
    let tiers = Tiers::new();
    write(&tiers.user(), "default/components/modal.html", "<dialog></dialog>\n");
    let resolver = tiers.resolver();

    let modal = resolver.resolve_component("default", "modal").unwrap();
    assert_eq!(modal.tier, KitTier::User);
    assert_eq!(modal.path, "components/modal.html");

    let err = resolver.resolve_component("default", "carousel").unwrap_err();
    assert!(matches!(err, KitError::ComponentNotFound { ref component, .. } if component == "carousel"));
}

#[test]
fn test_user_kit_with_fixed_strategy() {
    let tiers = Tiers::new();
    write(&tiers.user(), "admin/kit.toml", &manifest("admin", "bootstrap"));
    let resolver = tiers.resolver();

    let info = resolver.resolve("admin", Some("tailwind")).unwrap();
    assert_eq!(info.kit().tier(), KitTier::User);
    assert_eq!(info.strategy().name(), "bootstrap");
    assert_eq!(info.kit().version(), &semver::Version::new(1, 2, 0));

    let err = resolver
        .resolve_template("admin", "resource/handler.rs")
        .unwrap_err();
    assert!(matches!(err, KitError::TemplateNotFound { .. }));
}

#[test]
fn test_project_manifest_shadows_builtin() {
    let tiers = Tiers::new();
    write(&tiers.project(), "default/kit.toml", &manifest("default", "classless"));
    let resolver = tiers.resolver();

    let kit = resolver.load("default").unwrap();
    assert_eq!(kit.tier(), KitTier::Project);
    assert_eq!(kit.manifest().styling.as_deref(), Some("classless"));
    // Templates the project does not provide still fall through.
    assert_eq!(
        resolver.template_origin("default", "resource/schema.sql").unwrap(),
        KitTier::BuiltIn
    );
}

#[test]
fn test_invalid_manifest_names_field() {
    let tiers = Tiers::new();
    write(&tiers.project(), "broken/kit.toml", "name = \"broken\"\nversion = \"one\"\nstyle_agnostic = true\n");
    let resolver = tiers.resolver();

    let err = resolver.load("broken").unwrap_err();
    assert!(matches!(err, KitError::InvalidManifest { ref field, .. } if field == "version"));
}

#[test]
fn test_diff_against_shadowed_template() {
    let tiers = Tiers::new();
    write(&tiers.project(), "default/resource/migration_down.sql", "DROP TABLE [[ table ]];\n");
    let resolver = tiers.resolver();

    let diff = resolver
        .diff_template("default", "resource/migration_down.sql")
        .unwrap()
        .unwrap();
    assert!(diff.contains("--- built-in/default/resource/migration_down.sql"));
    assert!(diff.contains("+++ project/default/resource/migration_down.sql"));
    assert!(diff.contains("+DROP TABLE [[ table ]];"));

    assert!(resolver
        .diff_template("default", "resource/queries.sql")
        .unwrap()
        .is_none());
}

#[test]
fn test_list_kits_reports_shadowing() {
    let tiers = Tiers::new();
    write(&tiers.project(), "default/kit.toml", &manifest("default", "tailwind"));
    write(&tiers.user(), "admin/kit.toml", &manifest("admin", "bootstrap"));
    write(&tiers.user(), "broken/kit.toml", "name = \"other\"\n");
    let resolver = tiers.resolver();

    let listing = resolver.list_kits().unwrap();
    let names: Vec<&str> = listing.iter().map(|kit| kit.name.as_str()).collect();
    assert_eq!(names, ["admin", "broken", "default"]);

    assert_eq!(listing[0].tier, KitTier::User);
    assert!(listing[1].kit.is_err());
    assert_eq!(listing[2].tier, KitTier::Project);
    assert_eq!(listing[2].shadowed, [KitTier::BuiltIn]);
}

#[test]
fn test_added_search_path_takes_precedence() {
    let tiers = Tiers::new();
    let extra = tiers.temp.path().join("extra");
    write(&extra, "default/resource/tests.rs", "// extra\n");
    let mut resolver = tiers.resolver();
    resolver.load("default").unwrap();
    assert_eq!(resolver.cache().len(), 1);

    resolver.add_search_path(&extra, KitTier::Project);
    assert!(resolver.cache().is_empty());
    assert_eq!(
        resolver.resolve_template("default", "resource/tests.rs").unwrap().body,
        "// extra\n"
    );
}
