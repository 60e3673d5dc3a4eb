//! Kit template rendering
//!
//! Kit templates use scaffold delimiters so the runtime template syntax of
//! generated files passes through untouched:
//!
//! | Purpose   | Scaffold  | Runtime (output) |
//! |-----------|-----------|------------------|
//! | variable  | `[[ x ]]` | `{{ x }}`        |
//! | block     | `[% %]`   | `{% %}`          |
//! | comment   | `[# #]`   | `{# #}`          |

use super::model::{PaginationMode, ResourceData};
use super::GenerateError;
use crate::field::Dialect;
use crate::kit::{KitResolver, ResolvedTemplate};
use crate::naming::Naming;
use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment, Value};

/// Scaffold delimiter configuration
///
/// # Errors
///
/// Returns an error if the delimiters are rejected by minijinja.
pub fn scaffold_syntax() -> Result<SyntaxConfig, minijinja::Error> {
    SyntaxConfig::builder()
        .block_delimiters("[%", "%]")
        .variable_delimiters("[[", "]]")
        .comment_delimiters("[#", "#]")
        .build()
}

/// Renders a kit's templates for one resource
pub struct Renderer {
    env: Environment<'static>,
    context: Value,
}

impl Renderer {
    /// Build the environment: syntax, helper functions and kit components
    ///
    /// # Errors
    ///
    /// Returns a kit error when a declared component cannot be resolved, and
    /// a render error when a component fails to parse.
    pub fn new(data: &ResourceData, resolver: &KitResolver) -> Result<Self, GenerateError> {
        let mut env = Environment::new();
        env.set_syntax(scaffold_syntax().map_err(|source| GenerateError::Render {
            template: "<syntax>".to_string(),
            source,
        })?);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        // Generated sources are not HTML-escaped, whatever their extension.
        env.set_auto_escape_callback(|_| AutoEscape::None);

        register_naming(&mut env);
        register_pagination(&mut env, data.options.pagination, data.options.dialect);
        register_styling(&mut env, data);

        let kit_name = data.kit.name().to_string();
        for component in &data.kit.kit().manifest().components {
            let resolved = resolver.resolve_component(&kit_name, component)?;
            let name = format!("components/{component}");
            env.add_template_owned(name.clone(), resolved.body)
                .map_err(|source| GenerateError::Render {
                    template: name,
                    source,
                })?;
        }

        Ok(Self {
            env,
            context: Value::from_serialize(data),
        })
    }

    /// Render one resolved template
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Render`] when the kit template fails to parse
    /// or render.
    pub fn render(&mut self, template: ResolvedTemplate) -> Result<String, GenerateError> {
        let name = template.path;
        let render_error = |source: minijinja::Error| GenerateError::Render {
            template: name.clone(),
            source,
        };
        self.env
            .add_template_owned(name.clone(), template.body)
            .map_err(render_error)?;
        self.env
            .get_template(&name)
            .and_then(|tmpl| tmpl.render(&self.context))
            .map_err(render_error)
    }
}

fn register_naming(env: &mut Environment<'static>) {
    env.add_filter("pluralize", |value: &str| Naming::pluralize(value));
    env.add_filter("singularize", |value: &str| Naming::singularize(value));
    env.add_filter("snake_case", |value: &str| Naming::to_snake_case(value));
    env.add_filter("kebab_case", |value: &str| Naming::to_kebab_case(value));
    env.add_filter("pascal_case", |value: &str| Naming::to_identifier_case(value));
    env.add_filter("title", |value: &str| Naming::to_title(value));
    env.add_filter("table_name", |value: &str| Naming::to_table_name(value));
    env.add_filter("route_path", |value: &str| Naming::to_route_path(value));
    env.add_filter("foreign_key", |value: &str| Naming::to_foreign_key(value));
    env.add_filter("on_delete_sql", |value: &str| {
        value.replace('_', " ").to_uppercase()
    });
}

fn register_pagination(env: &mut Environment<'static>, mode: PaginationMode, dialect: Dialect) {
    env.add_function("placeholder", move |index: u32| placeholder(dialect, index));
    env.add_function("pagination_clause", move || match mode {
        PaginationMode::None => "ORDER BY id".to_string(),
        PaginationMode::Offset => format!(
            "ORDER BY id LIMIT {} OFFSET {}",
            placeholder(dialect, 1),
            placeholder(dialect, 2)
        ),
        PaginationMode::Cursor => format!(
            "WHERE id > {} ORDER BY id LIMIT {}",
            placeholder(dialect, 1),
            placeholder(dialect, 2)
        ),
    });
    env.add_function("timestamp_type", move || match dialect {
        Dialect::Sqlite => "TIMESTAMP".to_string(),
        Dialect::Postgres => "TIMESTAMPTZ".to_string(),
    });
}

fn register_styling(env: &mut Environment<'static>, data: &ResourceData) {
    let strategy = data.kit.strategy().clone();
    env.add_function("css", move |element: &str| strategy.css(element));

    let strategy = data.kit.strategy().clone();
    env.add_function("css_variant", move |element: &str, variant: &str| {
        strategy.css_variant(element, variant)
    });

    let name = data.kit.strategy().name().to_string();
    env.add_function("strategy", move || name.clone());
}

fn placeholder(dialect: Dialect, index: u32) -> String {
    match dialect {
        Dialect::Sqlite => format!("?{index}"),
        Dialect::Postgres => format!("${index}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GenerationKind, GenerationOptions, ResourceSpec};
    use crate::kit::KitTier;

    fn data(options: &GenerationOptions) -> (ResourceData, KitResolver) {
        let resolver =
            KitResolver::new("/nonexistent/project/kits", Some("/nonexistent/user".into()));
        let kit = resolver
            .resolve("default", options.strategy.as_deref())
            .unwrap();
        let spec = ResourceSpec::from_pairs(
            "post",
            GenerationKind::Resource,
            [("title", "string"), ("author", "references:User")],
        );
        (ResourceData::derive(&spec, kit, options).unwrap(), resolver)
    }

    fn inline(path: &str, body: &str) -> ResolvedTemplate {
        ResolvedTemplate {
            path: path.to_string(),
            body: body.to_string(),
            tier: KitTier::Project,
        }
    }

    #[test]
    fn test_runtime_syntax_passes_through() {
        let options = GenerationOptions::default().with_strategy("tailwind");
        let (data, resolver) = data(&options);
        let mut renderer = Renderer::new(&data, &resolver).unwrap();
        let out = renderer
            .render(inline(
                "x.html",
                "{{ item.[[ package ]] }} {% if x %}[[ singular ]]{% endif %}[# gone #]",
            ))
            .unwrap();
        assert_eq!(out, "{{ item.post }} {% if x %}Post{% endif %}");
    }

    #[test]
    fn test_helpers_available() {
        let options = GenerationOptions {
            dialect: Dialect::Postgres,
            ..GenerationOptions::default().with_strategy("bootstrap")
        };
        let (data, resolver) = data(&options);
        let mut renderer = Renderer::new(&data, &resolver).unwrap();
        let out = renderer
            .render(inline(
                "helpers.txt",
                "[[ \"category\" | pluralize ]] [[ css_variant(\"button\", \"danger\") ]] [[ strategy() ]] [[ pagination_clause() ]]",
            ))
            .unwrap();
        assert_eq!(
            out,
            "categories btn btn-danger bootstrap ORDER BY id LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn test_no_html_escaping() {
        let options = GenerationOptions::default().with_strategy("tailwind");
        let (data, resolver) = data(&options);
        let mut renderer = Renderer::new(&data, &resolver).unwrap();
        let out = renderer
            .render(inline("page.html", "[[ \"<a href='x'>\" ]]"))
            .unwrap();
        assert_eq!(out, "<a href='x'>");
    }

    #[test]
    fn test_syntax_error_in_kit_template() {
        let options = GenerationOptions::default().with_strategy("tailwind");
        let (data, resolver) = data(&options);
        let mut renderer = Renderer::new(&data, &resolver).unwrap();
        let err = renderer
            .render(inline("broken.rs", "[% if %]"))
            .unwrap_err();
        assert!(matches!(err, GenerateError::Render { template, .. } if template == "broken.rs"));
    }
}
