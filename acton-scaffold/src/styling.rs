//! Styling strategies exposed to kit templates
//!
//! A strategy maps abstract UI elements (`button`, `table`, `input`, ...) to
//! the class attribute a markup framework expects. Templates never hardcode
//! classes when they call `css("button")` or `css_variant("button", "danger")`,
//! which lets one style-agnostic kit render for any registered strategy.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Presentation helpers a kit's templates call through
pub trait StylingStrategy: Send + Sync + fmt::Debug {
    /// Strategy identifier as referenced from `kit.toml`
    fn name(&self) -> &str;

    /// Class list for an element, empty when the strategy has none
    fn css(&self, element: &str) -> String;

    /// Class list for an element variant (e.g. `button` + `danger`)
    ///
    /// The default joins the element classes with the variant classes the
    /// strategy reports through [`StylingStrategy::variant_css`].
    fn css_variant(&self, element: &str, variant: &str) -> String {
        let base = self.css(element);
        let extra = self.variant_css(element, variant);
        match (base.is_empty(), extra.is_empty()) {
            (_, true) => base,
            (true, false) => extra,
            (false, false) => format!("{base} {extra}"),
        }
    }

    /// Additional classes for a variant
    fn variant_css(&self, _element: &str, _variant: &str) -> String {
        String::new()
    }
}

/// Utility-class strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct TailwindStrategy;

impl StylingStrategy for TailwindStrategy {
    fn name(&self) -> &str {
        "tailwind"
    }

    fn css(&self, element: &str) -> String {
        match element {
            "container" => "mx-auto max-w-5xl px-4 py-8",
            "heading" => "text-2xl font-semibold text-gray-900 mb-6",
            "table" => "min-w-full divide-y divide-gray-200",
            "th" => "px-4 py-2 text-left text-sm font-medium text-gray-600",
            "td" => "px-4 py-2 text-sm text-gray-800",
            "form" => "space-y-4",
            "field" => "flex flex-col gap-1",
            "label" => "text-sm font-medium text-gray-700",
            "input" => "rounded-md border border-gray-300 px-3 py-2 focus:outline-none focus:ring",
            "button" => "inline-flex items-center rounded-md px-4 py-2 text-sm font-medium",
            "link" => "text-indigo-600 hover:underline",
            "modal" => "fixed inset-0 z-50 flex items-center justify-center bg-black/50",
            "modal_body" => "w-full max-w-lg rounded-lg bg-white p-6 shadow-xl",
            "pagination" => "mt-4 flex items-center justify-between",
            "alert" => "rounded-md p-4 text-sm",
            _ => "",
        }
        .to_string()
    }

    fn variant_css(&self, element: &str, variant: &str) -> String {
        match (element, variant) {
            ("button", "primary") => "bg-indigo-600 text-white hover:bg-indigo-500",
            ("button", "secondary") => "bg-white text-gray-700 ring-1 ring-gray-300",
            ("button", "danger") => "bg-red-600 text-white hover:bg-red-500",
            ("alert", "success") => "bg-green-50 text-green-800",
            ("alert", "danger") => "bg-red-50 text-red-800",
            _ => "",
        }
        .to_string()
    }
}

/// Component-class strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct BootstrapStrategy;

impl StylingStrategy for BootstrapStrategy {
    fn name(&self) -> &str {
        "bootstrap"
    }

    fn css(&self, element: &str) -> String {
        match element {
            "container" => "container py-4",
            "heading" => "h3 mb-4",
            "table" => "table table-striped",
            "form" => "vstack gap-3",
            "field" => "mb-3",
            "label" => "form-label",
            "input" => "form-control",
            "button" => "btn",
            "link" => "link-primary",
            "modal" => "modal d-block",
            "modal_body" => "modal-content p-4",
            "pagination" => "pagination",
            "alert" => "alert",
            _ => "",
        }
        .to_string()
    }

    fn variant_css(&self, element: &str, variant: &str) -> String {
        match element {
            "button" => format!("btn-{variant}"),
            "alert" => format!("alert-{variant}"),
            _ => String::new(),
        }
    }
}

/// Strategy for classless stylesheets: emits no classes at all
#[derive(Debug, Clone, Copy, Default)]
pub struct ClasslessStrategy;

impl StylingStrategy for ClasslessStrategy {
    fn name(&self) -> &str {
        "classless"
    }

    fn css(&self, _element: &str) -> String {
        String::new()
    }
}

/// Known strategies by name
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn StylingStrategy>>,
}

impl StrategyRegistry {
    /// Registry without any strategy
    #[must_use]
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Register a strategy, replacing any previous one with the same name
    pub fn register(&mut self, strategy: Arc<dyn StylingStrategy>) {
        self.strategies.insert(strategy.name().to_string(), strategy);
    }

    /// Look up a strategy by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn StylingStrategy>> {
        self.strategies.get(name).cloned()
    }

    /// Whether a strategy with the given name is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(TailwindStrategy));
        registry.register(Arc::new(BootstrapStrategy));
        registry.register(Arc::new(ClasslessStrategy));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_strategies_registered() {
        let registry = StrategyRegistry::default();
        assert_eq!(registry.names(), vec!["bootstrap", "classless", "tailwind"]);
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_variant_joins_base_classes() {
        let bootstrap = BootstrapStrategy;
        assert_eq!(bootstrap.css_variant("button", "danger"), "btn btn-danger");
        assert_eq!(bootstrap.css_variant("table", "danger"), "table table-striped");
    }

    #[test]
    fn test_classless_emits_nothing() {
        let classless = ClasslessStrategy;
        assert_eq!(classless.css("button"), "");
        assert_eq!(classless.css_variant("button", "primary"), "");
    }

    #[test]
    fn test_register_replaces_by_name() {
        #[derive(Debug)]
        struct Custom;
        impl StylingStrategy for Custom {
            fn name(&self) -> &str {
                "tailwind"
            }
            fn css(&self, _element: &str) -> String {
                "custom".to_string()
            }
        }

        let mut registry = StrategyRegistry::default();
        registry.register(Arc::new(Custom));
        let strategy = registry.get("tailwind").unwrap();
        assert_eq!(strategy.css("button"), "custom");
    }
}
