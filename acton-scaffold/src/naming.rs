//! Naming conventions, pluralization, and type inference for code generation
//!
//! Every name a generated resource carries (package, table, route, titles) is
//! derived here so that the forms stay consistent with each other. The
//! pluralization rules are deliberately small and predictable: an irregular
//! noun table is consulted first and always wins, then an ordered list of
//! suffix rules is applied to the last word of the input.
//!
//! # Examples
//!
//! ```
//! use acton_scaffold::naming::{Naming, SemanticType};
//!
//! assert_eq!(Naming::pluralize("category"), "categories");
//! assert_eq!(Naming::singularize("people"), "person");
//! assert_eq!(Naming::to_identifier_case("user_id"), "UserID");
//! assert_eq!(Naming::infer_type("created_at"), SemanticType::Timestamp);
//! ```

use inflector::Inflector;
use serde::Serialize;
use std::fmt;

/// Irregular nouns as `(singular, plural)` pairs
const IRREGULAR_NOUNS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("ox", "oxen"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("half", "halves"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("analysis", "analyses"),
    ("crisis", "crises"),
    ("thesis", "theses"),
    ("quiz", "quizzes"),
    ("movie", "movies"),
    ("cookie", "cookies"),
    ("cache", "caches"),
];

/// Nouns ending in a sibilant plus silent `e`, pluralized with a bare `s`
const SILENT_E_NOUNS: &[&str] = &[
    "axe",
    "annexe",
    "ache",
    "headache",
    "avalanche",
    "moustache",
    "mustache",
    "panache",
    "niche",
    "quiche",
    "cliche",
    "creche",
    "fiche",
    "psyche",
];

/// Nouns whose singular and plural forms are identical
const UNCOUNTABLE_NOUNS: &[&str] = &[
    "sheep",
    "fish",
    "series",
    "species",
    "news",
    "equipment",
    "information",
    "metadata",
    "feedback",
];

/// Tokens rendered fully upper-cased by [`Naming::to_identifier_case`]
const ACRONYMS: &[&str] = &[
    "id", "url", "uri", "http", "https", "api", "html", "json", "xml", "sql", "uuid", "ip", "css",
    "ui",
];

/// Exact field names with a known semantic type
const EXACT_TYPES: &[(&str, SemanticType)] = &[
    ("id", SemanticType::Int),
    ("email", SemanticType::String),
    ("name", SemanticType::String),
    ("title", SemanticType::String),
    ("description", SemanticType::String),
    ("body", SemanticType::String),
    ("content", SemanticType::String),
    ("url", SemanticType::String),
    ("website", SemanticType::String),
    ("age", SemanticType::Int),
    ("quantity", SemanticType::Int),
    ("count", SemanticType::Int),
    ("position", SemanticType::Int),
    ("rank", SemanticType::Int),
    ("price", SemanticType::Float),
    ("amount", SemanticType::Float),
    ("total", SemanticType::Float),
    ("cost", SemanticType::Float),
    ("balance", SemanticType::Float),
    ("rating", SemanticType::Float),
    ("score", SemanticType::Float),
    ("latitude", SemanticType::Float),
    ("longitude", SemanticType::Float),
    ("active", SemanticType::Bool),
    ("enabled", SemanticType::Bool),
    ("published", SemanticType::Bool),
    ("verified", SemanticType::Bool),
    ("archived", SemanticType::Bool),
    ("birthday", SemanticType::Timestamp),
    ("dob", SemanticType::Timestamp),
    ("timestamp", SemanticType::Timestamp),
];

const SUFFIX_TYPES: &[(&str, SemanticType)] = &[
    ("_at", SemanticType::Timestamp),
    ("_date", SemanticType::Timestamp),
    ("_time", SemanticType::Timestamp),
    ("_count", SemanticType::Int),
    ("_number", SemanticType::Int),
    ("_index", SemanticType::Int),
    ("_price", SemanticType::Float),
    ("_amount", SemanticType::Float),
    ("_rate", SemanticType::Float),
];

const PREFIX_TYPES: &[(&str, SemanticType)] = &[
    ("is_", SemanticType::Bool),
    ("has_", SemanticType::Bool),
    ("can_", SemanticType::Bool),
];

const SUBSTRING_TYPES: &[(&str, SemanticType)] = &[
    ("email", SemanticType::String),
    ("url", SemanticType::String),
    ("price", SemanticType::Float),
    ("amount", SemanticType::Float),
];

/// Semantic type inferred from a bare field name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    /// Text value
    String,
    /// Whole number
    Int,
    /// Floating point number
    Float,
    /// True/false flag
    Bool,
    /// Point in time
    Timestamp,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// Naming helpers shared by the generator and the template function table
pub struct Naming;

impl Naming {
    /// Pluralize a word
    ///
    /// Only the last word of a compound name is inflected, so
    /// `blog_post` becomes `blog_posts` and `TeamPerson` becomes `TeamPeople`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use acton_scaffold::naming::Naming;
    /// assert_eq!(Naming::pluralize("post"), "posts");
    /// assert_eq!(Naming::pluralize("box"), "boxes");
    /// assert_eq!(Naming::pluralize("company"), "companies");
    /// assert_eq!(Naming::pluralize("team_person"), "team_people");
    /// ```
    #[must_use]
    pub fn pluralize(word: &str) -> String {
        let (head, last) = word.split_at(last_word_start(word));
        if last.is_empty() {
            return word.to_string();
        }
        let lower = last.to_lowercase();

        if UNCOUNTABLE_NOUNS.contains(&lower.as_str())
            || IRREGULAR_NOUNS.iter().any(|(_, plural)| *plural == lower)
        {
            return word.to_string();
        }
        if let Some((_, plural)) = IRREGULAR_NOUNS.iter().find(|(singular, _)| *singular == lower) {
            return format!("{head}{}", match_capitalization(last, plural));
        }

        let inflected = if lower.ends_with('y') && !ends_with_vowel_y(&lower) {
            format!("{}ies", &last[..last.len() - 1])
        } else if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
            format!("{last}es")
        } else {
            format!("{last}s")
        };
        format!("{head}{inflected}")
    }

    /// Singularize a word
    ///
    /// # Examples
    ///
    /// ```
    /// # use acton_scaffold::naming::Naming;
    /// assert_eq!(Naming::singularize("posts"), "post");
    /// assert_eq!(Naming::singularize("categories"), "category");
    /// assert_eq!(Naming::singularize("statuses"), "status");
    /// assert_eq!(Naming::singularize("children"), "child");
    /// ```
    #[must_use]
    pub fn singularize(word: &str) -> String {
        let (head, last) = word.split_at(last_word_start(word));
        if last.is_empty() {
            return word.to_string();
        }
        let lower = last.to_lowercase();

        if UNCOUNTABLE_NOUNS.contains(&lower.as_str())
            || IRREGULAR_NOUNS.iter().any(|(singular, _)| *singular == lower)
        {
            return word.to_string();
        }
        if let Some((singular, _)) = IRREGULAR_NOUNS.iter().find(|(_, plural)| *plural == lower) {
            return format!("{head}{}", match_capitalization(last, singular));
        }

        let len = last.len();
        let silent_e = lower
            .strip_suffix('s')
            .is_some_and(|stem| SILENT_E_NOUNS.contains(&stem));
        let inflected = if silent_e {
            last[..len - 1].to_string()
        } else if lower.ends_with("ies") && len > 3 {
            format!("{}y", &last[..len - 3])
        } else if lower.ends_with("ses") {
            let stem = &lower[..lower.len() - 2];
            if stem.ends_with("ss") || (stem.ends_with("us") && !stem.ends_with("ous")) {
                last[..len - 2].to_string()
            } else {
                last[..len - 1].to_string()
            }
        } else if lower.ends_with("zes") && !lower.ends_with("zzes") && !lower.ends_with("tzes") {
            // size, prize, breeze
            last[..len - 1].to_string()
        } else if ["xes", "zes", "ches", "shes"].iter().any(|s| lower.ends_with(s)) {
            last[..len - 2].to_string()
        } else if ["ss", "us", "is"].iter().any(|s| lower.ends_with(s)) {
            last.to_string()
        } else if lower.ends_with('s') {
            last[..len - 1].to_string()
        } else {
            last.to_string()
        };
        format!("{head}{inflected}")
    }

    /// Convert a `snake_case` name into an identifier-friendly form
    ///
    /// Known acronyms are upper-cased as a whole token instead of being
    /// title-cased. Input that is not snake case is normalized first.
    ///
    /// # Examples
    ///
    /// ```
    /// # use acton_scaffold::naming::Naming;
    /// assert_eq!(Naming::to_identifier_case("blog_post"), "BlogPost");
    /// assert_eq!(Naming::to_identifier_case("api_key"), "APIKey");
    /// assert_eq!(Naming::to_identifier_case("user_id"), "UserID");
    /// ```
    #[must_use]
    pub fn to_identifier_case(snake: &str) -> String {
        Self::to_snake_case(snake)
            .split('_')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                if ACRONYMS.contains(&segment) {
                    segment.to_uppercase()
                } else {
                    capitalize(segment)
                }
            })
            .collect()
    }

    /// Infer the semantic type of a field from its bare name
    ///
    /// Lookup order: exact name, suffix, prefix, substring, then `String`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use acton_scaffold::naming::{Naming, SemanticType};
    /// assert_eq!(Naming::infer_type("is_active"), SemanticType::Bool);
    /// assert_eq!(Naming::infer_type("unit_price"), SemanticType::Float);
    /// assert_eq!(Naming::infer_type("nickname"), SemanticType::String);
    /// ```
    #[must_use]
    pub fn infer_type(field_name: &str) -> SemanticType {
        let name = Self::to_snake_case(field_name);

        if let Some((_, ty)) = EXACT_TYPES.iter().find(|(exact, _)| *exact == name) {
            return *ty;
        }
        if let Some((_, ty)) = SUFFIX_TYPES.iter().find(|(suffix, _)| name.ends_with(suffix)) {
            return *ty;
        }
        if let Some((_, ty)) = PREFIX_TYPES.iter().find(|(prefix, _)| name.starts_with(prefix)) {
            return *ty;
        }
        if let Some((_, ty)) = SUBSTRING_TYPES.iter().find(|(needle, _)| name.contains(needle)) {
            return *ty;
        }
        SemanticType::String
    }

    /// Convert string to `snake_case`
    ///
    /// ```
    /// # use acton_scaffold::naming::Naming;
    /// assert_eq!(Naming::to_snake_case("UserProfile"), "user_profile");
    /// assert_eq!(Naming::to_snake_case("blog-post"), "blog_post");
    /// ```
    #[must_use]
    pub fn to_snake_case(input: &str) -> String {
        input.to_snake_case()
    }

    /// Convert string to kebab-case
    #[must_use]
    pub fn to_kebab_case(input: &str) -> String {
        input.to_kebab_case()
    }

    /// Human-readable title (`blog_post` → `Blog Post`)
    #[must_use]
    pub fn to_title(input: &str) -> String {
        Self::to_snake_case(input).to_title_case()
    }

    /// Convert a resource name to its storage table name (`snake_case` plural)
    ///
    /// The name is singularized first, so already-plural input is stable.
    ///
    /// ```
    /// # use acton_scaffold::naming::Naming;
    /// assert_eq!(Naming::to_table_name("UserProfile"), "user_profiles");
    /// assert_eq!(Naming::to_table_name("users"), "users");
    /// ```
    #[must_use]
    pub fn to_table_name(name: &str) -> String {
        Self::pluralize(&Self::to_package_name(name))
    }

    /// Package (module) identifier: lower `snake_case` singular
    ///
    /// ```
    /// # use acton_scaffold::naming::Naming;
    /// assert_eq!(Naming::to_package_name("BlogPosts"), "blog_post");
    /// ```
    #[must_use]
    pub fn to_package_name(name: &str) -> String {
        Self::singularize(&Self::to_snake_case(name))
    }

    /// Route path for a resource (kebab-case plural)
    ///
    /// ```
    /// # use acton_scaffold::naming::Naming;
    /// assert_eq!(Naming::to_route_path("UserProfile"), "/user-profiles");
    /// ```
    #[must_use]
    pub fn to_route_path(name: &str) -> String {
        format!("/{}", Self::to_kebab_case(&Self::to_table_name(name)))
    }

    /// Foreign key column for a reference field
    ///
    /// ```
    /// # use acton_scaffold::naming::Naming;
    /// assert_eq!(Naming::to_foreign_key("author"), "author_id");
    /// assert_eq!(Naming::to_foreign_key("owner_id"), "owner_id");
    /// ```
    #[must_use]
    pub fn to_foreign_key(field_name: &str) -> String {
        let snake = Self::to_snake_case(field_name);
        if snake.ends_with("_id") {
            snake
        } else {
            format!("{snake}_id")
        }
    }
}

/// Byte offset where the last word of a compound name starts
fn last_word_start(word: &str) -> usize {
    let mut start = 0;
    let mut prev: Option<char> = None;
    for (idx, ch) in word.char_indices() {
        if matches!(ch, '_' | '-' | ' ') {
            start = idx + ch.len_utf8();
        } else if ch.is_uppercase() && prev.is_some_and(char::is_lowercase) {
            start = idx;
        }
        prev = Some(ch);
    }
    start
}

fn ends_with_vowel_y(lower: &str) -> bool {
    let mut chars = lower.chars().rev();
    chars.next();
    chars.next().is_some_and(|c| "aeiou".contains(c))
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Re-apply the leading capital of `original` to a lower-case replacement
fn match_capitalization(original: &str, replacement: &str) -> String {
    if original.chars().next().is_some_and(char::is_uppercase) {
        capitalize(replacement)
    } else {
        replacement.to_string()
    }
}
