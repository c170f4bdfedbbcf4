//! Legacy template names kept for existing consumers.

pub const SINGLE_FILE_PACKAGE: &str = "graphql-codegen-typescript-template";
pub const MULTI_FILE_PACKAGE: &str = "graphql-codegen-typescript-template-multiple";

const LEGACY_ALIASES: [(&str, &str); 6] = [
    ("ts", SINGLE_FILE_PACKAGE),
    ("typescript", SINGLE_FILE_PACKAGE),
    ("ts-single", SINGLE_FILE_PACKAGE),
    ("typescript-single", SINGLE_FILE_PACKAGE),
    ("ts-multiple", MULTI_FILE_PACKAGE),
    ("typescript-multiple", MULTI_FILE_PACKAGE),
];

/// Map a legacy alias to its package name; exact and case-sensitive, unknown names pass through
pub fn resolve_alias(specifier: &str) -> &str {
    LEGACY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == specifier)
        .map(|(_, package)| *package)
        .unwrap_or(specifier)
}
