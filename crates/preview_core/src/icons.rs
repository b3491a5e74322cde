//! Static language identifier to icon class lookup.

/// Icon used for code blocks whose language has no entry in [`LANGUAGE_ICON_TABLE`].
pub const DEFAULT_LANGUAGE_ICON: &str = "fas fa-code";

/// Lowercase language identifier to Font Awesome class tokens.
///
/// Sorted by key so that lookups can use binary search.
pub static LANGUAGE_ICON_TABLE: &[(&str, &str)] = &[
    ("angular", "fab fa-angular"),
    ("bash", "fas fa-terminal"),
    ("bitbucket", "fab fa-bitbucket"),
    ("c", "fas fa-code"),
    ("c#", "fas fa-code"),
    ("c++", "fas fa-code"),
    ("cpp", "fas fa-code"),
    ("csharp", "fas fa-code"),
    ("css", "fab fa-css3-alt"),
    ("docker", "fab fa-docker"),
    ("git", "fab fa-git-alt"),
    ("github", "fab fa-github"),
    ("gitlab", "fab fa-gitlab"),
    ("go", "fas fa-code"),
    ("golang", "fas fa-code"),
    ("html", "fab fa-html5"),
    ("ini", "fas fa-file-code"),
    ("java", "fab fa-java"),
    ("javascript", "fab fa-js-square"),
    ("js", "fab fa-js-square"),
    ("json", "fas fa-file-code"),
    ("jsx", "fab fa-react"),
    ("kotlin", "fas fa-code"),
    ("less", "fab fa-less"),
    ("markdown", "fab fa-markdown"),
    ("md", "fab fa-markdown"),
    ("mongodb", "fas fa-database"),
    ("mysql", "fas fa-database"),
    ("node", "fab fa-node-js"),
    ("nodejs", "fab fa-node-js"),
    ("npm", "fab fa-npm"),
    ("php", "fab fa-php"),
    ("postgresql", "fas fa-database"),
    ("powershell", "fas fa-terminal"),
    ("py", "fab fa-python"),
    ("python", "fab fa-python"),
    ("rb", "fas fa-gem"),
    ("react", "fab fa-react"),
    ("ruby", "fas fa-gem"),
    ("rust", "fas fa-cog"),
    ("sass", "fab fa-sass"),
    ("scss", "fab fa-sass"),
    ("sh", "fas fa-terminal"),
    ("shell", "fas fa-terminal"),
    ("sql", "fas fa-database"),
    ("swift", "fab fa-swift"),
    ("text", "fas fa-file-alt"),
    ("toml", "fas fa-file-code"),
    ("ts", "fab fa-js-square"),
    ("txt", "fas fa-file-alt"),
    ("typescript", "fab fa-js-square"),
    ("vue", "fab fa-vuejs"),
    ("xml", "fas fa-code"),
    ("yaml", "fas fa-file-code"),
    ("yarn", "fab fa-yarn"),
    ("yml", "fas fa-file-code"),
];

#[inline]
pub fn bsearch_language_icon(language: &str) -> Option<&'static str> {
    LANGUAGE_ICON_TABLE
        .binary_search_by(|(key, _)| (*key).cmp(language))
        .ok()
        .map(|idx| LANGUAGE_ICON_TABLE[idx].1)
}

/// Returns the icon classes for `language`, falling back to [`DEFAULT_LANGUAGE_ICON`].
///
/// The identifier is matched case-insensitively.
pub fn icon_for_language(language: &str) -> &'static str {
    bsearch_language_icon(&language.to_lowercase()).unwrap_or(DEFAULT_LANGUAGE_ICON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        assert!(LANGUAGE_ICON_TABLE.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_known_languages() {
        assert_eq!(icon_for_language("python"), "fab fa-python");
        assert_eq!(icon_for_language("PYTHON"), "fab fa-python");
        assert_eq!(icon_for_language("c++"), "fas fa-code");
        assert_eq!(icon_for_language("rust"), "fas fa-cog");
    }

    #[test]
    fn test_unknown_language_falls_back() {
        assert_eq!(icon_for_language("brainfuck"), DEFAULT_LANGUAGE_ICON);
        assert_eq!(icon_for_language(""), DEFAULT_LANGUAGE_ICON);
    }
}
