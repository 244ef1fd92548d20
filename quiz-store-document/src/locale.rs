//! Locale code handling.
//!
//! Documents are keyed by language only, so `pl_PL.UTF-8`, `pl-PL` and
//! `pl` all select the same document.

/// Environment variables consulted by [`system_language`], highest priority first.
const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Extract the lowercase language part of a locale code.
pub fn language_code(locale: &str) -> String {
    locale
        .trim()
        .split(['_', '-', '.', '@'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Language of the current process locale, if one is set.
///
/// The first non-empty variable of `LC_ALL`, `LC_MESSAGES`, `LANG` decides.
/// The `C` and `POSIX` locales carry no language and yield `None`.
pub fn system_language() -> Option<String> {
    language_from(|var| std::env::var(var).ok())
}

fn language_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    let locale = LOCALE_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .find(|value| !value.trim().is_empty())?;
    let code = language_code(&locale);
    match code.as_str() {
        "" | "c" | "posix" => None,
        _ => Some(code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_code_strips_region_and_encoding() {
        assert_eq!(language_code("pl_PL.UTF-8"), "pl");
        assert_eq!(language_code("en-US"), "en");
        assert_eq!(language_code("DE"), "de");
        assert_eq!(language_code("sr@latin"), "sr");
        assert_eq!(language_code(""), "");
    }

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |var| {
            pairs
                .iter()
                .find(|(k, _)| *k == var)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn lc_all_takes_priority() {
        let lookup = env(&[("LANG", "en_US.UTF-8"), ("LC_ALL", "pl_PL.UTF-8")]);
        assert_eq!(language_from(lookup), Some("pl".to_string()));
    }

    #[test]
    fn empty_variables_are_skipped() {
        let lookup = env(&[("LC_ALL", ""), ("LANG", "fr_FR")]);
        assert_eq!(language_from(lookup), Some("fr".to_string()));
    }

    #[test]
    fn posix_locale_has_no_language() {
        assert_eq!(language_from(env(&[("LANG", "C.UTF-8")])), None);
        assert_eq!(language_from(env(&[("LC_ALL", "POSIX")])), None);
        assert_eq!(language_from(env(&[])), None);
    }
}
