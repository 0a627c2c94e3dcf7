/// Maximum number of languages sent in an `Accept-Language` header.
pub const MAX_ACCEPT_LANGUAGES: usize = 5;

/// Build an `Accept-Language` value from the user's preferred languages,
/// most preferred first, e.g. `da-DK,en;q=0.9`.
///
/// Returns `None` when there is nothing to negotiate with.
pub fn accept_language(preferred: &[String]) -> Option<String> {
    let languages: Vec<String> = preferred
        .iter()
        .map(|language| language.trim())
        .filter(|language| !language.is_empty())
        .take(MAX_ACCEPT_LANGUAGES)
        .enumerate()
        .map(|(index, language)| {
            if index == 0 {
                language.to_string()
            } else {
                format!("{};q={:.1}", language, 1.0 - index as f32 / 10.0)
            }
        })
        .collect();

    if languages.is_empty() {
        None
    } else {
        Some(languages.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_language_weights() {
        let preferred = vec!["da-DK".to_string(), "en".to_string(), "de".to_string()];
        assert_eq!(
            accept_language(&preferred).as_deref(),
            Some("da-DK,en;q=0.9,de;q=0.8")
        );
    }

    #[test]
    fn test_accept_language_caps_entries() {
        let preferred: Vec<String> = (0..8).map(|i| format!("l{}", i)).collect();
        let header = accept_language(&preferred).unwrap();
        assert_eq!(header.split(',').count(), MAX_ACCEPT_LANGUAGES);
    }

    #[test]
    fn test_accept_language_empty() {
        assert_eq!(accept_language(&[]), None);
        assert_eq!(accept_language(&[" ".to_string()]), None);
    }
}
