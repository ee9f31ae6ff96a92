//! Feed name -> location identity.

use crate::config::WatchConfig;

/// Rules turning a raw feed location name into the stored location name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationNaming {
    pub prefix: Option<String>,
    pub title_case: bool,
}

impl LocationNaming {
    pub fn from_config(config: &WatchConfig) -> Self {
        Self {
            prefix: config
                .location_prefix
                .as_deref()
                .map(str::trim)
                .filter(|prefix| !prefix.is_empty())
                .map(str::to_owned),
            title_case: config.title_case_locations,
        }
    }

    /// Applies title-casing (when enabled) then the prefix.
    pub fn location_name(&self, feed_name: &str) -> String {
        let base = if self.title_case {
            title_case(feed_name.trim())
        } else {
            feed_name.trim().to_owned()
        };

        match &self.prefix {
            Some(prefix) if base.is_empty() => prefix.clone(),
            Some(prefix) => format!("{prefix} {base}"),
            None => base,
        }
    }
}

/// Title-cases each space separated word.
///
/// Words written entirely in upper case are treated as acronyms and kept.
/// Other words get an upper-case first letter and a lower-case remainder.
pub fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let has_letters = word.chars().any(char::is_alphabetic);
    let all_upper = word
        .chars()
        .filter(|ch| ch.is_alphabetic())
        .all(char::is_uppercase);
    if has_letters && all_upper {
        return word.to_owned();
    }

    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
