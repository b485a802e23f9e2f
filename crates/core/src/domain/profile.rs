use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Flat answer map built by the questionnaire.
///
/// Entries keep insertion order so the encoded query string follows the
/// questionnaire order. Keys are unique: recording an existing key replaces
/// its value in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    entries: Vec<(String, String)>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a profile from decoded query pairs; a repeated key keeps its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut profile = Self::new();
        for (key, value) in pairs {
            profile.record(key, value);
        }
        profile
    }

    pub fn from_query(query: &str) -> Self {
        Self::from_pairs(form_urlencoded::parse(query.trim_start_matches('?').as_bytes()))
    }

    /// Returns the replaced value when the key was already answered.
    pub fn record(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(existing, _)| existing == key).map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.entries {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Profile;

    #[test]
    fn record_keeps_keys_unique_and_order_stable() {
        let mut profile = Profile::new();
        assert_eq!(profile.record("consumo_annuo", "BASSO"), None);
        assert_eq!(profile.record("cap", "00184"), None);
        assert_eq!(profile.record("consumo_annuo", "ALTO"), Some("BASSO".to_owned()));

        let entries: Vec<_> = profile.iter().collect();
        assert_eq!(entries, vec![("consumo_annuo", "ALTO"), ("cap", "00184")]);
    }

    #[test]
    fn query_encoding_escapes_values() {
        let profile = Profile::from_pairs([("nota", "luce & gas"), ("cap", "00184")]);

        assert_eq!(profile.to_query(), "nota=luce+%26+gas&cap=00184");
        assert_eq!(Profile::from_query(&profile.to_query()), profile);
    }

    #[test]
    fn decoding_accepts_any_parameter_and_last_value_wins() {
        let profile = Profile::from_query("?utm_source=newsletter&cap=1&cap=20121");

        assert_eq!(profile.get("utm_source"), Some("newsletter"));
        assert_eq!(profile.get("cap"), Some("20121"));
        assert_eq!(profile.len(), 2);
    }
}
