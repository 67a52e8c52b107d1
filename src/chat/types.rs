// ABOUTME: Wire types for the /chat endpoint — request bodies, the raw response, and the decoded reply.
// ABOUTME: Feature maps keep the server's key order, which drives the selection wizard's step order.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fixed query string sent with a feature submission.
pub const FEATURE_QUERY: &str = "course recommendation";

/// Reply language requested from the backend.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Zh];

    /// Wire tag, as sent in the `language` field.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }

    /// Human-readable name for the status bar.
    pub fn label(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Zh => "中文",
        }
    }

    /// The next language in the fixed cycle order.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One feature key and the options offered for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureOptions {
    pub key: String,
    pub options: Vec<String>,
}

/// Ordered `feature → options` mapping from a feature-selection reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureMenu(Vec<FeatureOptions>);

impl FeatureMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feature, replacing the options of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, options: Vec<String>) {
        let key = key.into();
        match self.0.iter_mut().find(|f| f.key == key) {
            Some(existing) => existing.options = options,
            None => self.0.push(FeatureOptions { key, options }),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureOptions> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|f| f.key.as_str())
    }

    /// Drop features that offer nothing to choose from.
    pub fn presentable(self) -> Self {
        Self(
            self.0
                .into_iter()
                .filter(|f| !f.options.is_empty())
                .collect(),
        )
    }

    pub fn into_steps(self) -> Vec<FeatureOptions> {
        self.0
    }
}

impl<K, V> FromIterator<(K, Vec<V>)> for FeatureMenu
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Vec<V>)>>(iter: I) -> Self {
        let mut menu = FeatureMenu::new();
        for (key, options) in iter {
            menu.insert(key, options.into_iter().map(Into::into).collect());
        }
        menu
    }
}

impl<'de> Deserialize<'de> for FeatureMenu {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MenuVisitor;

        impl<'de> Visitor<'de> for MenuVisitor {
            type Value = FeatureMenu;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of feature names to option lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FeatureMenu, A::Error> {
                let mut menu = FeatureMenu::new();
                while let Some((key, options)) = map.next_entry::<String, Vec<String>>()? {
                    menu.insert(key, options);
                }
                Ok(menu)
            }
        }

        deserializer.deserialize_map(MenuVisitor)
    }
}

/// Ordered `feature → chosen option` pairs collected by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSelections(Vec<(String, String)>);

impl FeatureSelections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a choice, overwriting an earlier choice for the same key.
    pub fn insert(&mut self, key: impl Into<String>, choice: impl Into<String>) {
        let key = key.into();
        let choice = choice.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = choice,
            None => self.0.push((key, choice)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FeatureSelections {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut selections = FeatureSelections::new();
        for (key, choice) in iter {
            selections.insert(key, choice);
        }
        selections
    }
}

impl Serialize for FeatureSelections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, choice) in &self.0 {
            map.serialize_entry(key, choice)?;
        }
        map.end()
    }
}

/// JSON body POSTed to `/chat`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatRequest {
    Text {
        session_id: String,
        user_query: String,
        language: Language,
    },
    Features {
        session_id: String,
        user_query: String,
        user_features: FeatureSelections,
    },
}

impl ChatRequest {
    pub fn text(session_id: &str, text: &str, language: Language) -> Self {
        ChatRequest::Text {
            session_id: session_id.to_string(),
            user_query: text.to_string(),
            language,
        }
    }

    pub fn features(session_id: &str, selections: FeatureSelections) -> Self {
        ChatRequest::Features {
            session_id: session_id.to_string(),
            user_query: FEATURE_QUERY.to_string(),
            user_features: selections,
        }
    }
}

/// Raw JSON body returned by `/chat`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub feature_selection: Option<FeatureMenu>,
}

/// A decoded reply: either plain text or a prompt to pick features.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    Text(String),
    FeatureSelection { prompt: String, menu: FeatureMenu },
}

impl From<ChatResponse> for ChatReply {
    /// A feature map with nothing presentable degrades to a plain reply.
    fn from(raw: ChatResponse) -> Self {
        match raw.feature_selection.map(FeatureMenu::presentable) {
            Some(menu) if !menu.is_empty() => ChatReply::FeatureSelection {
                prompt: raw.response,
                menu,
            },
            _ => ChatReply::Text(raw.response),
        }
    }
}

/// What the user asked the gateway to send.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Text { text: String, language: Language },
    Features(FeatureSelections),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_request_wire_shape() {
        let req = ChatRequest::text("s-1", "What courses are available?", Language::Zh);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "session_id": "s-1",
                "user_query": "What courses are available?",
                "language": "zh",
            })
        );
    }

    #[test]
    fn feature_request_wire_shape_keeps_order() {
        let selections: FeatureSelections =
            [("level", "Postgraduate"), ("area", "Computing")].into_iter().collect();
        let req = ChatRequest::features("s-1", selections);
        let body = serde_json::to_string(&req).unwrap();
        assert_eq!(
            body,
            r#"{"session_id":"s-1","user_query":"course recommendation","user_features":{"level":"Postgraduate","area":"Computing"}}"#
        );
    }

    #[test]
    fn plain_response_decodes_to_text() {
        let raw: ChatResponse = serde_json::from_str(r#"{"response":"Hello"}"#).unwrap();
        assert_eq!(ChatReply::from(raw), ChatReply::Text("Hello".to_string()));
    }

    #[test]
    fn null_feature_selection_is_plain_text() {
        let raw: ChatResponse =
            serde_json::from_str(r#"{"response":"Hi","feature_selection":null}"#).unwrap();
        assert_eq!(ChatReply::from(raw), ChatReply::Text("Hi".to_string()));
    }

    #[test]
    fn feature_selection_preserves_key_order() {
        let raw: ChatResponse = serde_json::from_str(
            r#"{"response":"Pick","feature_selection":{"zeta":["a"],"alpha":["b","c"],"mid":["d"]}}"#,
        )
        .unwrap();
        match ChatReply::from(raw) {
            ChatReply::FeatureSelection { prompt, menu } => {
                assert_eq!(prompt, "Pick");
                assert_eq!(menu.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
            }
            other => panic!("expected feature selection, got {other:?}"),
        }
    }

    #[test]
    fn empty_feature_map_is_plain_text() {
        let raw: ChatResponse =
            serde_json::from_str(r#"{"response":"Nothing to pick","feature_selection":{}}"#)
                .unwrap();
        assert_eq!(
            ChatReply::from(raw),
            ChatReply::Text("Nothing to pick".to_string())
        );
    }

    #[test]
    fn keys_without_options_are_skipped() {
        let raw: ChatResponse = serde_json::from_str(
            r#"{"response":"Pick","feature_selection":{"empty":[],"level":["UG"]}}"#,
        )
        .unwrap();
        match ChatReply::from(raw) {
            ChatReply::FeatureSelection { menu, .. } => {
                assert_eq!(menu.keys().collect::<Vec<_>>(), vec!["level"]);
            }
            other => panic!("expected feature selection, got {other:?}"),
        }

        let all_empty: ChatResponse =
            serde_json::from_str(r#"{"response":"x","feature_selection":{"a":[]}}"#).unwrap();
        assert_eq!(ChatReply::from(all_empty), ChatReply::Text("x".to_string()));
    }

    #[test]
    fn missing_response_field_is_rejected() {
        let result = serde_json::from_str::<ChatResponse>(r#"{"answer":"wrong"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_insert_replaces_in_place() {
        let mut menu = FeatureMenu::new();
        menu.insert("a", vec!["1".to_string()]);
        menu.insert("b", vec!["2".to_string()]);
        menu.insert("a", vec!["3".to_string()]);
        assert_eq!(menu.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(menu.iter().next().unwrap().options, vec!["3"]);

        let mut selections = FeatureSelections::new();
        selections.insert("a", "x");
        selections.insert("a", "y");
        assert_eq!(selections.len(), 1);
        assert_eq!(selections.get("a"), Some("y"));
    }

    #[test]
    fn language_cycle_and_codes() {
        assert_eq!(Language::default(), Language::En);
        assert_eq!(Language::En.next(), Language::Zh);
        assert_eq!(Language::Zh.next(), Language::En);
        assert_eq!(Language::Zh.to_string(), "zh");
        let parsed: Language = serde_json::from_str(r#""en""#).unwrap();
        assert_eq!(parsed, Language::En);
    }
}
