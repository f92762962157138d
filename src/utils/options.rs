use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

/// Named options handed to a plugin by the harness
///
/// This is the untyped boundary form; plugins convert it into their own
/// request structures before acting on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginOptions {
    values: BTreeMap<String, String>,
}

impl PluginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value` tokens, as given on the command line
    pub fn parse_pairs<I, S>(pairs: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("Expected key=value, got '{}'", pair))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(anyhow!("Empty option name in '{}'", pair));
            }
            options.set(key, value);
        }
        Ok(options)
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Like `get`, but blank values count as missing
    pub fn require(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|value| !value.is_empty())
    }

    /// Parse an option into `T`; `None` when the option is absent
    pub fn parse<T>(&self, key: &str) -> Option<Result<T, T::Err>>
    where
        T: FromStr,
    {
        self.get(key).map(str::parse)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for PluginOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "{}", rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let options = PluginOptions::parse_pairs(["port=COM3", "baud=9600", "cmd=a=b"]).unwrap();
        assert_eq!(options.get("port"), Some("COM3"));
        assert_eq!(options.get("cmd"), Some("a=b"));
        assert_eq!(options.parse::<u32>("baud").unwrap().unwrap(), 9600);
        assert!(options.parse::<u32>("missing").is_none());
    }

    #[test]
    fn test_require_skips_blank_values() {
        let options = PluginOptions::new()
            .with("tool", "  st-flash ")
            .with("target_id", " ");
        assert_eq!(options.require("tool"), Some("st-flash"));
        assert_eq!(options.require("target_id"), None);
        assert_eq!(options.get("target_id"), Some(" "));
        assert_eq!(options.require("missing"), None);
        assert!(!options.is_empty());
        assert!(PluginOptions::new().is_empty());
    }

    #[test]
    fn test_parse_pairs_rejects_bad_tokens() {
        assert!(PluginOptions::parse_pairs(["novalue"]).is_err());
        assert!(PluginOptions::parse_pairs(["=value"]).is_err());
    }

    #[test]
    fn test_display_is_sorted() {
        let options = PluginOptions::new().with("b", 2).with("a", 1);
        assert_eq!(options.to_string(), "a=1 b=2");
    }
}
