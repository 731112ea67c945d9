//! Configuration access port trait.
//!
//! Values are looked up by INI-style `[section] key`; typed getters fall
//! back to the supplied default when a key is absent or unparsable.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// String value with surrounding whitespace removed, or `default`.
    fn get_string_or(&self, section: &str, key: &str, default: &str) -> String {
        self.get_string(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    }
}
