//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// An adapter with no sections; every lookup yields its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[service]
base_url = http://analytics.internal:8000
endpoint = /api/analyze

[report]
output = out/report.typ
axis_ticks = 8
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("service", "base_url"),
            Some("http://analytics.internal:8000".to_string())
        );
        assert_eq!(
            adapter.get_string("report", "output"),
            Some("out/report.typ".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[service]\nendpoint = /x\n").unwrap();
        assert_eq!(adapter.get_string("service", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_string_or_falls_back_for_blank_values() {
        let adapter = FileConfigAdapter::from_string("[report]\noutput =\n").unwrap();
        assert_eq!(
            adapter.get_string_or("report", "output", "report.typ"),
            "report.typ"
        );
        assert_eq!(
            adapter.get_string_or("report", "missing", "fallback"),
            "fallback"
        );
    }

    #[test]
    fn get_int_returns_value() {
        let adapter = FileConfigAdapter::from_string("[report]\naxis_ticks = 5\n").unwrap();
        assert_eq!(adapter.get_int("report", "axis_ticks", 0), 5);
    }

    #[test]
    fn get_int_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[report]\n").unwrap();
        assert_eq!(adapter.get_int("report", "missing", 42), 42);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[report]\naxis_ticks = many\n").unwrap();
        assert_eq!(adapter.get_int("report", "axis_ticks", 6), 6);
    }

    #[test]
    fn empty_adapter_has_no_values() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("service", "base_url"), None);
        assert_eq!(adapter.get_int("report", "axis_ticks", 6), 6);
    }

    #[test]
    fn from_file_reads_config() {
        let content = "[report]\ntemplate_path = /path/to/template.typ\n";
        let file = create_temp_config(content);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("report", "template_path"),
            Some("/path/to/template.typ".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/portlens.ini");
        assert!(result.is_err());
    }
}
