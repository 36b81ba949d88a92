use serde::Deserialize;
use std::fs::File;

#[derive(Deserialize)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
    /// Prefix prepended to every emitted metric name.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    "switchyard".to_string()
}

#[derive(Deserialize)]
pub struct LoggingConfig {
    pub sentry_dsn: String,
}

#[derive(Deserialize)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub gateway: gateway::Config,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    fn gateway_yaml() -> &'static str {
        r#"
            gateway:
                listener:
                    host: 0.0.0.0
                    port: 8080
                primary:
                    workbook_url: https://workbooks.example.com
                    workbook_id: wb-main
                    drive_url: https://drive.example.com
                    drive_id: drive-main
                legacy:
                    exec_url: https://bridge.example.com/exec
                auth:
                    tokeninfo_url: https://oauth.example.com/tokeninfo
            "#
    }

    #[test]
    fn full_config() {
        let yaml = format!(
            r#"
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            logging:
                sentry_dsn: https://key@sentry.example.com/42
            {}"#,
            gateway_yaml().trim_start()
        );
        let tmp = write_tmp_file(&yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        let metrics = config.common.metrics.expect("metrics config");
        assert_eq!(metrics.statsd_host, "127.0.0.1");
        assert_eq!(metrics.statsd_port, 8125);
        assert_eq!(metrics.prefix, "switchyard");

        let logging = config.common.logging.expect("logging config");
        assert_eq!(logging.sentry_dsn, "https://key@sentry.example.com/42");

        assert_eq!(config.gateway.listener.port, 8080);
        assert_eq!(config.gateway.primary.workbook_id, "wb-main");
        config.gateway.validate().expect("valid gateway config");
    }

    #[test]
    fn gateway_only_config() {
        let tmp = write_tmp_file(gateway_yaml());
        let config = Config::from_file(tmp.path()).expect("load config");

        assert!(config.common.metrics.is_none());
        assert!(config.common.logging.is_none());
        assert_eq!(config.gateway.listener.host, "0.0.0.0");
    }

    #[test]
    fn metric_prefix_can_be_overridden() {
        let yaml = format!(
            r#"
            metrics:
                statsd_host: statsd.internal
                statsd_port: 8125
                prefix: edge
            {}"#,
            gateway_yaml().trim_start()
        );
        let tmp = write_tmp_file(&yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        let metrics = config.common.metrics.expect("metrics config");
        assert_eq!(metrics.prefix, "edge");
    }

    #[test]
    fn missing_gateway_section_is_an_error() {
        let tmp = write_tmp_file("metrics:\n    statsd_host: 127.0.0.1\n    statsd_port: 8125\n");
        let result = Config::from_file(tmp.path());

        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
