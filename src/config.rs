use anyhow::{bail, Context, Result};
use clap_serde_derive::ClapSerde;

use crate::inference::model_config::{DEFAULT_REPAIR_MODEL, DEFAULT_TEMPERATURE};
use crate::inference::together::DEFAULT_ENDPOINT;
use crate::inference::{ModelSettings, VisionModel};

#[derive(ClapSerde, Debug)]
pub struct Config {
    /// The address the listener binds to
    #[default("0.0.0.0".to_string())]
    #[arg(short, long, env)]
    pub(crate) address: String,

    /// The port the listener binds to
    #[default(25566)]
    #[arg(short, long, env)]
    pub(crate) port: u16,

    /// Chat-completions endpoint of the inference API
    #[default(DEFAULT_ENDPOINT.to_string())]
    #[arg(long, env)]
    pub(crate) inference_endpoint: String,

    /// API key for the inference API
    #[default(String::new())]
    #[arg(long, env = "TOGETHER_API_KEY", hide_env_values = true)]
    pub(crate) api_key: String,

    /// Vision model used when a request does not name one
    #[default(VisionModel::default().id().to_string())]
    #[arg(long, env)]
    pub(crate) primary_model: String,

    /// Text model that extracts JSON from a malformed primary answer
    #[default(DEFAULT_REPAIR_MODEL.to_string())]
    #[arg(long, env)]
    pub(crate) repair_model: String,

    /// Sampling temperature of the primary call
    #[default(DEFAULT_TEMPERATURE)]
    #[arg(long, env)]
    pub(crate) temperature: f32,

    /// Maximum request body size in bytes
    #[default(10_000_000)]
    #[arg(long, env)]
    pub(crate) body_limit: usize,

    /// PEM certificate, serves HTTPS together with the key
    #[default(String::new())]
    #[arg(long, env)]
    pub(crate) tls_cert_path: String,

    /// PEM private key, serves HTTPS together with the certificate
    #[default(String::new())]
    #[arg(long, env)]
    pub(crate) tls_key_path: String,

    /// OTLP collector endpoint, empty disables export
    #[default(String::new())]
    #[arg(long, env)]
    pub(crate) otlp_endpoint: String,

    /// Also log to the console when exporting to OTLP
    #[default(false)]
    #[arg(long, env)]
    pub(crate) console: bool,
}

impl Config {
    pub fn from_toml(path: &str) -> Result<Self> {
        let str = std::fs::read_to_string(path)?;
        let opt: <Config as ClapSerde>::Opt = toml::from_str(&str)?;
        Ok(Config::from(opt))
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.inference_endpoint)
            .with_context(|| format!("Invalid inference endpoint {}", self.inference_endpoint))?;
        if self.api_key.is_empty() {
            bail!("Missing inference API key, set TOGETHER_API_KEY or --api-key");
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            bail!("Temperature {} is outside 0.0..=2.0", self.temperature);
        }
        if self.primary_model.is_empty() || self.repair_model.is_empty() {
            bail!("Model identifiers must not be empty");
        }
        if self.tls_cert_path.is_empty() != self.tls_key_path.is_empty() {
            bail!("TLS needs both a certificate and a key path");
        }
        Ok(())
    }

    pub fn otlp_endpoint(&self) -> Option<&str> {
        Some(self.otlp_endpoint.as_str()).filter(|endpoint| !endpoint.is_empty())
    }

    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        if self.tls_cert_path.is_empty() || self.tls_key_path.is_empty() {
            return None;
        }
        Some((self.tls_cert_path.as_str(), self.tls_key_path.as_str()))
    }

    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            primary_model: self.primary_model.clone(),
            repair_model: self.repair_model.clone(),
            temperature: self.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            api_key: "test-key".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.address, "0.0.0.0");
        assert_eq!(config.port, 25566);
        assert_eq!(config.inference_endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.body_limit, 10_000_000);
        assert!(config.otlp_endpoint().is_none());
        assert!(config.tls_paths().is_none());
    }

    #[test]
    fn test_validate_accepts_defaults_with_key() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_api_key() {
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            inference_endpoint: "not a url".to_string(),
            ..valid()
        };
        assert!(config.validate().is_err());

        let config = Config {
            temperature: 3.5,
            ..valid()
        };
        assert!(config.validate().is_err());

        let config = Config {
            tls_cert_path: "cert.pem".to_string(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_model_settings_follow_config() {
        let config = Config {
            primary_model: "meta-llama/Llama-3.2-90B-Vision-Instruct-Turbo".to_string(),
            temperature: 0.1,
            ..valid()
        };
        let settings = config.model_settings();
        assert_eq!(settings.primary_model, "meta-llama/Llama-3.2-90B-Vision-Instruct-Turbo");
        assert_eq!(settings.repair_model, DEFAULT_REPAIR_MODEL);
        assert_eq!(settings.temperature, 0.1);
    }
}
