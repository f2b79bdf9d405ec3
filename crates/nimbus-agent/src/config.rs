use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    pub agent_id: String,
    /// Host identity attached to every push; defaults to the system hostname.
    pub hostname: Option<String>,
    pub gateway_url: String,
    #[serde(default = "default_push_interval")]
    pub push_interval_secs: u64,
    /// Rebuild the device mapping once per pass when a lookup misses.
    #[serde(default)]
    pub refresh_mapping_on_miss: bool,
    /// Override for the credential directory; defaults to the per-user
    /// configuration directory.
    #[serde(default)]
    pub credential_dir: Option<PathBuf>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    pub endpoint: String,
    pub secret: String,
    pub secret_id: String,
    pub tenant_id: String,
}

fn default_push_interval() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

impl AgentConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        agent_id = "agent-1"
        gateway_url = "https://gateway.example.com"

        [auth]
        endpoint = "https://auth.example.com"
        secret = "s3cret"
        secret_id = "sid-1"
        tenant_id = "tenant-1"
    "#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: AgentConfig = toml::from_str(MINIMAL).expect("parse");
        assert_eq!(config.agent_id, "agent-1");
        assert_eq!(config.push_interval_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(!config.refresh_mapping_on_miss);
        assert!(config.hostname.is_none());
        assert!(config.credential_dir.is_none());
    }

    #[test]
    fn missing_auth_section_is_an_error() {
        let result = toml::from_str::<AgentConfig>(
            r#"
            agent_id = "agent-1"
            gateway_url = "https://gateway.example.com"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("agent.toml");
        std::fs::write(&path, MINIMAL).expect("write config");

        let config = AgentConfig::load(&path.to_string_lossy()).expect("load");
        assert_eq!(config.auth.tenant_id, "tenant-1");
    }
}
