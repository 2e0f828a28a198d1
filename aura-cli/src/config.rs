use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use aura_ai::GeminiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmSection,
    pub chat: ChatSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    pub model: String,
    pub base_url: String,
    /// Name of the environment variable holding the API credential.
    /// Credential provisioning itself is out of band.
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSection {
    pub max_turns_context: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmSection {
                model: GeminiClient::DEFAULT_MODEL.to_string(),
                base_url: GeminiClient::DEFAULT_BASE_URL.to_string(),
                api_key_env: "GEMINI_API_KEY".to_string(),
            },
            chat: ChatSection {
                max_turns_context: 12,
            },
        }
    }
}

pub fn aura_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".aura"))
}

pub fn ensure_aura_home() -> Result<PathBuf> {
    let dir = aura_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_aura_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}

/// The API credential, if the configured environment variable is set.
pub fn api_key(cfg: &Config) -> Option<String> {
    std::env::var(&cfg.llm.api_key_env)
        .ok()
        .filter(|k| !k.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.llm.model, cfg.llm.model);
        assert_eq!(back.chat.max_turns_context, 12);
    }

    #[test]
    fn test_partial_config_fails_loudly() {
        // Missing sections are a config error, not a silent default.
        let parsed = toml::from_str::<Config>("[llm]\nmodel = \"gemini-2.5-flash\"\n");
        assert!(parsed.is_err());
    }
}
