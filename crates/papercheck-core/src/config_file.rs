use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub storage: Option<StorageSection>,
    pub scoring: Option<ScoringSection>,
    pub server: Option<ServerSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket: Option<String>,
    pub unique_keys: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringSection {
    pub openai_api_key: Option<String>,
    pub chat_api_base: Option<String>,
    pub chat_model: Option<String>,
    pub grammar_service_url: Option<String>,
    pub grammar_model_url: Option<String>,
    pub grammar_model_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub max_upload_mb: Option<usize>,
    pub cors_origins: Option<Vec<String>>,
}

/// Platform config directory path: `<config_dir>/papercheck/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("papercheck").join("config.toml"))
}

/// Load config by cascading CWD `.papercheck.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".papercheck.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

fn pick<T, S>(
    overlay: &Option<S>,
    base: &Option<S>,
    field: impl Fn(&S) -> Option<T>,
) -> Option<T> {
    overlay
        .as_ref()
        .and_then(&field)
        .or_else(|| base.as_ref().and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (bs, os) = (&base.storage, &overlay.storage);
    let (bc, oc) = (&base.scoring, &overlay.scoring);
    let (bv, ov) = (&base.server, &overlay.server);

    ConfigFile {
        storage: Some(StorageSection {
            region: pick(os, bs, |s| s.region.clone()),
            access_key_id: pick(os, bs, |s| s.access_key_id.clone()),
            secret_access_key: pick(os, bs, |s| s.secret_access_key.clone()),
            bucket: pick(os, bs, |s| s.bucket.clone()),
            unique_keys: pick(os, bs, |s| s.unique_keys),
        }),
        scoring: Some(ScoringSection {
            openai_api_key: pick(oc, bc, |s| s.openai_api_key.clone()),
            chat_api_base: pick(oc, bc, |s| s.chat_api_base.clone()),
            chat_model: pick(oc, bc, |s| s.chat_model.clone()),
            grammar_service_url: pick(oc, bc, |s| s.grammar_service_url.clone()),
            grammar_model_url: pick(oc, bc, |s| s.grammar_model_url.clone()),
            grammar_model_token: pick(oc, bc, |s| s.grammar_model_token.clone()),
        }),
        server: Some(ServerSection {
            bind: pick(ov, bv, |s| s.bind.clone()),
            max_upload_mb: pick(ov, bv, |s| s.max_upload_mb),
            cors_origins: pick(ov, bv, |s| s.cors_origins.clone()),
        }),
    }
}
