use crate::{ConfigError, CoreError};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Hard upper bound on posts collected in one run, whatever the limit says.
pub const SAFETY_CAP: usize = 10_000;

// Replace these with real credentials from https://www.reddit.com/prefs/apps
pub const CLIENT_ID: &str = "PUT_YOUR_CLIENT_ID_HERE";
pub const CLIENT_SECRET: &str = "PUT_YOUR_CLIENT_SECRET_HERE";

const PLACEHOLDER_MARKER: &str = "PUT_YOUR";

pub const USER_AGENT: &str = "blueprint_research_analysis 1.0";
pub const DEFAULT_COMMUNITY: &str = "blueprint_";
pub const SETTINGS_FILE: &str = "harvest.toml";

#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Rejects empty values and the placeholders shipped in source.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                });
            }
            if value.contains(PLACEHOLDER_MARKER) {
                return Err(ConfigError::PlaceholderCredential {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(CLIENT_ID, CLIENT_SECRET)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Fixed courtesy pause every `every` records, on top of the client's own
/// rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    pub every: usize,
    pub pause: Duration,
}

impl PacingPolicy {
    pub fn courtesy() -> Self {
        Self {
            every: 50,
            pause: Duration::from_secs(1),
        }
    }

    pub fn is_checkpoint(&self, collected: usize) -> bool {
        self.every > 0 && collected > 0 && collected % self.every == 0
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::courtesy()
    }
}

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub credentials: Credentials,
    pub user_agent: String,
    pub community: String,
    pub limit: Option<usize>,
    pub output_dir: PathBuf,
    pub pacing: PacingPolicy,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            user_agent: USER_AGENT.to_string(),
            community: DEFAULT_COMMUNITY.to_string(),
            limit: None,
            output_dir: PathBuf::from("."),
            pacing: PacingPolicy::default(),
        }
    }
}

impl HarvestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.credentials.validate()?;

        if self.community.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "community".to_string(),
            });
        }
        if self.limit == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "limit".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Applies `harvest.toml`-style overrides if the file exists.
    pub fn with_settings_file(self, path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Ok(self);
        }
        tracing::info!("Loading collection settings from {}", path.display());
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
                path: path.display().to_string(),
                source,
            })?;
        let settings = SettingsFile::parse(&contents)?;
        Ok(self.with_settings(settings.collection))
    }

    pub fn with_settings(mut self, settings: CollectionSettings) -> Self {
        if let Some(community) = settings.community {
            self.community = community;
        }
        if settings.limit.is_some() {
            self.limit = settings.limit;
        }
        if let Some(output_dir) = settings.output_dir {
            self.output_dir = output_dir;
        }
        if let Some(every) = settings.progress_every {
            self.pacing.every = every;
        }
        if let Some(secs) = settings.pause_secs {
            self.pacing.pause = Duration::from_secs(secs);
        }
        self
    }
}

/// Layout of the optional settings file. Credentials are not accepted here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    #[serde(default)]
    pub collection: CollectionSettings,
}

impl SettingsFile {
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionSettings {
    pub community: Option<String>,
    pub limit: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub progress_every: Option<usize>,
    pub pause_secs: Option<u64>,
}
