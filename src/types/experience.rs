use crate::types::track::Track;
use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const FRAME_INDEX_PLACEHOLDER: &str = "{index}";
pub const SOURCE_REF_PLACEHOLDER: &str = "{ref}";

const CONFIG_FILE_NAME: &str = "experience.json";

/// Everything the presentation needs, supplied once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceConfig {
    pub frames: FrameSequenceConfig,
    pub playlist: Vec<Track>,
    pub playback: PlaybackConfig,
    pub visibility: VisibilityConfig,
    pub docking: DockingConfig,
    pub renderer: RendererConfig,
    /// Directory relative references are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSequenceConfig {
    /// Local path template; `{index}` becomes the 3-digit frame number.
    pub pattern: String,
    pub start: u32,
    /// Inclusive.
    pub end: u32,
}

impl Default for FrameSequenceConfig {
    fn default() -> Self {
        Self {
            pattern: "mainsequence/ezgif-frame-{index}.jpg".to_string(),
            start: 13,
            end: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Plain audio streams.
    AudioFile,
    /// Video containers played for their audio track only.
    HostedVideo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoplayPolicy {
    Allow,
    /// Automatic play requests are refused until the user has interacted once.
    RequireGesture,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolverConfig {
    Direct,
    Proxy { template: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub backend: BackendKind,
    pub volume: f64,
    pub auto_start: bool,
    pub autoplay: AutoplayPolicy,
    pub time_update_ms: u64,
    pub resolver: ResolverConfig,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::AudioFile,
            volume: 0.8,
            auto_start: false,
            autoplay: AutoplayPolicy::RequireGesture,
            time_update_ms: 250,
            resolver: ResolverConfig::Direct,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Fraction of the anchor that must be visible to count as intersecting.
    pub threshold: f32,
    /// Pixels shaved off the top of the viewport before intersecting.
    pub root_margin_top: f32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin_top: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockingRule {
    Directional,
    /// Floating whenever the anchor is out of view.
    Toggle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockingConfig {
    pub rule: DockingRule,
    pub settle_ticks: u32,
    pub dead_zone_px: f32,
}

impl Default for DockingConfig {
    fn default() -> Self {
        Self {
            rule: DockingRule::Directional,
            settle_ticks: 1,
            dead_zone_px: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub opacity: f32,
    pub texture_cache: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            opacity: 0.6,
            texture_cache: 16,
        }
    }
}

impl ExperienceConfig {
    /// Load and validate a config document from a JSON file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<ExperienceConfig> {
        let mut file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let mut json = String::new();
        file.read_to_string(&mut json)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: ExperienceConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Use `explicit` if given, otherwise the first candidate location that exists.
    pub fn locate(explicit: Option<PathBuf>) -> anyhow::Result<ExperienceConfig> {
        if let Some(path) = explicit {
            return Self::load_from_file(&path);
        }

        let mut candidates = Vec::new();
        if let Ok(current_dir) = env::current_dir() {
            candidates.push(current_dir.join(CONFIG_FILE_NAME));
            candidates.push(current_dir.join("config").join(CONFIG_FILE_NAME));
        }
        if let Ok(exe) = env::current_exe() {
            if let Some(dir) = exe.parent() {
                candidates.push(dir.join(CONFIG_FILE_NAME));
                candidates.push(dir.join("config").join(CONFIG_FILE_NAME));
            }
        }

        for path in candidates {
            if path.exists() {
                log::info!("using config {}", path.display());
                return Self::load_from_file(&path);
            }
        }

        let config = ExperienceConfig::default();
        config
            .validate()
            .context("No experience.json found and the built-in defaults have no playlist")?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.playlist.is_empty() {
            bail!("playlist must contain at least one track");
        }
        if !self.frames.pattern.contains(FRAME_INDEX_PLACEHOLDER) {
            bail!(
                "frame pattern {:?} has no {} placeholder",
                self.frames.pattern,
                FRAME_INDEX_PLACEHOLDER
            );
        }
        if self.frames.pattern.contains("://") {
            bail!(
                "frame pattern {:?} must be a local path; frames are decoded from disk",
                self.frames.pattern
            );
        }
        if self.frames.start > self.frames.end {
            bail!(
                "frame range {}..={} is empty",
                self.frames.start,
                self.frames.end
            );
        }
        if !(0.0..=1.0).contains(&self.visibility.threshold) {
            bail!("visibility threshold must be within [0, 1]");
        }
        if let ResolverConfig::Proxy { template } = &self.playback.resolver {
            if !template.contains(SOURCE_REF_PLACEHOLDER) {
                bail!("proxy template {template:?} has no {SOURCE_REF_PLACEHOLDER} placeholder");
            }
        }
        Ok(())
    }

    /// Frame pattern with relative paths anchored at the config directory.
    pub fn frame_pattern(&self) -> String {
        let pattern = &self.frames.pattern;
        if Path::new(pattern).is_absolute() {
            pattern.clone()
        } else {
            self.base_dir.join(pattern).to_string_lossy().into_owned()
        }
    }
}
