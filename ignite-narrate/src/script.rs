//! Narration scripts: the text and word sequence handed to the speech provider.
//!
//! Scripts are written as JSON next to (or mirrored from) their source content.
//! The content hash ties a script to the exact HTML it was derived from.

use crate::config::NarrateConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use narration_text::{CanonicalText, content_hash};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Current script format version.
pub const SCRIPT_VERSION: u32 = 1;

/// Suffix appended to a content file's full name for its script.
pub const SCRIPT_SUFFIX: &str = ".narration.json";

/// Speech options carried with each script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptOptions {
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
}

impl From<&NarrateConfig> for ScriptOptions {
    fn from(config: &NarrateConfig) -> Self {
        Self {
            voice_id: config.voice_id.clone(),
            model_id: config.model_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationScript {
    /// Format version for compatibility checking.
    pub version: u32,
    /// Content file this script was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Fingerprint of the source HTML.
    pub content_hash: String,
    /// Canonical text sent for synthesis.
    pub text: String,
    /// Word sequence; timestamps returned for `text` join on these indices.
    pub words: Vec<String>,
    pub word_count: usize,
    #[serde(flatten)]
    pub options: ScriptOptions,
    pub generated_at: DateTime<Utc>,
}

impl NarrationScript {
    /// Derive a script from HTML content.
    pub fn from_html(html: &str, source: Option<&Path>, options: ScriptOptions) -> Self {
        let text = CanonicalText::from_html(html);
        let words: Vec<String> = text.words().into_iter().map(str::to_string).collect();

        Self {
            version: SCRIPT_VERSION,
            source: source.map(Path::to_path_buf),
            content_hash: content_hash(html),
            word_count: words.len(),
            words,
            text: text.into_string(),
            options,
            generated_at: Utc::now(),
        }
    }

    /// Whether the content changed since this script was generated.
    pub fn is_stale(&self, html: &str) -> bool {
        self.version != SCRIPT_VERSION || self.content_hash != content_hash(html)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open script {}", path.display()))?;
        let script = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse script {}", path.display()))?;
        Ok(script)
    }

    pub fn save(&self, path: &Path, pretty: bool) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create script {}", path.display()))?;
        let writer = BufWriter::new(file);
        if pretty {
            serde_json::to_writer_pretty(writer, self).context("Failed to write script JSON")?;
        } else {
            serde_json::to_writer(writer, self).context("Failed to write script JSON")?;
        }
        Ok(())
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.context("Failed to serialize script")
    }
}

/// Where the script for `source` is written.
///
/// Without an output directory the script sits next to its source. With one,
/// the layout below `base` is mirrored into it. The source extension is kept in
/// the name so `lesson.html` and `lesson.htm` never share a script.
pub fn script_path(source: &Path, base: &Path, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) => {
            let relative = source
                .strip_prefix(base)
                .ok()
                .filter(|r| !r.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .or_else(|| source.file_name().map(PathBuf::from))
                .unwrap_or_else(|| source.to_path_buf());
            with_script_suffix(&dir.join(relative))
        }
        None => with_script_suffix(source),
    }
}

fn with_script_suffix(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(SCRIPT_SUFFIX);
    path.with_file_name(name)
}
