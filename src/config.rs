//! Page configuration.
//!
//! One [`PageConfig`] describes everything the engine needs for a page: the
//! countdown target, which sections fade in, and the accordion contents. Pages
//! differ only by configuration.
//!
//! ```toml
//! title = "Techtonic 1.0"
//! target = "2024-09-26T12:40:00+05:30"
//!
//! [[sections]]
//! id = "countdown"
//!
//! [[faq]]
//! question = "Who can attend?"
//! answer = "Any 1st Year interested in robotics."
//! ```

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::disclosure::DisclosureEntry;
use crate::state::reveal::REVEAL_THRESHOLD;
use crate::types::{RegionId, TargetInstant};

/// 2024-09-26T07:10:00Z
const WORKSHOP_START_UNIX: i64 = 1_727_334_600;
/// +05:30
const WORKSHOP_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// A page section that fades in when scrolled into view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub id: RegionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
}

impl SectionConfig {
    pub fn new(id: &str, heading: Option<&str>) -> Self {
        Self {
            id: RegionId::from(id),
            heading: heading.map(str::to_string),
        }
    }
}

/// Configuration for one mounted page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub title: String,
    pub target: TargetInstant,
    #[serde(default = "default_reveal_threshold")]
    pub reveal_threshold: f64,
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
    #[serde(default)]
    pub faq: Vec<DisclosureEntry>,
    /// Installation guide sections, toggled by key.
    #[serde(default)]
    pub guide: Vec<DisclosureEntry>,
}

fn default_reveal_threshold() -> f64 {
    REVEAL_THRESHOLD
}

impl PageConfig {
    /// Parse and validate a TOML page config.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML page config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), sections = config.sections.len(), "loaded page config");
        Ok(config)
    }

    /// Reject duplicate section ids and duplicate disclosure keys.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for section in &self.sections {
            if !seen.insert(section.id.as_str()) {
                return Err(ConfigError::DuplicateSection(section.id.to_string()));
            }
        }

        for entries in [&self.faq, &self.guide] {
            let mut keys = HashSet::new();
            for key in entries.iter().filter_map(|entry| entry.key.as_deref()) {
                if !keys.insert(key) {
                    return Err(ConfigError::DuplicateKey(key.to_string()));
                }
            }
        }
        Ok(())
    }
}

impl Default for PageConfig {
    /// The workshop landing page.
    fn default() -> Self {
        Self {
            title: "Techtonic 1.0".to_string(),
            target: workshop_start(),
            reveal_threshold: REVEAL_THRESHOLD,
            sections: vec![
                SectionConfig::new("countdown", Some("Workshop Starts In:")),
                SectionConfig::new("topics", None),
                SectionConfig::new("benefits", Some("What You Get")),
                SectionConfig::new("register", Some("Ready to Join?")),
                SectionConfig::new("faq", None),
            ],
            faq: vec![
                DisclosureEntry::new(
                    "Who can attend?",
                    "Any 1st Year interested in robotics, regardless of experience level!",
                ),
                DisclosureEntry::new(
                    "Do I need to bring my own equipment?",
                    "Nope! We provide all necessary hardware and software. Just bring your laptop and charger.",
                ),
                DisclosureEntry::new(
                    "Are there any Pre-requisites?",
                    "No, the workshop will be totally beginner-friendly. However, we do expect you to download software beforehand, whose steps are given in the Installation Guide.",
                ),
                DisclosureEntry::new(
                    "How long are the workshops?",
                    "Each workshop is a full-day event, typically running from 9 AM to 5 PM.",
                ),
                DisclosureEntry::new(
                    "I am from CSE/IT branch. Can I attend?",
                    "Yes, the workshop is open for everyone irrespective of branch and programme.",
                ),
            ],
            guide: vec![
                DisclosureEntry::keyed(
                    "kicad",
                    "KiCad Installation",
                    "Visit the official KiCad website at https://www.kicad.org/download/\n\
                     Select your operating system (Windows, macOS, or Linux).\n\
                     Run the downloaded installer and follow the installation wizard.\n\
                     On first launch, click 'Start with default settings'.",
                ),
                DisclosureEntry::keyed(
                    "fusion360",
                    "Fusion 360 Installation",
                    "Navigate to https://www.autodesk.com/products/fusion-360/overview\n\
                     Sign in to your Autodesk account and choose a license type (Student, Hobbyist, or Start-up).\n\
                     Download and run the installer for your operating system.\n\
                     Launch Fusion 360 and complete the initial setup.",
                ),
            ],
        }
    }
}

fn workshop_start() -> TargetInstant {
    let utc = DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::seconds(WORKSHOP_START_UNIX);
    let offset = FixedOffset::east_opt(WORKSHOP_OFFSET_SECS).unwrap_or(Utc.fix());
    TargetInstant::new(utc.with_timezone(&offset))
}

// =============================================================================
// TESTS
// =============================================================================
