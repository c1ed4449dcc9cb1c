//! Capture depth and the limits it selects.
//!
//! Depth is the single user-facing knob. It decides how much of each chat turn
//! is kept, how many turns survive, and the overall character budget for the
//! extracted main content.
//!
//! # Example
//!
//! ```rust
//! use contextprompt_core::CaptureDepth;
//!
//! let depth: CaptureDepth = "deep".parse().unwrap();
//! assert_eq!(depth.limits().max_messages, 30);
//! assert_eq!(depth.limits().content_budget, 150_000);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CaptureError;

/// How much text to retain from a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureDepth {
    Light,
    #[default]
    Standard,
    Deep,
}

/// Character and message limits for one depth setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthLimits {
    /// Characters kept per chat turn
    pub max_chars: usize,
    /// Most recent chat turns kept
    pub max_messages: usize,
    /// Characters kept of the main content
    pub content_budget: usize,
}

impl CaptureDepth {
    pub const ALL: [CaptureDepth; 3] = [CaptureDepth::Light, CaptureDepth::Standard, CaptureDepth::Deep];

    pub fn limits(self) -> DepthLimits {
        match self {
            CaptureDepth::Light => DepthLimits { max_chars: 500, max_messages: 10, content_budget: 15_000 },
            CaptureDepth::Standard => DepthLimits { max_chars: 1500, max_messages: 20, content_budget: 50_000 },
            CaptureDepth::Deep => DepthLimits { max_chars: 3000, max_messages: 30, content_budget: 150_000 },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CaptureDepth::Light => "light",
            CaptureDepth::Standard => "standard",
            CaptureDepth::Deep => "deep",
        }
    }
}

impl fmt::Display for CaptureDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptureDepth {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(CaptureDepth::Light),
            "standard" => Ok(CaptureDepth::Standard),
            "deep" => Ok(CaptureDepth::Deep),
            other => Err(CaptureError::ConfigError(format!("Unknown capture depth: {}", other))),
        }
    }
}
