use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::SamplerWrap;

/// Sampler edge behaviour as declared by the interchange document.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum WrapMode {
    #[default]
    Repeat,
    Mirror,
    Clamp,
    Border,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownWrapMode(pub String);

impl fmt::Display for UnknownWrapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown wrap mode '{}', expected one of REPEAT, MIRROR, CLAMP, BORDER, NONE",
            self.0
        )
    }
}

impl std::error::Error for UnknownWrapMode {}

impl FromStr for WrapMode {
    type Err = UnknownWrapMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            // the source toolchain spells repeat as WRAP
            "REPEAT" | "WRAP" => Ok(WrapMode::Repeat),
            "MIRROR" => Ok(WrapMode::Mirror),
            "CLAMP" => Ok(WrapMode::Clamp),
            "BORDER" => Ok(WrapMode::Border),
            "NONE" => Ok(WrapMode::None),
            _ => Err(UnknownWrapMode(s.to_string())),
        }
    }
}

impl fmt::Display for WrapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WrapMode::Repeat => "REPEAT",
            WrapMode::Mirror => "MIRROR",
            WrapMode::Clamp => "CLAMP",
            WrapMode::Border => "BORDER",
            WrapMode::None => "NONE",
        };
        f.write_str(name)
    }
}

impl WrapMode {
    /// Parses document text, falling back to `Repeat` for absent or unknown values.
    pub fn from_document_text(text: Option<&str>) -> Self {
        match text {
            Some(text) => text.parse().unwrap_or_else(|e| {
                log::warn!("{}, using REPEAT", e);
                WrapMode::Repeat
            }),
            None => WrapMode::Repeat,
        }
    }

    /// `None` for modes a GPU sampler has no equivalent for.
    pub fn sampler_wrap(self) -> Option<SamplerWrap> {
        match self {
            WrapMode::Repeat => Some(SamplerWrap::Repeat),
            WrapMode::Mirror => Some(SamplerWrap::MirroredRepeat),
            WrapMode::Clamp => Some(SamplerWrap::ClampToEdge),
            WrapMode::Border | WrapMode::None => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WrapPair {
    pub s: WrapMode,
    pub t: WrapMode,
}

impl WrapPair {
    pub fn new(s: WrapMode, t: WrapMode) -> Self {
        Self { s, t }
    }

    pub fn extends_x(&self) -> bool {
        self.s == WrapMode::Mirror
    }

    pub fn extends_y(&self) -> bool {
        self.t == WrapMode::Mirror
    }

    pub fn needs_mirroring(&self) -> bool {
        self.extends_x() || self.extends_y()
    }

    /// Numeric (wrapS, wrapT) a sampler must carry, unmapped modes becoming REPEAT.
    pub fn sampler_wraps(&self) -> (SamplerWrap, SamplerWrap) {
        (
            self.s.sampler_wrap().unwrap_or(SamplerWrap::Repeat),
            self.t.sampler_wrap().unwrap_or(SamplerWrap::Repeat),
        )
    }
}

impl fmt::Display for WrapPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.s, self.t)
    }
}
