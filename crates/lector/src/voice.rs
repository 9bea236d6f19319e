//! Voice and model metadata tables.
//!
//! The generation layer treats a voice as an opaque identifier. These tables
//! exist so front ends can list, validate and describe the voices and model
//! variants a backend is expected to understand.

use core::{fmt, str::FromStr};

/// A named voice understood by the speech model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Voice {
    pub id: &'static str,
    pub name: &'static str,
}

/// Identifier of the voice used when none is configured.
pub const DEFAULT_VOICE: &str = "af_heart";

/// All known voices, in display order.
pub const VOICES: &[Voice] = &[
    Voice::new("af_heart", "Heart"),
    Voice::new("af_alloy", "Alloy"),
    Voice::new("af_aoede", "Aoede"),
    Voice::new("af_bella", "Bella"),
    Voice::new("af_jessica", "Jessica"),
    Voice::new("af_kore", "Kore"),
    Voice::new("af_nicole", "Nicole"),
    Voice::new("af_nova", "Nova"),
    Voice::new("af_river", "River"),
    Voice::new("af_sarah", "Sarah"),
    Voice::new("af_sky", "Sky"),
    Voice::new("am_adam", "Adam"),
    Voice::new("am_echo", "Echo"),
    Voice::new("am_eric", "Eric"),
    Voice::new("am_fenrir", "Fenrir"),
    Voice::new("am_liam", "Liam"),
    Voice::new("am_michael", "Michael"),
    Voice::new("am_onyx", "Onyx"),
    Voice::new("am_puck", "Puck"),
    Voice::new("am_santa", "Santa"),
    Voice::new("bf_alice", "Alice"),
    Voice::new("bf_emma", "Emma"),
    Voice::new("bf_isabella", "Isabella"),
    Voice::new("bf_lily", "Lily"),
    Voice::new("bm_daniel", "Daniel"),
    Voice::new("bm_fable", "Fable"),
    Voice::new("bm_george", "George"),
    Voice::new("bm_lewis", "Lewis"),
];

impl Voice {
    const fn new(id: &'static str, name: &'static str) -> Self {
        Self { id, name }
    }

    /// Looks up a voice by its exact identifier.
    pub fn find(id: &str) -> Option<&'static Voice> {
        VOICES.iter().find(|v| v.id == id)
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Returned when a model variant name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} `{}`", self.kind, self.value)
    }
}

impl core::error::Error for UnknownVariant {}

/// Numeric precision of the model weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dtype {
    Fp32,
    Fp16,
    #[default]
    Q8,
    Q4,
    Q4f16,
}

impl Dtype {
    pub const ALL: [Self; 5] = [Self::Fp32, Self::Fp16, Self::Q8, Self::Q4, Self::Q4f16];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fp32 => "fp32",
            Self::Fp16 => "fp16",
            Self::Q8 => "q8",
            Self::Q4 => "q4",
            Self::Q4f16 => "q4f16",
        }
    }

    /// Approximate download size of the model weights, in megabytes.
    pub const fn approx_size_mb(self) -> u32 {
        match self {
            Self::Fp32 => 326,
            Self::Fp16 => 163,
            Self::Q8 => 86,
            Self::Q4 => 305,
            Self::Q4f16 => 154,
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dtype {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant {
                kind: "dtype",
                value: s.to_owned(),
            })
    }
}

/// Execution device for the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Device {
    #[default]
    Cpu,
    Gpu,
}

impl Device {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Cpu, Self::Gpu]
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant {
                kind: "device",
                value: s.to_owned(),
            })
    }
}
