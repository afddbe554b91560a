use std::str::FromStr;

use crate::foundation::error::{PlumeError, PlumeResult};

/// An easing function maps normalized progress in `[0, 1]` to eased progress.
/// Not every variant is monotonic (`Volatile`, `Random`) or bounded by its
/// input (`None` holds a fixed value).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    Linear,
    EaseIn,
    EaseOut,
    /// Symmetric power curve; `2.0` gives the classic smooth-both-ends shape.
    EaseBoth(f64),
    /// Comb filter: mostly zero with narrow pass-through spikes.
    Volatile,
    /// Uniform sample per evaluation, drawn from the particle's seeded stream.
    Random,
    /// Constant eased progress regardless of input.
    None(f64),
}

impl Default for Ease {
    fn default() -> Self {
        Self::Linear
    }
}

impl Ease {
    pub fn apply(self, t: f64, noise: &mut EaseNoise) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => (t * std::f64::consts::FRAC_PI_2).sin(),
            Self::EaseOut => 1.0 - ((1.0 - t) * std::f64::consts::FRAC_PI_2).sin(),
            Self::EaseBoth(power) => {
                let dist = ((0.5 - (0.5 - t).abs()) / 0.5).powf(power) * 0.5;
                if t < 0.5 { dist } else { 1.0 - dist }
            }
            Self::Volatile => {
                if t % 0.01 > 0.005 {
                    0.0
                } else {
                    t
                }
            }
            Self::Random => noise.next_f64(),
            Self::None(value) => value,
        }
    }

    /// Resolve a named easing with optional arguments. Unknown names are a
    /// configuration error, never a silent fallback.
    pub fn from_name(name: &str, args: &[f64]) -> PlumeResult<Self> {
        let ease = match name.trim() {
            "linear" => Self::Linear,
            "easeIn" | "ease_in" => Self::EaseIn,
            "easeOut" | "ease_out" => Self::EaseOut,
            "easeBoth" | "ease_both" => Self::EaseBoth(args.first().copied().unwrap_or(2.0)),
            "volatile" => Self::Volatile,
            "random" => Self::Random,
            "none" => Self::None(args.first().copied().unwrap_or(0.0)),
            other => {
                return Err(PlumeError::config(format!("unknown easing '{other}'")));
            }
        };
        Ok(ease)
    }
}

impl FromStr for Ease {
    type Err = PlumeError;

    fn from_str(s: &str) -> PlumeResult<Self> {
        Self::from_name(s, &[])
    }
}

/// Deterministic per-particle sample stream (SplitMix64). `Random` easing
/// draws from this, so a fixed seed reproduces a run exactly.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct EaseNoise {
    state: u64,
}

impl EaseNoise {
    pub fn seeded(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next uniform sample in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }
}
