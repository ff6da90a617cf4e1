//! Per-session generation settings.

use serde::{Deserialize, Serialize};
use studio_inference::InvokeOptions;

use crate::constants::{defaults, limits};

/// Sampling settings for one studio session.
///
/// Setters clamp to the accepted ranges, so a value held here is always
/// valid to send.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: defaults::TEMPERATURE,
            max_tokens: defaults::MAX_TOKENS,
            top_p: defaults::TOP_P,
        }
    }
}

fn clamp_f32(value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

impl GenerationSettings {
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    pub fn set_temperature(&mut self, value: f32) -> f32 {
        self.temperature = clamp_f32(value, limits::TEMPERATURE, defaults::TEMPERATURE);
        self.temperature
    }

    pub fn set_max_tokens(&mut self, value: u32) -> u32 {
        let (min, max) = limits::MAX_TOKENS;
        self.max_tokens = value.clamp(min, max);
        self.max_tokens
    }

    pub fn set_top_p(&mut self, value: f32) -> f32 {
        self.top_p = clamp_f32(value, limits::TOP_P, defaults::TOP_P);
        self.top_p
    }

    /// Options for one completion call
    pub fn to_invoke_options(&self) -> InvokeOptions {
        InvokeOptions::default()
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
            .with_top_p(self.top_p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = GenerationSettings::default();
        assert_eq!(settings.temperature(), 0.7);
        assert_eq!(settings.max_tokens(), 1000);
        assert_eq!(settings.top_p(), 1.0);
    }

    #[test]
    fn test_setters_clamp() {
        let mut settings = GenerationSettings::default();
        assert_eq!(settings.set_temperature(1.5), 1.0);
        assert_eq!(settings.set_temperature(f32::NAN), 0.7);
        assert_eq!(settings.set_max_tokens(50), 100);
        assert_eq!(settings.set_max_tokens(5000), 2000);
        assert_eq!(settings.set_top_p(-0.2), 0.0);
    }

    #[test]
    fn test_invoke_options() {
        let mut settings = GenerationSettings::default();
        settings.set_max_tokens(500);

        let options = settings.to_invoke_options();
        assert_eq!(options.max_tokens, Some(500));
        assert_eq!(options.temperature, Some(0.7));
        assert_eq!(options.top_p, Some(1.0));
        assert!(options.model.is_none());
    }
}
