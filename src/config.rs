//! Runtime configuration, read once at start-up from `localStorage`.
//!
//! Example (set from the browser console, then reload):
//! `localStorage.setItem("quietwave.config", '{"processingEndpoint":"http://localhost:5000/process"}')`

use quietwave_core::spectrum::FftSize;
use quietwave_core::transport::DEFAULT_VOLUME;
use serde::Deserialize;

pub const STORAGE_KEY: &str = "quietwave.config";
pub const DEFAULT_EXPORT_SUFFIX: &str = "_denoised.wav";
pub const DEFAULT_SIMULATED_DELAY_MS: u32 = 2000;
pub const MAX_SIMULATED_DELAY_MS: u32 = 60_000;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// `None` uses the built-in simulated gateway.
    pub processing_endpoint: Option<String>,
    pub simulated_delay_ms: u32,
    pub fft_size: u32,
    pub default_volume: f64,
    pub export_suffix: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            processing_endpoint: None,
            simulated_delay_ms: DEFAULT_SIMULATED_DELAY_MS,
            fft_size: FftSize::default().get(),
            default_volume: DEFAULT_VOLUME,
            export_suffix: DEFAULT_EXPORT_SUFFIX.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn fft(&self) -> FftSize {
        FftSize::new(self.fft_size).unwrap_or_default()
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }

    /// Replace out-of-range fields with defaults. Returns one message per fix.
    fn sanitize(&mut self) -> Vec<String> {
        let defaults = AppConfig::default();
        let mut fixes = Vec::new();

        if self.simulated_delay_ms > MAX_SIMULATED_DELAY_MS {
            fixes.push(format!("simulatedDelayMs {} too long, using {MAX_SIMULATED_DELAY_MS}", self.simulated_delay_ms));
            self.simulated_delay_ms = MAX_SIMULATED_DELAY_MS;
        }
        if FftSize::new(self.fft_size).is_none() {
            fixes.push(format!("fftSize {} is not a power of two in 32..=32768, using {}", self.fft_size, defaults.fft_size));
            self.fft_size = defaults.fft_size;
        }
        if !(0.0..=1.0).contains(&self.default_volume) {
            let v = if self.default_volume.is_nan() { defaults.default_volume } else { self.default_volume.clamp(0.0, 1.0) };
            fixes.push(format!("defaultVolume {} out of range, using {v}", self.default_volume));
            self.default_volume = v;
        }
        if self.export_suffix.trim().is_empty() {
            fixes.push("exportSuffix is empty, using the default".to_string());
            self.export_suffix = defaults.export_suffix;
        }
        if self.log_level.parse::<log::Level>().is_err() {
            fixes.push(format!("unknown logLevel {:?}, using info", self.log_level));
            self.log_level = defaults.log_level;
        }
        if let Some(endpoint) = &self.processing_endpoint {
            if endpoint.trim().is_empty() {
                self.processing_endpoint = None;
            }
        }
        fixes
    }
}

/// Parse a stored config. Invalid JSON yields the defaults plus a warning.
pub fn parse(json: &str) -> (AppConfig, Vec<String>) {
    match serde_json::from_str::<AppConfig>(json) {
        Ok(mut cfg) => {
            let fixes = cfg.sanitize();
            (cfg, fixes)
        }
        Err(e) => (AppConfig::default(), vec![format!("ignoring stored config: {e}")]),
    }
}

/// Load from `localStorage`, falling back to defaults when storage is unavailable or empty.
pub fn load() -> (AppConfig, Vec<String>) {
    let stored = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item(STORAGE_KEY).ok().flatten());
    match stored {
        Some(json) => parse(&json),
        None => (AppConfig::default(), Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let (cfg, warnings) = parse("{}");
        assert_eq!(cfg, AppConfig::default());
        assert!(warnings.is_empty());
        assert_eq!(cfg.fft().bin_count(), 128);
        assert_eq!(cfg.log_level(), log::Level::Info);
    }

    #[test]
    fn test_camel_case_fields() {
        let (cfg, warnings) = parse(
            r#"{"processingEndpoint":"http://localhost:5000/process","simulatedDelayMs":10,
                "fftSize":1024,"defaultVolume":0.5,"exportSuffix":"_clean.wav","logLevel":"debug"}"#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(cfg.processing_endpoint.as_deref(), Some("http://localhost:5000/process"));
        assert_eq!(cfg.simulated_delay_ms, 10);
        assert_eq!(cfg.fft().bin_count(), 512);
        assert_eq!(cfg.default_volume, 0.5);
        assert_eq!(cfg.export_suffix, "_clean.wav");
        assert_eq!(cfg.log_level(), log::Level::Debug);
    }

    #[test]
    fn test_invalid_fields_are_sanitized() {
        let (cfg, warnings) = parse(
            r#"{"fftSize":300,"defaultVolume":3.0,"exportSuffix":"  ","logLevel":"loud","processingEndpoint":""}"#,
        );
        assert_eq!(warnings.len(), 4, "{warnings:?}");
        assert_eq!(cfg.fft_size, 256);
        assert_eq!(cfg.default_volume, 1.0);
        assert_eq!(cfg.export_suffix, DEFAULT_EXPORT_SUFFIX);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.processing_endpoint, None);
    }

    #[test]
    fn test_simulated_delay_is_capped() {
        let (cfg, warnings) = parse(r#"{"simulatedDelayMs":4294967295}"#);
        assert_eq!(warnings.len(), 1, "{warnings:?}");
        assert_eq!(cfg.simulated_delay_ms, MAX_SIMULATED_DELAY_MS);

        let (cfg, warnings) = parse(r#"{"simulatedDelayMs":60000}"#);
        assert!(warnings.is_empty());
        assert_eq!(cfg.simulated_delay_ms, 60_000);
    }

    #[test]
    fn test_garbage_falls_back() {
        let (cfg, warnings) = parse("not json");
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(warnings.len(), 1);
    }
}
