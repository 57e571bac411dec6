/*
 *  config.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Startup configuration: defaults, YAML file, CLI overrides
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::constants::*;
use crate::location::Location;
use crate::render::{rgb, ColorCorrection, Palette};

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level configuration as read from YAML; every field optional so layers merge.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub location: Option<LocationConfig>,
    pub strip: Option<StripConfig>,
    pub colors: Option<ColorConfig>,
    pub refresh: Option<RefreshConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StripConfig {
    pub length: Option<usize>,
    pub brightness: Option<u8>,       // 0-255, applied at emit
    pub correction: Option<ColorCorrection>,
    pub seconds_per_tick: Option<u64>,
    pub driver: Option<DriverKind>,
    pub wled: Option<WledConfig>,
    pub spi: Option<SpiConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WledConfig {
    pub address: Option<String>,      // "host" or "host:port"
    pub timeout_secs: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SpiConfig {
    pub bus: Option<u8>,              // /dev/spidev<bus>.0
    pub clock_hz: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ColorConfig {
    pub daylight: Option<[u8; 3]>,
    pub hour_marker: Option<[u8; 3]>,
    pub solstice: Option<[u8; 3]>,
    pub current_time: Option<[u8; 3]>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RefreshConfig {
    pub provider: Option<ProviderKind>,
    pub interval_hours: Option<u64>,
    pub fetch_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// ANSI truecolor preview on stdout
    #[default]
    Terminal,
    /// WLED realtime UDP
    Wled,
    /// WS2812 on the Raspberry Pi SPI bus
    Spi,
    /// Discard frames
    Null,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// api.sunrise-sunset.org
    #[default]
    Api,
    /// local NOAA computation
    Offline,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "sunstrip", version, about = "Sun position clock for addressable LED strips")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Shorthand for --log-level debug
    #[arg(short = 'v', long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<f64>,
    #[arg(long)]
    pub strip_length: Option<usize>,
    #[arg(long)]
    pub brightness: Option<u8>,
    #[arg(long, value_enum)]
    pub driver: Option<DriverKind>,
    #[arg(long)]
    pub wled_address: Option<String>,
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,
    /// render and emit a single frame, then exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub once: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Everything the binary needs, defaults filled in and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub log_level: String,
    pub location: Location,
    pub strip: StripSettings,
    pub palette: Palette,
    pub refresh: RefreshSettings,
    pub once: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StripSettings {
    pub length: usize,
    pub brightness: u8,
    pub correction: ColorCorrection,
    pub tick: Duration,
    pub driver: DriverKind,
    pub wled_address: Option<String>,
    pub wled_timeout_secs: u8,
    pub spi_bus: u8,
    pub spi_clock_hz: u32,
    /// Terminal preview redraws over the previous frame instead of appending
    pub redraw_in_place: bool,
}

impl Default for StripSettings {
    fn default() -> Self {
        Self {
            length: DEFAULT_STRIP_LENGTH,
            brightness: DEFAULT_BRIGHTNESS,
            correction: ColorCorrection::default(),
            tick: Duration::from_secs(DEFAULT_SECONDS_PER_TICK),
            driver: DriverKind::default(),
            wled_address: None,
            wled_timeout_secs: WLED_DEFAULT_TIMEOUT_SECS,
            spi_bus: 0,
            spi_clock_hz: WS2812_SPI_CLOCK_HZ,
            redraw_in_place: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSettings {
    pub provider: ProviderKind,
    pub interval: Duration,
    pub fetch_timeout: Duration,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Settings, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_layers(&cli)?;

    if cli.dump_config {
        println!("{}", dump_config(&cfg)?);
        std::process::exit(0);
    }

    resolve(&cfg, cli.once)
}

/// Pretty YAML of the effective config, only once it validates.
pub fn dump_config(cfg: &Config) -> Result<String, ConfigError> {
    resolve(cfg, false)?;
    Ok(serde_yaml::to_string(cfg)?)
}

/// Defaults, then YAML (explicit path or search), then CLI overrides.
pub fn load_layers(cli: &Cli) -> Result<Config, ConfigError> {
    let mut cfg = Config::default();

    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    apply_cli_overrides(&mut cfg, cli);
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/sunstrip/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/sunstrip/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/sunstrip.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["sunstrip.yaml", "config.yaml", "config/sunstrip.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

fn merge_option<T>(dst: &mut Option<T>, src: Option<T>, merge_fn: fn(&mut T, T)) {
    match (dst.as_mut(), src) {
        (None, Some(s)) => *dst = Some(s),
        (Some(d), Some(s)) => merge_fn(d, s),
        _ => {}
    }
}

/// Shallow merge `src` into `dst`, Option-by-Option.
pub fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    merge_option(&mut dst.location, src.location, merge_location);
    merge_option(&mut dst.strip, src.strip, merge_strip);
    merge_option(&mut dst.colors, src.colors, merge_colors);
    merge_option(&mut dst.refresh, src.refresh, merge_refresh);
}

fn merge_location(dst: &mut LocationConfig, src: LocationConfig) {
    if src.latitude.is_some()  { dst.latitude = src.latitude; }
    if src.longitude.is_some() { dst.longitude = src.longitude; }
}

fn merge_strip(dst: &mut StripConfig, src: StripConfig) {
    if src.length.is_some()           { dst.length = src.length; }
    if src.brightness.is_some()       { dst.brightness = src.brightness; }
    if src.correction.is_some()       { dst.correction = src.correction; }
    if src.seconds_per_tick.is_some() { dst.seconds_per_tick = src.seconds_per_tick; }
    if src.driver.is_some()           { dst.driver = src.driver; }
    merge_option(&mut dst.wled, src.wled, merge_wled);
    merge_option(&mut dst.spi, src.spi, merge_spi);
}

fn merge_wled(dst: &mut WledConfig, src: WledConfig) {
    if src.address.is_some()      { dst.address = src.address; }
    if src.timeout_secs.is_some() { dst.timeout_secs = src.timeout_secs; }
}

fn merge_spi(dst: &mut SpiConfig, src: SpiConfig) {
    if src.bus.is_some()      { dst.bus = src.bus; }
    if src.clock_hz.is_some() { dst.clock_hz = src.clock_hz; }
}

fn merge_colors(dst: &mut ColorConfig, src: ColorConfig) {
    if src.daylight.is_some()     { dst.daylight = src.daylight; }
    if src.hour_marker.is_some()  { dst.hour_marker = src.hour_marker; }
    if src.solstice.is_some()     { dst.solstice = src.solstice; }
    if src.current_time.is_some() { dst.current_time = src.current_time; }
}

fn merge_refresh(dst: &mut RefreshConfig, src: RefreshConfig) {
    if src.provider.is_some()           { dst.provider = src.provider; }
    if src.interval_hours.is_some()     { dst.interval_hours = src.interval_hours; }
    if src.fetch_timeout_secs.is_some() { dst.fetch_timeout_secs = src.fetch_timeout_secs; }
}

pub fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    if cli.debug               { cfg.log_level = Some("debug".to_string()); }

    if cli.latitude.is_some() || cli.longitude.is_some() {
        let location = cfg.location.get_or_insert_with(LocationConfig::default);
        if cli.latitude.is_some()  { location.latitude = cli.latitude; }
        if cli.longitude.is_some() { location.longitude = cli.longitude; }
    }

    let any_strip = cli.strip_length.is_some()
        || cli.brightness.is_some()
        || cli.driver.is_some()
        || cli.wled_address.is_some();
    if any_strip {
        let strip = cfg.strip.get_or_insert_with(StripConfig::default);
        if cli.strip_length.is_some() { strip.length = cli.strip_length; }
        if cli.brightness.is_some()   { strip.brightness = cli.brightness; }
        if cli.driver.is_some()       { strip.driver = cli.driver; }
        if cli.wled_address.is_some() {
            strip.wled.get_or_insert_with(WledConfig::default).address = cli.wled_address.clone();
        }
    }

    if cli.provider.is_some() {
        cfg.refresh.get_or_insert_with(RefreshConfig::default).provider = cli.provider;
    }
}

/// Fill defaults and check every invariant the runtime relies on.
pub fn resolve(cfg: &Config, once: bool) -> Result<Settings, ConfigError> {
    let loc = cfg.location.clone().unwrap_or_default();
    let location = Location::new(
        loc.latitude.unwrap_or(DEFAULT_LATITUDE),
        loc.longitude.unwrap_or(DEFAULT_LONGITUDE),
    )
    .map_err(|e| ConfigError::Validation(e.to_string()))?;

    let log_level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    // debug lines would land inside an in-place redraw
    let chatty = log_level.contains("debug") || log_level.contains("trace");

    let strip_cfg = cfg.strip.clone().unwrap_or_default();
    let wled = strip_cfg.wled.unwrap_or_default();
    let spi = strip_cfg.spi.unwrap_or_default();
    let defaults = StripSettings::default();
    let strip = StripSettings {
        length: strip_cfg.length.unwrap_or(defaults.length),
        brightness: strip_cfg.brightness.unwrap_or(defaults.brightness),
        correction: strip_cfg.correction.unwrap_or(defaults.correction),
        tick: strip_cfg.seconds_per_tick.map(Duration::from_secs).unwrap_or(defaults.tick),
        driver: strip_cfg.driver.unwrap_or(defaults.driver),
        wled_address: wled.address,
        wled_timeout_secs: wled.timeout_secs.unwrap_or(defaults.wled_timeout_secs),
        spi_bus: spi.bus.unwrap_or(defaults.spi_bus),
        spi_clock_hz: spi.clock_hz.unwrap_or(defaults.spi_clock_hz),
        redraw_in_place: !chatty,
    };

    let colors = cfg.colors.clone().unwrap_or_default();
    let palette = Palette {
        daylight: rgb(colors.daylight.unwrap_or(DAYLIGHT_RGB)),
        hour_marker: rgb(colors.hour_marker.unwrap_or(HOUR_MARKER_RGB)),
        solstice: rgb(colors.solstice.unwrap_or(SOLSTICE_RGB)),
        current_time: rgb(colors.current_time.unwrap_or(CURRENT_TIME_RGB)),
    };

    let refresh_cfg = cfg.refresh.clone().unwrap_or_default();
    let interval_hours = refresh_cfg.interval_hours.unwrap_or(DEFAULT_REFRESH_INTERVAL_HOURS);
    let timeout_secs = refresh_cfg.fetch_timeout_secs.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
    if interval_hours == 0 {
        return Err(ConfigError::Validation("refresh interval_hours must be >= 1".into()));
    }
    if timeout_secs == 0 {
        return Err(ConfigError::Validation("refresh fetch_timeout_secs must be >= 1".into()));
    }
    let refresh = RefreshSettings {
        provider: refresh_cfg.provider.unwrap_or_default(),
        interval: Duration::from_secs(interval_hours * 3600),
        fetch_timeout: Duration::from_secs(timeout_secs),
    };

    let settings = Settings {
        log_level,
        location,
        strip,
        palette,
        refresh,
        once,
    };
    validate(&settings)?;
    Ok(settings)
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(settings: &Settings) -> Result<(), ConfigError> {
    let strip = &settings.strip;
    if strip.length == 0 || strip.length > SECONDS_PER_DAY as usize {
        return Err(ConfigError::Validation(format!(
            "strip length must be 1..={}, got {}",
            SECONDS_PER_DAY, strip.length
        )));
    }
    if strip.tick.is_zero() {
        return Err(ConfigError::Validation("strip seconds_per_tick must be >= 1".into()));
    }
    if strip.driver == DriverKind::Wled
        && strip.wled_address.as_deref().is_none_or(|a| a.trim().is_empty())
    {
        return Err(ConfigError::Validation("wled driver needs strip.wled.address".into()));
    }
    if strip.driver == DriverKind::Spi
        && !(WS2812_SPI_CLOCK_MIN_HZ..=WS2812_SPI_CLOCK_MAX_HZ).contains(&strip.spi_clock_hz)
    {
        return Err(ConfigError::Validation(format!(
            "strip spi clock_hz must be {}..={} for WS2812, got {}",
            WS2812_SPI_CLOCK_MIN_HZ, WS2812_SPI_CLOCK_MAX_HZ, strip.spi_clock_hz
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smart_leds::RGB8;

    const SAMPLE: &str = r#"
log_level: debug
location:
  latitude: 40.7128
  longitude: -74.006
strip:
  length: 144
  brightness: 64
  correction: none
  driver: wled
  wled:
    address: "192.168.1.50"
colors:
  daylight: [0, 0, 16]
refresh:
  provider: offline
  interval_hours: 12
"#;

    #[test]
    fn test_defaults_resolve() {
        let settings = resolve(&Config::default(), false).unwrap();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.location, Location::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE).unwrap());
        assert_eq!(settings.strip, StripSettings::default());
        assert_eq!(settings.palette, Palette::default());
        assert_eq!(settings.refresh.provider, ProviderKind::Api);
        assert_eq!(settings.refresh.interval, Duration::from_secs(24 * 3600));
        assert_eq!(settings.refresh.fetch_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_yaml_parses_and_resolves() {
        let cfg = parse_yaml(SAMPLE).unwrap();
        let settings = resolve(&cfg, true).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.location.latitude, 40.7128);
        assert_eq!(settings.strip.length, 144);
        assert_eq!(settings.strip.brightness, 64);
        assert_eq!(settings.strip.correction, ColorCorrection::Uncorrected);
        assert!(!settings.strip.redraw_in_place);
        assert_eq!(settings.strip.driver, DriverKind::Wled);
        assert_eq!(settings.strip.wled_address.as_deref(), Some("192.168.1.50"));
        assert_eq!(settings.palette.daylight, RGB8::new(0, 0, 16));
        assert_eq!(settings.palette.solstice, rgb(SOLSTICE_RGB));
        assert_eq!(settings.refresh.provider, ProviderKind::Offline);
        assert_eq!(settings.refresh.interval, Duration::from_secs(12 * 3600));
        assert!(settings.once);
    }

    #[test]
    fn test_unknown_driver_rejected() {
        let err = parse_yaml("strip:\n  driver: neopixel\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_merge_is_field_by_field() {
        let mut base = parse_yaml(SAMPLE).unwrap();
        let over = parse_yaml("strip:\n  brightness: 10\n").unwrap();
        merge(&mut base, over);
        let strip = base.strip.unwrap();
        assert_eq!(strip.brightness, Some(10));
        assert_eq!(strip.length, Some(144));
        assert_eq!(strip.wled.unwrap().address.as_deref(), Some("192.168.1.50"));
    }

    #[test]
    fn test_cli_overrides_yaml() {
        let mut cfg = parse_yaml(SAMPLE).unwrap();
        let cli = Cli {
            debug: false,
            log_level: Some("warn".into()),
            latitude: Some(-33.86),
            driver: Some(DriverKind::Null),
            provider: Some(ProviderKind::Api),
            ..Default::default()
        };
        apply_cli_overrides(&mut cfg, &cli);
        let settings = resolve(&cfg, false).unwrap();
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.location.latitude, -33.86);
        assert_eq!(settings.location.longitude, -74.006);
        assert_eq!(settings.strip.driver, DriverKind::Null);
        assert_eq!(settings.refresh.provider, ProviderKind::Api);
    }

    #[test]
    fn test_debug_flag_wins() {
        let mut cfg = Config::default();
        let cli = Cli { debug: true, log_level: Some("warn".into()), ..Default::default() };
        apply_cli_overrides(&mut cfg, &cli);
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_validation_failures() {
        let cases = [
            "strip:\n  length: 0\n",
            "strip:\n  length: 86401\n",
            "strip:\n  seconds_per_tick: 0\n",
            "strip:\n  driver: wled\n",
            "strip:\n  driver: spi\n  spi:\n    clock_hz: 0\n",
            "strip:\n  driver: spi\n  spi:\n    clock_hz: 8000000\n",
            "location:\n  latitude: 91.0\n",
            "location:\n  longitude: -180.5\n",
            "refresh:\n  interval_hours: 0\n",
            "refresh:\n  fetch_timeout_secs: 0\n",
        ];
        for yaml in cases {
            let cfg = parse_yaml(yaml).unwrap();
            assert!(
                matches!(resolve(&cfg, false), Err(ConfigError::Validation(_))),
                "accepted: {yaml}"
            );
        }
    }

    #[test]
    fn test_correction_defaults_to_typical() {
        let settings = resolve(&Config::default(), false).unwrap();
        assert_eq!(settings.strip.correction, ColorCorrection::Typical);
        let err = parse_yaml("strip:\n  correction: warm\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_debug_logging_stops_in_place_redraw() {
        assert!(resolve(&Config::default(), false).unwrap().strip.redraw_in_place);
        let mut cfg = Config::default();
        apply_cli_overrides(&mut cfg, &Cli { debug: true, ..Default::default() });
        assert!(!resolve(&cfg, false).unwrap().strip.redraw_in_place);
    }

    #[test]
    fn test_dump_config_validates_first() {
        let bad = parse_yaml("strip:\n  length: 0\n").unwrap();
        assert!(matches!(dump_config(&bad), Err(ConfigError::Validation(_))));

        let dumped = dump_config(&parse_yaml(SAMPLE).unwrap()).unwrap();
        assert!(dumped.contains("length: 144"));
        assert!(dumped.contains("correction: none"));
    }

    #[test]
    fn test_strip_length_bounds_accepted() {
        for yaml in ["strip:\n  length: 1\n", "strip:\n  length: 86400\n"] {
            assert!(resolve(&parse_yaml(yaml).unwrap(), false).is_ok());
        }
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/sunstrip.yaml")),
            ..Default::default()
        };
        assert!(matches!(load_layers(&cli), Err(ConfigError::Validation(_))));
    }
}
