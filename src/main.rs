/*
 *  main.rs
 *
 *  SunStrip - the sun, one LED at a time
 *  (c) 2020-26 Stuart Hunter
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

use std::time::Instant;

use anyhow::{Context, Result};
use env_logger::Env;
use log::{error, info, warn};
use tokio::signal::unix::{signal, SignalKind};

use sunstrip::clock::LocalClock;
use sunstrip::config;
use sunstrip::markers::{SolsticeMarkerSet, SolsticeTimes};
use sunstrip::providers::Provider;
use sunstrip::render::FrameRenderer;
use sunstrip::solar::SolarDataProvider;
use sunstrip::strip::StripDriverFactory;
use sunstrip::sunclock::{SunClock, SunClockOptions};
use sunstrip::timemap::StripGeometry;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM or SIGHUP and logs which one arrived.
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let settings = config::load().context("loading configuration")?;

    env_logger::Builder::from_env(Env::default().default_filter_or(settings.log_level.as_str()))
        .format_timestamp_secs()
        .init();

    info!("This {} follows the sun", env!("CARGO_PKG_NAME"));
    info!("v.{} built {} ({})", env!("CARGO_PKG_VERSION"), BUILD_DATE, BUILD_PROFILE);
    info!("Location {}", settings.location);

    let geometry = StripGeometry::new(settings.strip.length).context("strip geometry")?;
    info!(
        "{} LEDs, {} seconds per LED",
        geometry.led_count(),
        geometry.seconds_per_led()
    );

    let solstices = SolsticeTimes::reference().context("solstice reference times")?;
    solstices.log_summary();
    let markers = SolsticeMarkerSet::new(&geometry, &solstices);

    let provider = Provider::from_kind(settings.refresh.provider, settings.refresh.fetch_timeout)
        .context("building solar data provider")?;
    info!(
        "Solar data from {}, refreshed every {}h",
        provider.name(),
        settings.refresh.interval.as_secs() / 3600
    );

    let driver = StripDriverFactory::create_from_settings(&settings.strip)
        .context("starting strip driver")?;

    let mut sun_clock = SunClock::new(
        FrameRenderer::new(geometry, settings.palette),
        markers,
        provider,
        LocalClock,
        driver,
        settings.location,
        SunClockOptions {
            tick: settings.strip.tick,
            brightness: settings.strip.brightness,
            correction: settings.strip.correction,
            refresh_interval: settings.refresh.interval,
        },
    );

    if settings.once {
        sun_clock.tick(Instant::now()).await;
        return Ok(());
    }

    tokio::select! {
        res = signal_handler() => {
            if let Err(e) = res {
                error!("Signal handler setup failed: {}", e);
            }
        }
        _ = sun_clock.run() => {}
    }

    if let Err(e) = sun_clock.blank() {
        warn!("Could not blank the strip on shutdown: {}", e);
    }
    info!("Shutdown complete");
    Ok(())
}
