mod config;
mod endpoint;
mod ephemeris;
mod report;
mod tracker;

use clap::Parser;
use std::process::ExitCode;
use tokio::sync::oneshot;

use crate::config::{ConfigError, RunConfig, Scalar, Settings};
use crate::endpoint::{RadioClient, RotorClient};
use crate::ephemeris::{Body, Ephemeris};
use crate::report::Report;
use crate::tracker::{
    BelowHorizon, Clock, PassMonitor, RadioChannel, RotorChannel, Tracker, TrackerConfig,
};

#[derive(Parser, Debug)]
#[command(name = "skytrack")]
#[command(about = "Solar system body tracker with rotor and radio control")]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Body to track (see --list-bodies)
    #[arg(long)]
    body: Option<String>,
    /// Observer latitude in degrees
    #[arg(long)]
    lat: Option<f64>,
    /// Observer longitude in degrees
    #[arg(long = "long")]
    longitude: Option<f64>,
    /// Observer altitude in meters
    #[arg(long)]
    altitude: Option<f64>,
    /// Right ascension of a fixed target: degrees or `9h48m58s`
    #[arg(long)]
    ra: Option<String>,
    /// Declination of a fixed target: degrees or `10d53m17s`
    #[arg(long)]
    dec: Option<String>,
    /// Rest frequency in Hz; enables the Doppler calculation
    #[arg(long)]
    freq: Option<f64>,
    /// Send the rest frequency unmodified
    #[arg(long)]
    no_doppler: bool,
    /// gqrx-compatible receiver at host[:port]
    #[arg(long)]
    radio: Option<String>,
    /// SDR# NetRemote receiver at host[:port]
    #[arg(long)]
    sdrsharp: Option<String>,
    /// Send AOS/LOS to the radio when crossing --aos-elevation
    #[arg(long)]
    send_aos_los: bool,
    /// AOS/LOS elevation boundary in degrees [default: 10]
    #[arg(long)]
    aos_elevation: Option<f64>,
    /// Time between updates: seconds or a duration like `1m` [default: 30]
    #[arg(long)]
    delay: Option<String>,
    /// hamlib rotor: <host>:<port> for rotctld, or a serial device for rotctl
    #[arg(long)]
    rotor: Option<String>,
    /// rotctl model number [default: 2]
    #[arg(long)]
    rotortype: Option<u32>,
    /// Serial rotor baud rate [default: 9600]
    #[arg(long)]
    rotorbaud: Option<u32>,
    /// Left azimuth limit in degrees (requires --rotorrightlimit)
    #[arg(long)]
    rotorleftlimit: Option<f64>,
    /// Right azimuth limit in degrees (requires --rotorleftlimit)
    #[arg(long)]
    rotorrightlimit: Option<f64>,
    /// Maximum elevation in degrees [default: 90]
    #[arg(long)]
    rotorelevationlimit: Option<f64>,
    /// Degrees added to the computed azimuth (e.g. magnetic declination)
    #[arg(long)]
    azcorrect: Option<f64>,
    /// Rotor behaviour while the target is below the horizon [default: clamp]
    #[arg(long, value_enum)]
    below_horizon: Option<BelowHorizon>,
    /// Per-command endpoint timeout [default: 2s]
    #[arg(long)]
    timeout: Option<String>,
    /// Use this UTC time instead of the clock: "YYYY/MM/DD hh:mm:ss" or RFC 3339
    #[arg(long)]
    utcdate: Option<String>,
    /// YAML file with the same settings; command-line flags take precedence
    #[arg(long)]
    config: Option<String>,
    /// List the bodies that can be tracked
    #[arg(long, visible_alias = "listbodies")]
    list_bodies: bool,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            body: self.body.clone(),
            lat: self.lat,
            long: self.longitude,
            altitude: self.altitude,
            ra: self.ra.as_deref().map(Scalar::from),
            dec: self.dec.as_deref().map(Scalar::from),
            freq: self.freq,
            no_doppler: self.no_doppler.then_some(true),
            radio: self.radio.clone(),
            sdrsharp: self.sdrsharp.clone(),
            send_aos_los: self.send_aos_los.then_some(true),
            aos_elevation: self.aos_elevation,
            delay: self.delay.as_deref().map(Scalar::from),
            rotor: self.rotor.clone(),
            rotortype: self.rotortype,
            rotorbaud: self.rotorbaud,
            rotorleftlimit: self.rotorleftlimit,
            rotorrightlimit: self.rotorrightlimit,
            rotorelevationlimit: self.rotorelevationlimit,
            azcorrect: self.azcorrect,
            below_horizon: self.below_horizon,
            timeout: self.timeout.as_deref().map(Scalar::from),
            utcdate: self.utcdate.clone(),
        }
    }

    fn load(&self) -> Result<RunConfig, ConfigError> {
        let file = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };
        file.merge(self.settings()).validate()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if cli.list_bodies {
        for name in Body::catalog_names() {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.rotor.is_none() && config.radio.is_none() {
        return report(&config);
    }

    track(config).await
}

fn report(config: &RunConfig) -> ExitCode {
    let timestamp = config.start.unwrap_or_else(chrono::Utc::now);
    match Report::compute(
        &Ephemeris::default(),
        &config.observer,
        &config.target,
        config.plan,
        timestamp,
    ) {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn track(config: RunConfig) -> ExitCode {
    let rotor = config.rotor.clone().map(|endpoint| {
        let client = RotorClient::new(endpoint, config.timeout);
        log::info!("Rotor endpoint: {}", client.endpoint());
        if let Some(range) = config.limits.azimuth() {
            log::info!(
                "Azimuth travel limited to {:.1}..{:.1}°",
                range.left_deg(),
                range.right_deg()
            );
        }
        log::info!("Elevation limited to {:.1}°", config.limits.elevation_max_deg());
        RotorChannel::new(client, config.limits, config.below_horizon)
    });
    let radio = match (&config.radio, config.plan) {
        (Some(endpoint), Some(plan)) => {
            let client =
                RadioClient::new(endpoint.protocol, endpoint.address.clone(), config.timeout);
            log::info!("Radio endpoint: {} ({})", endpoint.address, client.protocol());
            Some(RadioChannel::new(
                client,
                plan,
                config.aos_elevation_deg.map(PassMonitor::new),
            ))
        }
        _ => None,
    };

    let tracker_config = TrackerConfig {
        observer: config.observer,
        target: config.target,
        period: config.delay,
        clock: config.start.map_or(Clock::System, Clock::Fixed),
        azimuth_offset_deg: config.azimuth_offset_deg,
    };
    let mut tracker = Tracker::new(tracker_config, Ephemeris::default(), rotor, radio);

    let (stop_tx, stop_rx) = oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Cannot listen for Ctrl-C, tracking until killed: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Interrupted, stopping");
        let _ = stop_tx.send(());
    });

    match tracker.run(stop_rx).await {
        Ok(()) => {
            log::debug!("Tracker finished: {:?}", tracker.mode());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
