#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate rocket;

use config::Config;
use rocket::{Build, Rocket, State};
use std::sync::Mutex;
use std::time::Duration;
use toon_smartmeter_rs::channel::{self, Channel};
use toon_smartmeter_rs::discovery::Discovery;
use toon_smartmeter_rs::{channel_values, Error, SmartMeter};

mod metrics;

#[derive(Clone, serde::Deserialize)]
pub struct SmartMeterConfig {
    host: String,
    port: u16,
    interval: u64,
    resources: String,
    plugs: String,
}

/// Structure containing state for API handlers.
pub struct StateData {
    meter: SmartMeter,
    channels: Vec<Channel>,
    /// Run-once channel discovery; lives for the whole polling session.
    discovery: Mutex<Discovery>,
}

pub fn read_settings() -> SmartMeterConfig {
    let mut settings = Config::default();
    settings
        .merge(config::Environment::with_prefix("TOON"))
        .unwrap()
        .set_default("port", 80)
        .unwrap()
        .set_default("interval", 10)
        .unwrap()
        .set_default("resources", channel::RESOURCES.join(","))
        .unwrap()
        .set_default("plugs", "")
        .unwrap();

    settings.try_into().expect("Configuration error")
}

/// Parse the configured resource and plug lists into channel identities.
/// Unknown resource names are dropped with a warning.
fn configured_channels(resources: &str, plugs: &str) -> Vec<Channel> {
    let mut channels = Vec::new();

    for resource in resources.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match Channel::from_resource(resource) {
            Some(channel) => channels.push(channel),
            None => log::warn!("unknown resource in configuration: {}", resource),
        }
    }

    for plug in plugs.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        channels.push(Channel::PowerPlugFlow(plug.to_string()));
        channels.push(Channel::PowerPlugCnt(plug.to_string()));
    }

    channels
}

#[get("/metrics")]
async fn metrics_route(state: &State<StateData>) -> Result<String, Error> {
    metrics::collect(&state.meter, &state.channels, &state.discovery).await;
    metrics::read().await
}

#[get("/channels")]
async fn channels_route(state: &State<StateData>) -> Result<String, Error> {
    state.meter.update().await;
    let devices = state.meter.latest();

    let mut discovery = state.discovery.lock().or(Err(Error::InternalError))?;
    let rows = channel_values(&state.channels, devices.as_ref(), &mut discovery);

    serde_json::to_string_pretty(&rows).or(Err(Error::FormatError))
}

#[get("/devices")]
async fn devices_route(state: &State<StateData>) -> Result<String, Error> {
    let body = state.meter.dump().await?;

    /* Pretty-print when the body is valid JSON, pass it through otherwise so
     * a broken adapter can still be inspected. */
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => serde_json::to_string_pretty(&value).or(Err(Error::FormatError)),
        Err(_) => Ok(body),
    }
}

#[launch]
fn rocket() -> Rocket<Build> {
    env_logger::init();

    let settings = read_settings();
    let gateway = toon_smartmeter_rs::gateway(settings.host, settings.port);
    let meter = SmartMeter::with_interval(gateway, Duration::from_secs(settings.interval))
        .expect("HTTP client error");
    let channels = configured_channels(&settings.resources, &settings.plugs);

    let state = StateData {
        meter,
        channels,
        discovery: Mutex::new(Discovery::new()),
    };

    rocket::build()
        .manage(state)
        .mount("/", routes![metrics_route, channels_route, devices_route])
}
