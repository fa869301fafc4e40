pub mod api;
pub mod channel;
pub mod discovery;
pub mod extract;
pub mod model;

use api::response::DeviceList;
use channel::Channel;
use discovery::Discovery;
use model::{ChannelValue, Gateway};

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Minimum enforced interval between two network fetches.
pub const MIN_TIME_BETWEEN_UPDATES: Duration = Duration::from_secs(10);

/// Per-request timeout after which the fetch counts as a transport failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub enum Error {
    TransportError(String),
    DecodeError(String, String),
    FormatError,
    InternalError,
}

pub fn gateway(host: String, port: u16) -> Gateway {
    Gateway { host, port }
}

/// Throttle guard: remembers when the last fetch completed and refuses to
/// run another one before the minimum interval has elapsed.
pub struct Throttle {
    interval: Duration,
    /// Timestamp of the last completed fetch attempt.
    timestamp: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Throttle {
        Throttle {
            interval,
            timestamp: Mutex::new(None),
        }
    }

    /// Whether a new fetch may run now.
    pub fn ready(&self) -> bool {
        let elapsed_opt = self
            .timestamp
            .lock()
            .ok()
            .and_then(|a| a.map(|b| b.elapsed()));

        if let Some(elapsed) = elapsed_opt {
            elapsed >= self.interval
        } else {
            /* If there is None timestamp/elapsed, always return true to trigger action */
            true
        }
    }

    /// Records a completed fetch attempt.
    pub fn touch(&self) {
        if let Ok(mut ts) = self.timestamp.lock() {
            *ts = Some(Instant::now());
        } else {
            log::trace!("Unable to lock timestamp mutex, will refresh again")
        }
    }
}

/// Polling client for the meter adapter. One instance per gateway; the
/// cached snapshot is shared read-only by every channel inside an update
/// window, so at most one network round-trip happens per interval no matter
/// how many channels refresh.
pub struct SmartMeter {
    gateway: Gateway,
    client: reqwest::Client,
    throttle: Throttle,
    snapshot: Mutex<Option<DeviceList>>,
}

impl SmartMeter {
    pub fn new(gateway: Gateway) -> Result<SmartMeter, Error> {
        SmartMeter::with_interval(gateway, MIN_TIME_BETWEEN_UPDATES)
    }

    pub fn with_interval(gateway: Gateway, interval: Duration) -> Result<SmartMeter, Error> {
        let client = reqwest::ClientBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .or(Err(Error::InternalError))?;

        Ok(SmartMeter {
            gateway,
            client,
            throttle: Throttle::new(interval),
            snapshot: Mutex::new(None),
        })
    }

    /// Download a fresh device list, unless one was fetched within the
    /// minimum interval. Failures clear the snapshot and are logged only;
    /// the next scheduled cycle is the retry.
    pub async fn update(&self) {
        if !self.throttle.ready() {
            log::debug!("interval not yet elapsed; keeping cached device list");
            return;
        }

        let result = api::fetch_devices(&self.client, &self.gateway).await;
        self.throttle.touch();

        if let Ok(mut snapshot) = self.snapshot.lock() {
            match result {
                Ok(devices) => {
                    log::debug!("device list received from gateway");
                    *snapshot = Some(devices);
                }
                Err(e) => {
                    log::error!("cannot read device list from gateway: {:?}", e);
                    *snapshot = None;
                }
            }
        } else {
            log::trace!("Unable to lock snapshot mutex, will refresh again")
        }
    }

    /// The most recent successfully decoded device list, if any.
    pub fn latest(&self) -> Option<DeviceList> {
        self.snapshot.lock().ok().and_then(|s| s.clone())
    }

    /// Fresh raw dump of the device list, bypassing throttle and cache.
    /// Diagnostics only.
    pub async fn dump(&self) -> Result<String, Error> {
        api::fetch_devices_raw(&self.client, &self.gateway).await
    }
}

/// Resolve every requested channel against the current snapshot, producing
/// one output row per channel. Discovery runs here, on the first non-empty
/// snapshot seen.
pub fn channel_values(
    channels: &[Channel],
    devices: Option<&DeviceList>,
    discovery: &mut Discovery,
) -> Vec<ChannelValue> {
    let devices = devices.filter(|d| !d.is_empty());

    channels
        .iter()
        .map(|ch| {
            let value = devices.and_then(|d| extract::resolve(ch, d, discovery.table(d)));
            ChannelValue {
                resource: ch.resource(),
                name: ch.display_name(),
                unit: ch.unit(),
                icon: ch.icon(),
                value,
            }
        })
        .collect()
}
