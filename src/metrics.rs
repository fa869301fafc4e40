use prometheus::{Encoder, GaugeVec, TextEncoder};
use std::sync::Mutex;
use toon_smartmeter_rs::channel::Channel;
use toon_smartmeter_rs::discovery::Discovery;
use toon_smartmeter_rs::{extract, Error, SmartMeter};

lazy_static! {
    static ref FLOW_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "smartmeter_flow",
            "instantaneous flow reported for a channel (Watt, l/m or m3)",
        ),
        &["channel", "unit"],
    )
    .unwrap();
    static ref COUNTER_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "smartmeter_counter",
            "cumulative quantity reported for a channel (kWh, m3 or GJ)",
        ),
        &["channel", "unit"],
    )
    .unwrap();
}

/// Refresh the device list (throttled) and feed every configured channel's
/// resolved value to the Prometheus registry. A channel with no value this
/// cycle keeps its previous gauge reading.
pub async fn collect(meter: &SmartMeter, channels: &[Channel], discovery: &Mutex<Discovery>) {
    meter.update().await;

    let devices = match meter.latest() {
        Some(devices) if !devices.is_empty() => devices,
        _ => {
            log::warn!("no device list available this cycle");
            return;
        }
    };

    let mut discovery = match discovery.lock() {
        Ok(guard) => guard,
        Err(_) => {
            log::trace!("Unable to lock discovery mutex, will refresh again");
            return;
        }
    };
    let table = discovery.table(&devices);

    for channel in channels {
        match extract::resolve(channel, &devices, table) {
            Some(value) => {
                let gauge: &GaugeVec = if channel.is_counter() {
                    &COUNTER_GAUGE
                } else {
                    &FLOW_GAUGE
                };
                let resource = channel.resource();
                gauge
                    .with_label_values(&[resource.as_str(), channel.unit()])
                    .set(value);
            }
            None => log::debug!("channel {} has no value this cycle", channel.resource()),
        }
    }
}

/// Read metrics from Prometheus exporter registry.
pub async fn read() -> Result<String, Error> {
    // Gather the metrics.
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).or(Err(Error::FormatError))
}
