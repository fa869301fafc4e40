use crate::api::response::{DeviceList, Field};
use crate::channel::Channel;
use std::collections::HashMap;

/// Channel-to-device-id table built by the discovery scan.
pub type DeviceTable = HashMap<Channel, String>;

/// One discovery rule: a meter role recognized by its type tags, guarded by
/// the quantity field that proves the device has reported real data.
struct Rule {
    types: &'static [&'static str],
    guard: Field,
    channels: &'static [Channel],
}

/* Rules are evaluated in this order for every record; when two rules claim
 * the same channel the later one wins. The type tag overlaps (HAE_METER_v3_5
 * low-tariff vs production-high, HAE_METER_v3_3 high-tariff vs solar,
 * HAE_METER_v2_8 water vs heat) are inherited from the adapter firmware
 * families and are resolved by exactly that ordering. */
static RULES: &[Rule] = &[
    Rule {
        types: &["gas", "HAE_METER_v2_1", "HAE_METER_v3_1", "HAE_METER_v4_1"],
        guard: Field::GasQuantity,
        channels: &[Channel::GasUsed, Channel::GasUsedCnt],
    },
    Rule {
        types: &["water", "HAE_METER_v2_8", "HAE_METER_v3_8", "HAE_METER_v4_8"],
        guard: Field::WaterQuantity,
        channels: &[Channel::WaterFlow, Channel::WaterQuantity],
    },
    Rule {
        types: &[
            "elec_delivered_lt",
            "HAE_METER_v2_5",
            "HAE_METER_v3_6",
            "HAE_METER_v3_5",
            "HAE_METER_v4_6",
        ],
        guard: Field::ElectricityQuantity,
        channels: &[Channel::ElecUsageFlowLow, Channel::ElecUsageCntLow],
    },
    Rule {
        types: &[
            "elec_delivered_nt",
            "HAE_METER_v2_3",
            "HAE_METER_v3_3",
            "HAE_METER_v3_4",
            "HAE_METER_v4_4",
        ],
        guard: Field::ElectricityQuantity,
        channels: &[Channel::ElecUsageFlowHigh, Channel::ElecUsageCntHigh],
    },
    Rule {
        types: &[
            "elec_received_lt",
            "HAE_METER_v2_6",
            "HAE_METER_v3_7",
            "HAE_METER_v4_7",
        ],
        guard: Field::ElectricityQuantity,
        channels: &[Channel::ElecProdFlowLow, Channel::ElecProdCntLow],
    },
    Rule {
        types: &[
            "elec_received_nt",
            "HAE_METER_v2_4",
            "HAE_METER_v3_5",
            "HAE_METER_v4_5",
        ],
        guard: Field::ElectricityQuantity,
        channels: &[Channel::ElecProdFlowHigh, Channel::ElecProdCntHigh],
    },
    Rule {
        types: &["solar", "HAE_METER_v3_3", "HAE_METER_v4_3"],
        guard: Field::ElectricityQuantity,
        channels: &[Channel::ElecSolar, Channel::ElecSolarCnt],
    },
    Rule {
        types: &["heat", "HAE_METER_v2_8"],
        guard: Field::HeatQuantity,
        channels: &[Channel::Heat],
    },
];

/// Run-once discovery lifecycle: Undiscovered until the first scan, then
/// Discovered for the rest of the session.
///
/// The table is computed from the first non-empty snapshot and never
/// refreshed, even if the gateway's device layout changes at runtime. A
/// device that disappears after discovery keeps its stale table entry until
/// the process restarts.
#[derive(Debug, Default)]
pub struct Discovery {
    table: Option<DeviceTable>,
}

impl Discovery {
    pub fn new() -> Discovery {
        Discovery { table: None }
    }

    pub fn has_run(&self) -> bool {
        self.table.is_some()
    }

    /// Returns the device table, scanning `devices` first if discovery has
    /// not run yet. The latch closes after the first scan no matter how many
    /// rules matched. Callers must not pass an empty snapshot.
    pub fn table(&mut self, devices: &DeviceList) -> &DeviceTable {
        let table = &mut self.table;
        table.get_or_insert_with(|| scan(devices))
    }
}

fn scan(devices: &DeviceList) -> DeviceTable {
    log::debug!("doing device discovery");

    let mut table = DeviceTable::new();
    for (id, record) in devices.iter() {
        let device_type = match &record.device_type {
            Some(t) => t.as_str(),
            None => continue,
        };

        for rule in RULES {
            if !rule.types.contains(&device_type) {
                continue;
            }

            /* A device that exists but has never reported reads "NaN" in its
             * quantity field; registering it would pin the channel to a dead
             * record for the whole session. */
            let reported = record
                .reading(rule.guard)
                .map(|r| !r.is_nan())
                .unwrap_or(false);
            if !reported {
                log::debug!("skipping {} ({}): no data reported yet", id, device_type);
                continue;
            }

            for channel in rule.channels {
                log::debug!("discovered {} -> {}", channel.resource(), id);
                table.insert(channel.clone(), id.to_owned());
            }
        }
    }
    table
}

#[cfg(test)]
mod test {
    use super::Discovery;
    use crate::api::response::DeviceList;
    use crate::channel::Channel;

    fn devices(json: &str) -> DeviceList {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn populates_both_channels_of_a_role() {
        let list = devices(
            r#"{"dev_2.1": {"type": "HAE_METER_v3_1", "CurrentGasFlow": "300", "CurrentGasQuantity": "5000"}}"#,
        );
        let mut discovery = Discovery::new();
        let table = discovery.table(&list);

        assert_eq!(Some(&"dev_2.1".to_string()), table.get(&Channel::GasUsed));
        assert_eq!(Some(&"dev_2.1".to_string()), table.get(&Channel::GasUsedCnt));
    }

    #[test]
    fn nan_guard_rejects_silent_devices() {
        let list = devices(
            r#"{"dev_2.1": {"type": "gas", "CurrentGasFlow": "300", "CurrentGasQuantity": "NaN"}}"#,
        );
        let mut discovery = Discovery::new();
        let table = discovery.table(&list);

        assert!(table.get(&Channel::GasUsed).is_none());
        assert!(table.get(&Channel::GasUsedCnt).is_none());
        assert!(discovery.has_run());
    }

    #[test]
    fn missing_guard_field_rejects_too() {
        let list = devices(r#"{"dev_2.1": {"type": "gas", "CurrentGasFlow": "300"}}"#);
        let mut discovery = Discovery::new();

        assert!(discovery.table(&list).is_empty());
    }

    #[test]
    fn runs_at_most_once_per_session() {
        let first = devices(
            r#"{"dev_2.5": {"type": "elec_delivered_lt", "CurrentElectricityQuantity": "100"}}"#,
        );
        let second = devices(
            r#"{"dev_9.5": {"type": "elec_delivered_lt", "CurrentElectricityQuantity": "200"}}"#,
        );

        let mut discovery = Discovery::new();
        discovery.table(&first);
        let table = discovery.table(&second).clone();

        /* Second snapshot has a different layout but the mapping stays the
         * one computed from the first. */
        assert_eq!(
            Some(&"dev_2.5".to_string()),
            table.get(&Channel::ElecUsageFlowLow)
        );
        assert!(table.get(&Channel::ElecUsageCntLow).is_some());
        assert!(!table.values().any(|id| id == "dev_9.5"));
    }

    #[test]
    fn overlapping_type_tag_feeds_both_roles() {
        /* HAE_METER_v3_3 is claimed by high-tariff usage and solar; both
         * roles end up pointing at the same record. */
        let list = devices(
            r#"{"dev_4.3": {"type": "HAE_METER_v3_3", "CurrentElectricityQuantity": "8000"}}"#,
        );
        let mut discovery = Discovery::new();
        let table = discovery.table(&list);

        assert_eq!(Some(&"dev_4.3".to_string()), table.get(&Channel::ElecUsageCntHigh));
        assert_eq!(Some(&"dev_4.3".to_string()), table.get(&Channel::ElecSolarCnt));
    }

    #[test]
    fn untyped_records_are_ignored() {
        let list = devices(r#"{"dev_1": {"CurrentGasQuantity": "5000"}}"#);
        let mut discovery = Discovery::new();

        assert!(discovery.table(&list).is_empty());
    }
}
