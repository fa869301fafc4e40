use crate::api::response::{DeviceList, DeviceRecord};
use crate::channel::Channel;
use crate::discovery::DeviceTable;

/// Well-known device ids for meters read through the pulse counter, in
/// lookup priority order.
const PULSE_DEVICE_IDS: &[&str] = &["dev_3.2", "dev_2.2", "dev_4.2", "dev_7.2", "dev_9.2"];

/// Well-known device ids for solar production exports. The discovery table
/// is the fallback when none of these is present in the snapshot.
const SOLAR_DEVICE_IDS: &[&str] = &[
    "dev_4.export",
    "dev_3.export",
    "dev_7.export",
    "dev_14.export",
];

/// Resolve the current numeric value of `channel` against `devices`.
///
/// Missing devices, missing fields and unparsable readings all resolve to
/// `None` for this channel only; a reading of "NaN" resolves to `0`. Nothing
/// here ever errors.
pub fn resolve(channel: &Channel, devices: &DeviceList, table: &DeviceTable) -> Option<f64> {
    if devices.is_empty() {
        return None;
    }

    let record = match channel {
        Channel::ElecUsageFlowPulse | Channel::ElecUsageCntPulse => {
            first_present(devices, PULSE_DEVICE_IDS)?
        }
        Channel::ElecSolar | Channel::ElecSolarCnt => first_present(devices, SOLAR_DEVICE_IDS)
            .or_else(|| table.get(channel).and_then(|id| devices.get(id)))?,
        /* Plugs are matched on their human-readable name, fresh on every
         * update; they never go through the discovery table. */
        Channel::PowerPlugFlow(plug) | Channel::PowerPlugCnt(plug) => {
            by_plug_name(devices, plug)?
        }
        _ => devices.get(table.get(channel)?)?,
    };

    let value = record.reading(channel.field())?.value()?;
    Some(value / channel.divisor())
}

fn first_present<'a>(devices: &'a DeviceList, ids: &[&str]) -> Option<&'a DeviceRecord> {
    ids.iter().find_map(|&id| devices.get(id))
}

fn by_plug_name<'a>(devices: &'a DeviceList, plug: &str) -> Option<&'a DeviceRecord> {
    devices
        .iter()
        .map(|(_, record)| record)
        .find(|record| record.name.as_deref() == Some(plug))
}
