use crate::api::response::Field;

/// Logical sensor channels exposed by the meter adapter.
///
/// The fixed set mirrors the resources the adapter can serve through P1 or
/// pulse metering; the power-plug family is dynamic, one flow/counter pair
/// per configured plug name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    GasUsed,
    GasUsedCnt,
    ElecUsageFlowPulse,
    ElecUsageCntPulse,
    ElecUsageFlowLow,
    ElecUsageCntLow,
    ElecUsageFlowHigh,
    ElecUsageCntHigh,
    ElecProdFlowLow,
    ElecProdCntLow,
    ElecProdFlowHigh,
    ElecProdCntHigh,
    ElecSolar,
    ElecSolarCnt,
    Heat,
    WaterFlow,
    WaterQuantity,
    PowerPlugFlow(String),
    PowerPlugCnt(String),
}

/// Resource names of the fixed channel set, in configuration order.
pub const RESOURCES: &[&str] = &[
    "gasused",
    "gasusedcnt",
    "elecusageflowpulse",
    "elecusagecntpulse",
    "elecusageflowlow",
    "elecusagecntlow",
    "elecusageflowhigh",
    "elecusagecnthigh",
    "elecprodflowlow",
    "elecprodcntlow",
    "elecprodflowhigh",
    "elecprodcnthigh",
    "elecsolar",
    "elecsolarcnt",
    "heat",
    "waterflow",
    "waterquantity",
];

impl Channel {
    /// Parse a configured resource name. Matching is case-insensitive; plug
    /// channels are not resource names and never parse from here.
    pub fn from_resource(resource: &str) -> Option<Channel> {
        match resource.to_lowercase().as_str() {
            "gasused" => Some(Channel::GasUsed),
            "gasusedcnt" => Some(Channel::GasUsedCnt),
            "elecusageflowpulse" => Some(Channel::ElecUsageFlowPulse),
            "elecusagecntpulse" => Some(Channel::ElecUsageCntPulse),
            "elecusageflowlow" => Some(Channel::ElecUsageFlowLow),
            "elecusagecntlow" => Some(Channel::ElecUsageCntLow),
            "elecusageflowhigh" => Some(Channel::ElecUsageFlowHigh),
            "elecusagecnthigh" => Some(Channel::ElecUsageCntHigh),
            "elecprodflowlow" => Some(Channel::ElecProdFlowLow),
            "elecprodcntlow" => Some(Channel::ElecProdCntLow),
            "elecprodflowhigh" => Some(Channel::ElecProdFlowHigh),
            "elecprodcnthigh" => Some(Channel::ElecProdCntHigh),
            "elecsolar" => Some(Channel::ElecSolar),
            "elecsolarcnt" => Some(Channel::ElecSolarCnt),
            "heat" => Some(Channel::Heat),
            "waterflow" => Some(Channel::WaterFlow),
            "waterquantity" => Some(Channel::WaterQuantity),
            _ => None,
        }
    }

    pub fn resource(&self) -> String {
        match self {
            Channel::GasUsed => "gasused".to_string(),
            Channel::GasUsedCnt => "gasusedcnt".to_string(),
            Channel::ElecUsageFlowPulse => "elecusageflowpulse".to_string(),
            Channel::ElecUsageCntPulse => "elecusagecntpulse".to_string(),
            Channel::ElecUsageFlowLow => "elecusageflowlow".to_string(),
            Channel::ElecUsageCntLow => "elecusagecntlow".to_string(),
            Channel::ElecUsageFlowHigh => "elecusageflowhigh".to_string(),
            Channel::ElecUsageCntHigh => "elecusagecnthigh".to_string(),
            Channel::ElecProdFlowLow => "elecprodflowlow".to_string(),
            Channel::ElecProdCntLow => "elecprodcntlow".to_string(),
            Channel::ElecProdFlowHigh => "elecprodflowhigh".to_string(),
            Channel::ElecProdCntHigh => "elecprodcnthigh".to_string(),
            Channel::ElecSolar => "elecsolar".to_string(),
            Channel::ElecSolarCnt => "elecsolarcnt".to_string(),
            Channel::Heat => "heat".to_string(),
            Channel::WaterFlow => "waterflow".to_string(),
            Channel::WaterQuantity => "waterquantity".to_string(),
            Channel::PowerPlugFlow(plug) => format!("powerplugflow_{}", slug(plug)),
            Channel::PowerPlugCnt(plug) => format!("powerplugcnt_{}", slug(plug)),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Channel::GasUsed => "Gas Used Last Hour".to_string(),
            Channel::GasUsedCnt => "Gas Used Cnt".to_string(),
            Channel::ElecUsageFlowPulse => "Power Use".to_string(),
            Channel::ElecUsageCntPulse => "Power Use Cnt".to_string(),
            Channel::ElecUsageFlowLow => "P1 Power Use Low".to_string(),
            Channel::ElecUsageCntLow => "P1 Power Use Cnt Low".to_string(),
            Channel::ElecUsageFlowHigh => "P1 Power Use High".to_string(),
            Channel::ElecUsageCntHigh => "P1 Power Use Cnt High".to_string(),
            Channel::ElecProdFlowLow => "P1 Power Prod Low".to_string(),
            Channel::ElecProdCntLow => "P1 Power Prod Cnt Low".to_string(),
            Channel::ElecProdFlowHigh => "P1 Power Prod High".to_string(),
            Channel::ElecProdCntHigh => "P1 Power Prod Cnt High".to_string(),
            Channel::ElecSolar => "P1 Power Solar".to_string(),
            Channel::ElecSolarCnt => "P1 Power Solar Cnt".to_string(),
            Channel::Heat => "P1 Heat".to_string(),
            Channel::WaterFlow => "Water Flow".to_string(),
            Channel::WaterQuantity => "Water Quantity".to_string(),
            Channel::PowerPlugFlow(plug) => format!("Plug {} Power Use", plug),
            Channel::PowerPlugCnt(plug) => format!("Plug {} Power Use Cnt", plug),
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Channel::GasUsed | Channel::GasUsedCnt | Channel::WaterQuantity => "m3",
            Channel::ElecUsageFlowPulse
            | Channel::ElecUsageFlowLow
            | Channel::ElecUsageFlowHigh
            | Channel::ElecProdFlowLow
            | Channel::ElecProdFlowHigh
            | Channel::ElecSolar
            | Channel::PowerPlugFlow(_) => "Watt",
            Channel::ElecUsageCntPulse
            | Channel::ElecUsageCntLow
            | Channel::ElecUsageCntHigh
            | Channel::ElecProdCntLow
            | Channel::ElecProdCntHigh
            | Channel::ElecSolarCnt
            | Channel::PowerPlugCnt(_) => "kWh",
            Channel::Heat => "GJ",
            Channel::WaterFlow => "l/m",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Channel::GasUsed | Channel::GasUsedCnt | Channel::Heat => "mdi:fire",
            Channel::ElecSolar | Channel::ElecSolarCnt => "mdi:weather-sunny",
            Channel::WaterFlow => "mdi:water-pump",
            Channel::WaterQuantity => "mdi:water",
            _ => "mdi:flash",
        }
    }

    /// The record field this channel reads.
    pub fn field(&self) -> Field {
        match self {
            Channel::GasUsed => Field::GasFlow,
            Channel::GasUsedCnt => Field::GasQuantity,
            Channel::ElecUsageFlowPulse
            | Channel::ElecUsageFlowLow
            | Channel::ElecUsageFlowHigh
            | Channel::ElecProdFlowLow
            | Channel::ElecProdFlowHigh
            | Channel::ElecSolar
            | Channel::PowerPlugFlow(_) => Field::ElectricityFlow,
            Channel::ElecUsageCntPulse
            | Channel::ElecUsageCntLow
            | Channel::ElecUsageCntHigh
            | Channel::ElecProdCntLow
            | Channel::ElecProdCntHigh
            | Channel::ElecSolarCnt
            | Channel::PowerPlugCnt(_) => Field::ElectricityQuantity,
            Channel::Heat => Field::HeatQuantity,
            Channel::WaterFlow => Field::WaterFlow,
            Channel::WaterQuantity => Field::WaterQuantity,
        }
    }

    /// Wire-to-display scaling. Energy, gas and heat totals arrive in the
    /// small unit (Wh, liters) and divide by 1000; water and the
    /// instantaneous flows pass through unchanged. Gas "used last hour" is
    /// the one flow the adapter also reports in liters.
    pub fn divisor(&self) -> f64 {
        match self {
            Channel::GasUsed
            | Channel::GasUsedCnt
            | Channel::ElecUsageCntPulse
            | Channel::ElecUsageCntLow
            | Channel::ElecUsageCntHigh
            | Channel::ElecProdCntLow
            | Channel::ElecProdCntHigh
            | Channel::ElecSolarCnt
            | Channel::Heat
            | Channel::PowerPlugCnt(_) => 1000.0,
            _ => 1.0,
        }
    }

    /// Whether this channel reports a cumulative total rather than an
    /// instantaneous flow. Used to pick the exporter gauge.
    pub fn is_counter(&self) -> bool {
        match self {
            Channel::GasUsedCnt
            | Channel::ElecUsageCntPulse
            | Channel::ElecUsageCntLow
            | Channel::ElecUsageCntHigh
            | Channel::ElecProdCntLow
            | Channel::ElecProdCntHigh
            | Channel::ElecSolarCnt
            | Channel::Heat
            | Channel::WaterQuantity
            | Channel::PowerPlugCnt(_) => true,
            _ => false,
        }
    }
}

fn slug(plug: &str) -> String {
    plug.to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod test {
    use super::{Channel, RESOURCES};

    #[test]
    fn resources_round_trip() {
        for resource in RESOURCES {
            let channel = Channel::from_resource(resource).unwrap();
            assert_eq!(*resource, channel.resource());
        }
    }

    #[test]
    fn resource_parse_is_case_insensitive() {
        assert_eq!(
            Some(Channel::GasUsedCnt),
            Channel::from_resource("GasUsedCnt")
        );
        assert_eq!(None, Channel::from_resource("watermelon"));
    }

    #[test]
    fn counters_scale_flows_do_not() {
        assert_eq!(1000.0, Channel::ElecUsageCntLow.divisor());
        assert_eq!(1.0, Channel::ElecUsageFlowLow.divisor());
        /* gas "last hour" arrives in liters even though it is a flow */
        assert_eq!(1000.0, Channel::GasUsed.divisor());
        /* water passes through unconverted either way */
        assert_eq!(1.0, Channel::WaterQuantity.divisor());
        assert_eq!(1.0, Channel::WaterFlow.divisor());
    }

    #[test]
    fn plug_channels_carry_their_name() {
        let flow = Channel::PowerPlugFlow("Lamp".to_string());
        assert_eq!("powerplugflow_lamp", flow.resource());
        assert_eq!("Plug Lamp Power Use", flow.display_name());
        assert_eq!("Watt", flow.unit());
    }
}
