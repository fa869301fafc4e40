/// Network address of the meter adapter.
#[derive(Debug, Clone)]
pub struct Gateway {
    pub host: String,
    pub port: u16,
}

/// One refreshed output row: channel metadata plus the current value. The
/// value is absent whenever the channel is unresolvable this cycle.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChannelValue {
    pub resource: String,
    pub name: String,
    pub unit: &'static str,
    pub icon: &'static str,
    pub value: Option<f64>,
}
