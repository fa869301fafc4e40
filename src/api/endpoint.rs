pub type Endpoint = str;

/* The meter adapter serves everything from the hdrv_zwave handler. */
pub const DEVICES: &Endpoint = "/hdrv_zwave?action=getDevices.json";

pub fn base_url(host: &str, port: u16) -> String {
    format!("http://{}:{}", host, port)
}
