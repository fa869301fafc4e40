pub mod endpoint;
pub mod error;
pub mod response;

use crate::model::Gateway;
use crate::Error;
use response::DeviceList;

/// Fetch the raw device list body. Compression is declined so the body can
/// be decoded by hand; the adapter labels it text/javascript either way.
pub async fn fetch_devices_raw(
    client: &reqwest::Client,
    gateway: &Gateway,
) -> Result<String, Error> {
    let url = format!(
        "{}{}",
        endpoint::base_url(&gateway.host, gateway.port),
        endpoint::DEVICES
    );

    let response = client
        .get(&url)
        .header(reqwest::header::ACCEPT_ENCODING, "identity")
        .send()
        .await
        .map_err(|e| Error::TransportError(e.to_string()))?;

    log::debug!("response status from gateway: {}", response.status());

    response
        .text()
        .await
        .map_err(|e| Error::TransportError(e.to_string()))
}

/// Fetch and decode the device list, ignoring the declared content type.
pub async fn fetch_devices(
    client: &reqwest::Client,
    gateway: &Gateway,
) -> Result<DeviceList, Error> {
    let body = fetch_devices_raw(client, gateway).await?;

    log::trace!("body received from gateway: {}", body);

    serde_json::from_str(&body).map_err(|e| Error::DecodeError(e.to_string(), body))
}
