use serde::{Deserialize, Serialize};

/// Device-code grant returned by the device authorization endpoint.
///
/// # Example
/// ```
/// use tubelink::auth::DeviceCodeGrant;
///
/// let grant: DeviceCodeGrant = serde_json::from_str(
///     r#"{"device_code":"dc","user_code":"ABC-DEF","verification_url":"https://www.google.com/device","expires_in":1800,"interval":5}"#,
/// )?;
/// assert_eq!(grant.user_code, "ABC-DEF");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCodeGrant {
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    /// Seconds until the device code expires, counted from issuance.
    pub expires_in: u64,
    /// Minimum seconds between token polls.
    pub interval: u64,
}
