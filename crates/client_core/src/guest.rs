use chrono::Utc;
use uuid::Uuid;

pub const GUEST_EMAIL_DOMAIN: &str = "ruva.app";

/// Placeholder address for guests who leave the email blank. The random
/// suffix keeps two calls within the same millisecond apart.
pub fn synthesize_guest_email() -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!(
        "guest_{}_{}@{GUEST_EMAIL_DOMAIN}",
        Utc::now().timestamp_millis(),
        &nonce[..8]
    )
}
