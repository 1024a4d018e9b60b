use serde::{Deserialize, Serialize};

/// Stripe Terminal reader, returned by the process_payment_intent dispatch.
/// The hardware-side result is not observable here; the reader object only
/// confirms the dispatch was accepted.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Reader {
    pub id: String,
    pub object: String,
    pub device_type: Option<String>,
    pub label: Option<String>,
    pub status: Option<String>,
    pub action: Option<ReaderAction>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ReaderAction {
    #[serde(rename = "type")]
    pub action_type: String,
    pub status: Option<String>,
}
