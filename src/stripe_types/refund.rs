use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Refund {
    pub id: String,
    pub object: String,
    pub charge: Option<String>,
    pub amount: i64,
    pub status: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RefundList {
    pub object: String,
    pub data: Vec<Refund>,
    pub has_more: bool,
}
