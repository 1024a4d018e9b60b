use serde::{Deserialize, Serialize};

use crate::stripe_types::expandable::HasId;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Charge {
    pub id: String,
    pub object: String,
    pub amount: i64,
    pub currency: String,
    pub payment_intent: Option<String>,
}

impl HasId for Charge {
    fn id(&self) -> &str {
        &self.id
    }
}
