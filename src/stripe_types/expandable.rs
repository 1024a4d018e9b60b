use serde::{Deserialize, Serialize};

/// Expandable field in Stripe API objects
/// Can be either an ID string or the full expanded object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(Box<T>),
}

impl<T: HasId> Expandable<T> {
    pub fn id(&self) -> &str {
        match self {
            Expandable::Id(id) => id,
            Expandable::Object(obj) => obj.id(),
        }
    }
}

/// Implemented by objects addressable by their Stripe identifier
pub trait HasId {
    fn id(&self) -> &str;
}
