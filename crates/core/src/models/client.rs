use serde::{Deserialize, Serialize};

/// A client of the fund. The roster is supplied externally (configuration)
/// and is fixed for the lifetime of a ledger.
///
/// **Equality** is based solely on `id`, so a renamed client is still the
/// same client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Stable identifier, used as the key of `movements_by_client`
    pub id: String,

    /// Display name
    pub name: String,
}

impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Client {}

impl Client {
    /// Create a client. The id is trimmed of surrounding whitespace.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into().trim().to_string(),
            name: name.into(),
        }
    }
}

/// Find a client in a roster by id.
pub fn find_client<'a>(roster: &'a [Client], id: &str) -> Option<&'a Client> {
    roster.iter().find(|c| c.id == id)
}
