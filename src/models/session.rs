use uuid::Uuid;

/// The authenticated seller a request acts as.
///
/// The access guard inserts it into request extensions after the session
/// token validates; handlers read it with `Extension<Principal>`. Nothing
/// else about the session lives on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    /// The ID of the authenticated seller.
    pub seller_id: Uuid,
}

impl Principal {
    pub fn new(seller_id: Uuid) -> Self {
        Self { seller_id }
    }
}
