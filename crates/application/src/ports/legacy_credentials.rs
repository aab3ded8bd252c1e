//! Legacy credential storage port

/// Durable storage where older builds left an access token behind.
///
/// Current builds never write to it; bootstrap only asks for it to be
/// emptied.
pub trait LegacyCredentials: Send + Sync {
    /// Removes any persisted token. Returns true if something was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage exists but could not be cleared.
    fn purge(&self) -> std::io::Result<bool>;
}
