//! # Stored Records
//!
//! The contract a type satisfies to be served by a [`ResourceServer`](super::ResourceServer).

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A value the server stores and hands out by id.
///
/// # Normalisation
/// The server is authoritative for what gets stored. On every save it passes the incoming
/// record through [`normalize`](Record::normalize), which may rewrite fields (trim a name,
/// recompute a derived field) or refuse the record. Clients receive the normalised record
/// back, so an editable view always converges on what the server actually stored.
pub trait Record: Clone + Debug + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + Display + Debug + Send + Sync + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    fn id(&self) -> Self::Id;

    /// Server-side rewrite applied before a record is stored.
    ///
    /// `previous` is the stored version being replaced, if any.
    fn normalize(self, previous: Option<&Self>) -> Result<Self, Self::Error> {
        let _ = previous;
        Ok(self)
    }
}
