//! Session state: the current credential and the identity it belongs to.
//!
//! [`SessionStore`] is the only writer. Guards, the navigation shell and the
//! request pipeline hold clones of the store handle and read snapshots through
//! [`SessionStore::current`].

pub mod storage;
pub mod store;

pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use store::{Credential, Identity, Session, SessionStore, TOKEN_KEY, USER_KEY};
