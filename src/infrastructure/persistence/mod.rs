//! Store implementations for the domain repository traits.
//!
//! # Repositories
//!
//! - [`MemoryLinkRepository`] - Process-local store, also used for drafts
//!   when records live remotely
//! - [`FileLinkRepository`] - `links.json` / `drafts.json` in a data directory
//! - [`RemoteLinkRepository`] - Remote shortening service over HTTP

mod file_link_repository;
mod link_table;
mod memory_link_repository;
mod remote_link_repository;

pub use file_link_repository::FileLinkRepository;
pub use memory_link_repository::MemoryLinkRepository;
pub use remote_link_repository::RemoteLinkRepository;
