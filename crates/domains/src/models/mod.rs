//! # Domain Models
//!
//! Row-shaped entities plus the small value types the services reason with.
//! Serialized field names are camelCase because the web client consumes
//! these structs directly.

mod activity;
mod list;
mod media;
mod paging;
mod profile;
mod ranking;
mod user;

pub use activity::*;
pub use list::*;
pub use media::*;
pub use paging::*;
pub use profile::*;
pub use ranking::*;
pub use user::*;
