//! Local SQLite file behind the `sqlite` backend.
//!
//! Only `SqliteMemoryTable` reads or writes through these connections, and
//! only after `open_db`/`open_db_in_memory` have brought the `memories`
//! schema up to date.

mod error;
pub mod migrations;
mod open;

pub use error::{DbError, DbResult};
pub use open::{open_db, open_db_in_memory};
