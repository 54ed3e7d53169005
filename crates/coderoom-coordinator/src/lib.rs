//! Session coordinator for shared code rooms.
//!
//! Tracks which connection sits in which session, keeps the per-session
//! roster and last-known state, and fans mutations out to exactly the right
//! peers.
//!
//! ```text
//! transport ──connect/join/leave/disconnect──▶ presence ──┐
//!           ──codeChange/languageChange/typing─▶ relay ───┤
//!                                                         ▼
//!                        ConnectionRegistry + SessionDirectory (one lock)
//!                                                         │
//!                                                   fanout::deliver
//!                                                         │
//!                                           per-connection Outbox (mpsc)
//! ```

pub mod coordinator;
pub mod directory;
pub mod fanout;
mod presence;
pub mod protocol;
pub mod registry;
mod relay;


pub use coordinator::{Coordinator, CoordinatorOptions, CoordinatorStats};
pub use directory::{LastKnown, Member, Roster, SessionDirectory};
pub use fanout::{deliver, Delivery};
pub use protocol::{ClientEvent, Notification};
pub use registry::{ConnectionRegistry, Membership, Outbox};
