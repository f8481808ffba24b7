//! Process-wide map from content fingerprint to canonical file.
//!
//! The index is built in two steps. An [`IndexBuilder`] is seeded from the
//! files already in the output directory; [`IndexBuilder::build`] then
//! freezes the seed into a shareable [`DedupIndex`] whose only mutation is
//! [`DedupIndex::reserve`]. Because seeding needs `&mut IndexBuilder` and
//! reservations exist only on the built index, every seed completes before
//! the first reservation.

mod error;
mod index;
mod seed;

pub use error::{DedupError, Result};
pub use index::{Claim, DedupIndex, Reservation, ReservationResult};
pub use seed::{IndexBuilder, SeedReport};
