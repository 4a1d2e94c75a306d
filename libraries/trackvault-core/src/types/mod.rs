mod ids;
mod range;
mod stats;
mod track;

pub use ids::{BlobLocator, TrackId, TRACK_ID_LEN};
pub use range::{ByteRange, RangeSpec};
pub use stats::{LibraryStats, TopTrack};
pub use track::{NewTrack, PublicTrack, Track};
