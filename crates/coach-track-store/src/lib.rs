//! Track Metadata Store (spec §4.6): memory → disk → optional remote
//! lookup for [`TrackSegment`] lists, falling soft to a single-segment
//! representation when nothing is known about a track.

mod remote;
mod store;

pub use remote::{validate_segments, RemoteTrackSource};
pub use store::TrackStore;
