pub mod comments;
pub mod groups;
pub mod meets;
pub mod profiles;
pub mod rsvps;

pub use comments::CommentRow;
pub use groups::{GroupMemberRow, GroupRow};
pub use meets::MeetRow;
pub use profiles::{ModRow, PostRow, ProfileRow};
pub use rsvps::{RsvpCounts, RsvpRow};
