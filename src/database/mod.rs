pub mod comments_repo;
pub mod favorites_repo;
pub mod group_members_repo;
pub mod groups_repo;
pub mod meets_repo;
pub mod mods_repo;
pub mod posts_repo;
pub mod profiles_repo;
pub mod rsvp_commands_repo;
pub mod rsvps_repo;
