pub mod geocode_service;
pub mod groups_service;
pub mod meet_search;
pub mod meets_service;
pub mod profile_service;
pub mod rsvp_service;
