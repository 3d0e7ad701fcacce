pub mod favorites;
pub mod groups;
pub mod health;
pub mod meet;
pub mod meets;
pub mod profiles;
