pub mod analysis;
pub mod offer;
pub mod profile;
pub mod question;
