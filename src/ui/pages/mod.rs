//! Application pages module
//!
//! This module contains the page components rendered above the backdrop:
//! - Home page (hero)
//! - Not found page

mod home;
mod not_found;

pub use home::HomePage;
pub use not_found::NotFoundPage;
