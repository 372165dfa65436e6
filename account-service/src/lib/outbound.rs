pub mod oauth;
pub mod repositories;
