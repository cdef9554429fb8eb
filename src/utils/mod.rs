pub mod credential;
pub mod oauth2;
pub(crate) mod reqwest;
