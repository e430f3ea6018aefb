// Library for tests to access modules

pub mod config;
pub mod models;
pub mod routes;
pub mod usage_repo;
pub mod version;
