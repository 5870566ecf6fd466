pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod reconcile;
pub mod routes;
pub mod slug;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
