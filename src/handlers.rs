pub mod auth;
pub mod catalog;
pub mod rpc;
pub mod users;
