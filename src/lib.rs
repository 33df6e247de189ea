pub mod extract;
pub mod ops;
pub mod server;
