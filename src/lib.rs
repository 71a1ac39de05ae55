pub mod codec;
pub mod core;
pub mod io;
pub mod planner;
pub mod store;

pub mod api_server;
