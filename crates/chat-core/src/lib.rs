pub mod channel;
pub mod dispatcher;
pub mod event_bus;
pub mod export;
pub mod lifecycle;
pub mod persist;
pub mod ports;
pub mod store;
