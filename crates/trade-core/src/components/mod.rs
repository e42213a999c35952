//! Data model: resources, agents and the requests passed between them.

pub mod agent;
pub mod request;
pub mod resource;

pub use agent::*;
pub use request::*;
pub use resource::*;
