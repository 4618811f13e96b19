//! HMV: Horizon Mars Visitor
//!
//! A staged application wizard for prospective Mars visitors, the schema it
//! validates against, and the endpoint that re-validates and acknowledges
//! submitted applications.

pub mod cli;
pub mod core;
pub mod protocol;
pub mod schema;
pub mod server;
pub mod wizard;
pub mod yaml;
