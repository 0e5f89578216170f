pub mod authz;
pub mod factory;
pub mod token;
