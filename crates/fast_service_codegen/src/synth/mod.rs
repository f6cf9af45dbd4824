//! Code synthesis.
//!
//! [`GeneratedUnit::build`] turns declarations into an explicit output tree
//! (registrations, groups, endpoints, handler functions); its [`ToTokens`]
//! implementation is the only place the tree becomes Rust tokens.
//!
//! [`ToTokens`]: quote::ToTokens

mod render;
mod unit;

pub use unit::{
    EndpointMapping, GeneratedUnit, GroupMapping, HandlerFn, Registration, instance_identifier,
};
