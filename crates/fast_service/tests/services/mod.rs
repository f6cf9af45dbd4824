#![allow(dead_code)]

use fast_service::EndpointFilter;

pub mod catalog;
pub mod health;
pub mod orders;

pub struct RequireAuth;
impl EndpointFilter for RequireAuth {}

pub struct AuditLog;
impl EndpointFilter for AuditLog {}
