//! Plain service types in, routed and filtered endpoints out.
//!
//! Mark a type with `#[derive(FastApi)]`, put it under `src/services`, and
//! `fast_service!()` expands to two routines:
//!
//! - `register_services(&mut container, lifetime)` adds every service to a
//!   [`ServiceCollection`];
//! - `map_routes(&mut app)` creates one route group per service on an
//!   [`EndpointRouteBuilder`] and maps each public method to an HTTP route
//!   inferred from its name (`get_by_id` becomes `GET /by_id`).
//!
//! ```ignore
//! use fast_service::{FastApi, route};
//!
//! #[route("/orders")]
//! #[derive(FastApi)]
//! pub struct OrderService;
//!
//! impl OrderService {
//!     pub async fn get_by_id(&self, id: u64) -> Option<Order> { todo!() }
//!     pub async fn create(&self, order: Order) -> u64 { todo!() }
//! }
//! ```
//!
//! Build scripts can write the same routines to `$OUT_DIR` with
//! [`build::Builder`] instead.

pub mod build;
pub mod host;
pub mod paged;
pub mod response;

pub use fast_service_codegen as codegen;
pub use fast_service_core::{
    EmptySegment, HttpMethod, MethodDeclaration, Parameter, RouteDescriptor, ServiceDeclaration,
    ServiceLifetime, infer_route,
};
pub use fast_service_macro::{
    FastApi, delete, endpoint_filter, fast_service, filter, get, ignore_route, post, put, route,
    tags,
};
pub use host::{
    EndpointBuilder, EndpointFilter, EndpointRouteBuilder, Handler, RouteGroup, ServiceCollection,
};
pub use paged::PagedResult;
pub use response::ApiResponse;

/// Marker for service types.
///
/// Usually derived. A capability trait with `FastApi` as a supertrait marks
/// every type implementing it as well.
pub trait FastApi: Send + Sync + 'static {}
