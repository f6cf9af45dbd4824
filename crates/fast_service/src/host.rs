//! Interfaces the generated routines call into.
//!
//! fast_service does not serve HTTP or construct services itself. A host
//! application adapts its dependency container to [`ServiceCollection`] and
//! its web framework to [`EndpointRouteBuilder`]; `register_services` and
//! `map_routes` only ever talk to these traits.

use fast_service_core::{HttpMethod, ServiceLifetime};

use crate::FastApi;

/// Dependency container the registration routine adds services to.
pub trait ServiceCollection {
    fn add_singleton<S: FastApi>(&mut self) -> &mut Self;
    fn add_scoped<S: FastApi>(&mut self) -> &mut Self;
    fn add_transient<S: FastApi>(&mut self) -> &mut Self;

    fn add<S: FastApi>(&mut self, lifetime: ServiceLifetime) -> &mut Self {
        match lifetime {
            ServiceLifetime::Singleton => self.add_singleton::<S>(),
            ServiceLifetime::Scoped => self.add_scoped::<S>(),
            ServiceLifetime::Transient => self.add_transient::<S>(),
        }
    }
}

/// Marker for types usable as endpoint filters.
pub trait EndpointFilter: 'static {}

/// Something a route can dispatch to.
///
/// Implemented for every function and closure of one to sixteen arguments;
/// generated handlers take the service instance first.
pub trait Handler<Args> {
    type Output;

    fn call(&self, args: Args) -> Self::Output;
}

macro_rules! impl_handler {
    ($($arg:ident),+) => {
        impl<Func, Ret, $($arg,)+> Handler<($($arg,)+)> for Func
        where
            Func: Fn($($arg),+) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn call(&self, ($($arg,)+): ($($arg,)+)) -> Ret {
                (self)($($arg),+)
            }
        }
    };
}

impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);
impl_handler!(A1, A2, A3, A4, A5);
impl_handler!(A1, A2, A3, A4, A5, A6);
impl_handler!(A1, A2, A3, A4, A5, A6, A7);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8, A9);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12, A13);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12, A13, A14);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12, A13, A14, A15);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12, A13, A14, A15, A16);

/// Application the mapping routine creates route groups on.
pub trait EndpointRouteBuilder {
    type Group: RouteGroup;

    /// Start a group whose routes all live under `prefix`.
    fn map_group(&mut self, prefix: &str) -> Self::Group;
}

/// A group of routes sharing a prefix, filters and a tag.
pub trait RouteGroup: Sized {
    type Endpoint: EndpointBuilder;

    fn add_endpoint_filter<F: EndpointFilter>(self) -> Self;

    fn with_tags(self, tag: &str) -> Self;

    fn map<H, Args>(&mut self, method: HttpMethod, pattern: &str, handler: H) -> Self::Endpoint
    where
        H: Handler<Args> + 'static,
        H::Output: 'static,
        Args: 'static;

    fn map_get<H, Args>(&mut self, pattern: &str, handler: H) -> Self::Endpoint
    where
        H: Handler<Args> + 'static,
        H::Output: 'static,
        Args: 'static,
    {
        self.map(HttpMethod::Get, pattern, handler)
    }

    fn map_post<H, Args>(&mut self, pattern: &str, handler: H) -> Self::Endpoint
    where
        H: Handler<Args> + 'static,
        H::Output: 'static,
        Args: 'static,
    {
        self.map(HttpMethod::Post, pattern, handler)
    }

    fn map_put<H, Args>(&mut self, pattern: &str, handler: H) -> Self::Endpoint
    where
        H: Handler<Args> + 'static,
        H::Output: 'static,
        Args: 'static,
    {
        self.map(HttpMethod::Put, pattern, handler)
    }

    fn map_delete<H, Args>(&mut self, pattern: &str, handler: H) -> Self::Endpoint
    where
        H: Handler<Args> + 'static,
        H::Output: 'static,
        Args: 'static,
    {
        self.map(HttpMethod::Delete, pattern, handler)
    }
}

/// A single mapped route.
pub trait EndpointBuilder: Sized {
    fn add_endpoint_filter<F: EndpointFilter>(self) -> Self;
}

#[cfg(test)]
mod tests {
    use std::any::type_name;

    use super::*;

    struct Greeter;
    impl FastApi for Greeter {}

    #[derive(Default)]
    struct Recorder(Vec<(&'static str, ServiceLifetime)>);

    impl ServiceCollection for Recorder {
        fn add_singleton<S: FastApi>(&mut self) -> &mut Self {
            self.0.push((type_name::<S>(), ServiceLifetime::Singleton));
            self
        }
        fn add_scoped<S: FastApi>(&mut self) -> &mut Self {
            self.0.push((type_name::<S>(), ServiceLifetime::Scoped));
            self
        }
        fn add_transient<S: FastApi>(&mut self) -> &mut Self {
            self.0.push((type_name::<S>(), ServiceLifetime::Transient));
            self
        }
    }

    #[test]
    fn test_add_dispatches_on_lifetime() {
        let mut recorder = Recorder::default();
        for lifetime in ServiceLifetime::ALL {
            recorder.add::<Greeter>(lifetime);
        }
        let lifetimes: Vec<_> = recorder.0.iter().map(|(_, l)| *l).collect();
        assert_eq!(lifetimes, ServiceLifetime::ALL);
        assert!(recorder.0[0].0.ends_with("Greeter"));
    }

    fn call<H: Handler<Args>, Args>(handler: H, args: Args) -> H::Output {
        handler.call(args)
    }

    #[test]
    fn test_handler_forwards_arguments() {
        fn one(a: u8) -> u8 {
            a + 1
        }
        fn three(a: u8, b: &'static str, c: bool) -> String {
            format!("{a}{b}{c}")
        }
        assert_eq!(call(one, (1,)), 2);
        assert_eq!(call(three, (7, "x", true)), "7xtrue");
        assert_eq!(call(|a: i32, b: i32| a * b, (6, 7)), 42);
    }

    #[test]
    fn test_handler_sixteen_arguments() {
        #[allow(clippy::too_many_arguments, clippy::many_single_char_names)]
        fn sum(
            a: u8, b: u8, c: u8, d: u8, e: u8, f: u8, g: u8, h: u8,
            i: u8, j: u8, k: u8, l: u8, m: u8, n: u8, o: u8, p: u8,
        ) -> u32 {
            [a, b, c, d, e, f, g, h, i, j, k, l, m, n, o, p]
                .iter()
                .map(|&v| u32::from(v))
                .sum()
        }
        let total = call(sum, (1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1));
        assert_eq!(total, 16);
    }
}
