//! Static gateway route table: method + path pattern → permission + upstream.
//!
//! Patterns are literal segments plus `{id}` placeholders matching any single
//! non-empty segment. The first matching entry wins.

use axum::http::Method;

use stockroom_auth::{Permission, RequiresPermission};

/// Backend service a route is forwarded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Inventory,
    Orders,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRoute {
    pub method: Method,
    pub pattern: &'static str,
    pub permission: Option<Permission>,
    pub upstream: Upstream,
}

impl GatewayRoute {
    fn new(
        method: Method,
        pattern: &'static str,
        permission: Option<&'static str>,
        upstream: Upstream,
    ) -> Self {
        Self {
            method,
            pattern,
            permission: permission.map(Permission::from_static),
            upstream,
        }
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        if self.method != *method {
            return false;
        }

        let mut wanted = self.pattern.trim_matches('/').split('/');
        let mut actual = path.trim_matches('/').split('/');
        loop {
            match (wanted.next(), actual.next()) {
                (None, None) => return true,
                (Some("{id}"), Some(seg)) if !seg.is_empty() => continue,
                (Some(lit), Some(seg)) if lit == seg => continue,
                _ => return false,
            }
        }
    }
}

impl RequiresPermission for GatewayRoute {
    fn required_permission(&self) -> Option<&Permission> {
        self.permission.as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<GatewayRoute>,
}

impl RouteTable {
    pub fn new(routes: Vec<GatewayRoute>) -> Self {
        Self { routes }
    }

    pub fn find(&self, method: &Method, path: &str) -> Option<&GatewayRoute> {
        self.routes.iter().find(|r| r.matches(method, path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &GatewayRoute> {
        self.routes.iter()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        use Upstream::{Inventory, Orders};

        Self::new(vec![
            GatewayRoute::new(Method::GET, "/inventory/categories", Some("view category"), Inventory),
            GatewayRoute::new(Method::POST, "/inventory/categories", Some("create category"), Inventory),
            GatewayRoute::new(Method::GET, "/inventory/products", Some("view product"), Inventory),
            GatewayRoute::new(Method::POST, "/inventory/products", Some("create product"), Inventory),
            GatewayRoute::new(Method::GET, "/inventory/products/{id}", Some("view product"), Inventory),
            // any authenticated caller may check stock
            GatewayRoute::new(Method::GET, "/inventory/stock/{id}", None, Inventory),
            GatewayRoute::new(Method::GET, "/inventory/transactions", Some("view transaction"), Inventory),
            GatewayRoute::new(Method::POST, "/inventory/transactions", Some("create transaction"), Inventory),
            GatewayRoute::new(Method::GET, "/orders", Some("view order"), Orders),
            GatewayRoute::new(Method::POST, "/orders", Some("create order"), Orders),
            GatewayRoute::new(Method::GET, "/orders/{id}", Some("view order"), Orders),
            GatewayRoute::new(Method::PUT, "/orders/{id}/status", Some("edit order"), Orders),
            GatewayRoute::new(Method::GET, "/orders/{id}/reconciliation", Some("view order"), Orders),
            GatewayRoute::new(Method::GET, "/sale-report", Some("view report"), Orders),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_matches_one_segment() {
        let table = RouteTable::default();

        let route = table.find(&Method::PUT, "/orders/42/status").unwrap();
        assert_eq!(route.required_permission().map(Permission::as_str), Some("edit order"));
        assert_eq!(route.upstream, Upstream::Orders);

        assert!(table.find(&Method::PUT, "/orders//status").is_none());
        assert!(table.find(&Method::PUT, "/orders/42/status/extra").is_none());
    }

    #[test]
    fn method_is_part_of_the_match() {
        let table = RouteTable::default();
        assert_eq!(
            table
                .find(&Method::POST, "/orders")
                .and_then(|r| r.required_permission())
                .map(Permission::as_str),
            Some("create order")
        );
        assert!(table.find(&Method::DELETE, "/orders").is_none());
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let table = RouteTable::default();
        assert!(table.find(&Method::GET, "/sale-report/").is_some());
    }

    #[test]
    fn authentication_only_route_has_no_permission() {
        let table = RouteTable::default();
        let route = table.find(&Method::GET, "/inventory/stock/10").unwrap();
        assert!(route.required_permission().is_none());
    }

    #[test]
    fn unknown_path_has_no_route() {
        assert!(RouteTable::default().find(&Method::GET, "/admin").is_none());
    }
}
