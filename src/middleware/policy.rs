use axum::http::Method;

/// Group requirement attached to a protected route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Valid session, no group requirement
    Authenticated,
    Retail,
    Grosir,
    Admin,
    /// Operational-hours changes by a grocery's manager or owner
    GrosirManagement,
}

impl AccessPolicy {
    pub fn required_groups(self) -> &'static [&'static str] {
        match self {
            AccessPolicy::Authenticated => &[],
            AccessPolicy::Retail => &["retail"],
            AccessPolicy::Grosir => &["grosir"],
            AccessPolicy::Admin => &["admin"],
            AccessPolicy::GrosirManagement => &["GROSIR_MANAGER", "GROSIR_OWNER"],
        }
    }

    pub fn needs_groups(self) -> bool {
        !self.required_groups().is_empty()
    }

    /// Non-empty intersection, exact and case-sensitive. No group implies another.
    pub fn permits(self, groups: &[String]) -> bool {
        let required = self.required_groups();
        required.is_empty() || groups.iter().any(|group| required.contains(&group.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct RoutePolicy {
    pub method: Method,
    /// Route template as registered with the router, e.g. `/v1/product/:id`
    pub path: &'static str,
    pub policy: AccessPolicy,
}

impl RoutePolicy {
    pub fn new(method: Method, path: &'static str, policy: AccessPolicy) -> Self {
        Self { method, path, policy }
    }
}

/// Declarative (method, route) -> policy table consulted by the session gate
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    routes: Vec<RoutePolicy>,
}

impl PolicyTable {
    pub fn new(routes: Vec<RoutePolicy>) -> Self {
        Self { routes }
    }

    pub fn lookup(&self, method: &Method, path: &str) -> Option<AccessPolicy> {
        // HEAD is served by the GET handler
        let method = if *method == Method::HEAD { Method::GET } else { method.clone() };
        self.routes
            .iter()
            .find(|route| route.path == path && route.method == method)
            .map(|route| route.policy)
    }

    pub fn routes(&self) -> &[RoutePolicy] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn intersection_is_case_sensitive() {
        assert!(AccessPolicy::Grosir.permits(&groups(&["retail", "grosir"])));
        assert!(!AccessPolicy::Grosir.permits(&groups(&["GROSIR"])));
        assert!(AccessPolicy::GrosirManagement.permits(&groups(&["GROSIR_OWNER"])));
        assert!(!AccessPolicy::GrosirManagement.permits(&groups(&["grosir"])));
    }

    #[test]
    fn admin_does_not_imply_other_groups() {
        assert!(!AccessPolicy::Grosir.permits(&groups(&["admin"])));
        assert!(!AccessPolicy::Retail.permits(&groups(&["admin"])));
    }

    #[test]
    fn authenticated_needs_no_groups() {
        assert!(AccessPolicy::Authenticated.permits(&[]));
        assert!(!AccessPolicy::Authenticated.needs_groups());
        assert!(AccessPolicy::Admin.needs_groups());
    }

    #[test]
    fn lookup_matches_method_and_template() {
        let table = PolicyTable::new(vec![
            RoutePolicy::new(Method::GET, "/v1/things/:id", AccessPolicy::Authenticated),
            RoutePolicy::new(Method::PUT, "/v1/things/:id", AccessPolicy::Grosir),
        ]);
        assert_eq!(table.lookup(&Method::PUT, "/v1/things/:id"), Some(AccessPolicy::Grosir));
        assert_eq!(table.lookup(&Method::HEAD, "/v1/things/:id"), Some(AccessPolicy::Authenticated));
        assert_eq!(table.lookup(&Method::DELETE, "/v1/things/:id"), None);
        assert_eq!(table.lookup(&Method::GET, "/v1/things/7"), None);
    }
}
