//! Route table and path matching.

use std::collections::BTreeMap;

/// Path of the login page.
pub const LOGIN_PATH: &str = "/login";

/// Path of the landing page after login.
pub const HOME_PATH: &str = "/home";

/// Named pages of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Login,
    Root,
    Home,
    Products,
    ProductDetail,
    Cart,
    Checkout,
    Orders,
    OrderDetail,
    Points,
    Notifications,
    AdminProducts,
    AdminInventory,
    AdminPoints,
    AdminReports,
}

/// Per-route flags consulted by the layout and the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteMeta {
    /// Render without the main layout (header, sidebar).
    pub hide_layout: bool,
    /// Only administrators may open this page.
    pub requires_admin: bool,
}

/// One entry of the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    pub name: RouteName,
    /// Pattern; segments starting with `:` capture a parameter.
    pub path: &'static str,
    pub meta: RouteMeta,
    /// Static redirect applied before the guard runs.
    pub redirect: Option<&'static str>,
}

impl RouteDef {
    const fn new(name: RouteName, path: &'static str) -> Self {
        Self {
            name,
            path,
            meta: RouteMeta {
                hide_layout: false,
                requires_admin: false,
            },
            redirect: None,
        }
    }

    const fn hide_layout(mut self) -> Self {
        self.meta.hide_layout = true;
        self
    }

    const fn admin(mut self) -> Self {
        self.meta.requires_admin = true;
        self
    }

    const fn redirect(mut self, to: &'static str) -> Self {
        self.redirect = Some(to);
        self
    }
}

/// Every page the client knows about.
pub static ROUTES: &[RouteDef] = &[
    RouteDef::new(RouteName::Login, LOGIN_PATH).hide_layout(),
    RouteDef::new(RouteName::Root, "/").redirect(HOME_PATH),
    RouteDef::new(RouteName::Home, HOME_PATH),
    RouteDef::new(RouteName::Products, "/products"),
    RouteDef::new(RouteName::ProductDetail, "/product/:id"),
    RouteDef::new(RouteName::Cart, "/cart"),
    RouteDef::new(RouteName::Checkout, "/checkout"),
    RouteDef::new(RouteName::Orders, "/orders"),
    RouteDef::new(RouteName::OrderDetail, "/order/:id"),
    RouteDef::new(RouteName::Points, "/points"),
    RouteDef::new(RouteName::Notifications, "/notifications"),
    RouteDef::new(RouteName::AdminProducts, "/admin/products").admin(),
    RouteDef::new(RouteName::AdminInventory, "/admin/inventory").admin(),
    RouteDef::new(RouteName::AdminPoints, "/admin/points").admin(),
    RouteDef::new(RouteName::AdminReports, "/admin/reports").admin(),
];

/// A path resolved against the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: &'static RouteDef,
    /// Normalized path that matched.
    pub path: String,
    /// Values captured by `:name` segments.
    pub params: BTreeMap<String, String>,
}

/// Look up a route definition by name.
#[must_use]
pub fn by_name(name: RouteName) -> Option<&'static RouteDef> {
    ROUTES.iter().find(|route| route.name == name)
}

/// Resolve `path` against the route table.
///
/// Query strings and fragments are ignored, as is a trailing slash.
#[must_use]
pub fn resolve(path: &str) -> Option<RouteMatch> {
    let path = normalize(path);
    let segments: Vec<&str> = split(&path).collect();

    ROUTES.iter().find_map(|route| {
        let params = match_segments(route.path, &segments)?;
        Some(RouteMatch {
            route,
            path: path.clone(),
            params,
        })
    })
}

fn match_segments(pattern: &str, segments: &[&str]) -> Option<BTreeMap<String, String>> {
    let pattern: Vec<&str> = split(pattern).collect();
    if pattern.len() != segments.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (expected, actual) in pattern.iter().zip(segments) {
        if let Some(name) = expected.strip_prefix(':') {
            params.insert(name.to_string(), (*actual).to_string());
        } else if expected != actual {
            return None;
        }
    }
    Some(params)
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn normalize(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path.get(..end).unwrap_or(path).trim();
    let joined = split(trimmed).collect::<Vec<_>>().join("/");
    format!("/{joined}")
}
