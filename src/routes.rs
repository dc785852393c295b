use crate::{
    api::{employee, item, system},
    error::AppError,
};
use actix_web::{Route, http::Method, web};
use anyhow::{Result, bail};
use std::collections::HashSet;

/// One method+path pair and the handler that serves it.
#[derive(Clone)]
pub struct RouteEntry {
    pub method: Method,
    pub path: &'static str,
    pub handler: fn(Route) -> Route,
}

impl RouteEntry {
    fn new(method: Method, path: &'static str, handler: fn(Route) -> Route) -> Self {
        Self {
            method,
            path,
            handler,
        }
    }
}

pub fn route_table(metrics_enabled: bool) -> Vec<RouteEntry> {
    let mut routes = vec![
        // employees app
        RouteEntry::new(Method::GET, "/", |r: Route| r.to(employee::home)),
        RouteEntry::new(Method::GET, "/employees", |r: Route| {
            r.to(employee::list_employees)
        }),
        RouteEntry::new(Method::GET, "/add_employee", |r: Route| {
            r.to(employee::add_employee_form)
        }),
        RouteEntry::new(Method::POST, "/add_employee", |r: Route| {
            r.to(employee::add_employee)
        }),
        // items api
        RouteEntry::new(Method::GET, "/items", |r: Route| r.to(item::list_items)),
        RouteEntry::new(Method::POST, "/items", |r: Route| r.to(item::create_item)),
        RouteEntry::new(Method::GET, "/items/{id}", |r: Route| r.to(item::get_item)),
        RouteEntry::new(Method::DELETE, "/items/{id}", |r: Route| {
            r.to(item::delete_item)
        }),
        RouteEntry::new(Method::GET, "/health", |r: Route| r.to(system::health)),
    ];

    if metrics_enabled {
        routes.push(RouteEntry::new(Method::GET, "/metrics", |r: Route| {
            r.to(system::metrics)
        }));
    }

    routes
}

/// Startup check: every path is absolute and no method+path pair is registered twice.
pub fn validate(routes: &[RouteEntry]) -> Result<()> {
    let mut seen = HashSet::new();

    for entry in routes {
        if !entry.path.starts_with('/') {
            bail!("route path {:?} must start with '/'", entry.path);
        }
        if !seen.insert((entry.method.clone(), entry.path)) {
            bail!("duplicate route {} {}", entry.method, entry.path);
        }
    }
    Ok(())
}

pub fn configure(cfg: &mut web::ServiceConfig, routes: &[RouteEntry]) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    );

    // one resource per path so that an unmatched method yields 405
    let mut paths: Vec<&'static str> = Vec::new();
    for entry in routes {
        if !paths.contains(&entry.path) {
            paths.push(entry.path);
        }
    }

    for path in paths {
        let resource = routes
            .iter()
            .filter(|entry| entry.path == path)
            .fold(web::resource(path), |resource, entry| {
                resource.route((entry.handler)(web::route().method(entry.method.clone())))
            });
        cfg.service(resource);
    }
}
