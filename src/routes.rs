//! Registration-time binding of template functions to handlers.

use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use tracing::info;

use crate::adapter::{Handler, HttpMethod};
use crate::core::models::Params;
use crate::errors::{Result, StarlessError};
use crate::template::TemplateDef;

pub const API_PREFIX: &str = "/api/";

/// Handlers keyed by the function name used in `template.json`.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &str, handler: Handler) -> Self {
        self.register(name, handler);
        self
    }

    pub fn register(&mut self, name: &str, handler: Handler) {
        self.handlers.insert(name.to_string(), handler);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    pub name: String,
    /// Last segment of the function's source path; the Azure function folder.
    pub folder: String,
    pub pattern: String,
    pub method: HttpMethod,
    pub handler: Handler,
}

impl Route {
    #[must_use]
    pub fn full_path(&self) -> String {
        format!("{}{}", API_PREFIX, self.pattern.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Binds every declared (function, method) pair to its handler.
    ///
    /// # Errors
    ///
    /// Fails on the first unsupported method, on a function without a
    /// registered handler, and on a declared `style` that contradicts the
    /// registered handler.
    pub fn build(template: &TemplateDef, registry: &HandlerRegistry) -> Result<Self> {
        let mut routes = Vec::new();
        for (name, func) in &template.functions {
            let methods = func.parsed_methods()?;
            let handler = registry
                .get(name)
                .ok_or_else(|| StarlessError::MissingHandler(name.clone()))?;
            if let Some(style) = func.style {
                if style != handler.style() {
                    return Err(StarlessError::Template(format!(
                        "function {name} is declared {style:?} but its handler is {:?}",
                        handler.style()
                    )));
                }
            }
            for method in methods {
                let full_path = format!("{}{}", API_PREFIX, func.route.trim_start_matches('/'));
                if let Some(clash) = routes
                    .iter()
                    .find(|r: &&Route| r.method == method && r.full_path() == full_path)
                {
                    if clash.name == *name {
                        continue;
                    }
                    return Err(StarlessError::Template(format!(
                        "{method} {full_path} is declared by both {} and {name}",
                        clash.name
                    )));
                }
                routes.push(Route {
                    name: name.clone(),
                    folder: func.folder_name().to_string(),
                    pattern: func.route.clone(),
                    method,
                    handler: handler.clone(),
                });
            }
        }
        info!(count = routes.len(), "Registered routes");
        Ok(Self { routes })
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Finds the route serving `path` for `method`, with the captured
    /// `:param` segments.
    #[must_use]
    pub fn find(&self, path: &str, method: HttpMethod) -> Option<(&Route, Params)> {
        self.routes
            .iter()
            .filter(|r| r.method == method)
            .find_map(|r| match_pattern(&r.full_path(), path).map(|params| (r, params)))
    }

    /// First route registered for the function `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// First route whose function is deployed from the folder `folder`.
    #[must_use]
    pub fn find_by_folder(&self, folder: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| r.folder.eq_ignore_ascii_case(folder))
    }

    /// One line per function: `name [METHODS] <base>/api/<route>`.
    #[must_use]
    pub fn listing(&self, base_url: &str) -> Vec<String> {
        let mut lines: Vec<(String, Vec<&str>, String)> = Vec::new();
        for route in &self.routes {
            match lines.iter_mut().find(|(name, _, _)| *name == route.name) {
                Some((_, methods, _)) => methods.push(route.method.as_str()),
                None => lines.push((
                    route.name.clone(),
                    vec![route.method.as_str()],
                    format!("{}{}", base_url, route.full_path()),
                )),
            }
        }
        lines
            .into_iter()
            .map(|(name, methods, url)| format!("{} [{}] {}", name, methods.join(", "), url))
            .collect()
    }
}

/// Matches `path` against an express-style pattern such as `/api/users/:id`.
#[must_use]
pub fn match_pattern(pattern: &str, path: &str) -> Option<Params> {
    let pattern_segments: Vec<&str> = pattern.trim_matches('/').split('/').collect();
    let path_segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = Params::new();
    for (expected, actual) in pattern_segments.iter().zip(path_segments.iter()) {
        if let Some(name) = expected.strip_prefix(':') {
            if actual.is_empty() {
                return None;
            }
            let decoded = percent_decode_str(actual).decode_utf8().ok()?;
            params.insert(name.to_string(), decoded.to_string());
        } else if expected != actual {
            return None;
        }
    }
    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{LambdaEvent, LambdaResult};
    use crate::errors::HandlerError;
    use crate::template::FunctionDef;
    use serde_json::json;

    fn ok_handler() -> Handler {
        Handler::lambda_fn(|_e: LambdaEvent| async {
            Ok::<_, HandlerError>(LambdaResult::json(200, &json!({})))
        })
    }

    fn template(methods: &[&str]) -> TemplateDef {
        let mut t = TemplateDef::default();
        t.functions.insert(
            "users".to_string(),
            FunctionDef {
                path: "functions/users".to_string(),
                route: "users/:id".to_string(),
                methods: methods.iter().map(ToString::to_string).collect(),
                style: None,
            },
        );
        t
    }

    #[test]
    fn test_match_pattern() {
        let params = match_pattern("/api/users/:id", "/api/users/a%20b").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("a b"));
        assert!(match_pattern("/api/users/:id", "/api/users").is_none());
        assert!(match_pattern("/api/hello", "/api/hello/").unwrap().is_empty());
        assert!(match_pattern("/api/hello", "/api/bye").is_none());
    }

    #[test]
    fn test_build_and_find() {
        let registry = HandlerRegistry::new().with("users", ok_handler());
        let table = RouteTable::build(&template(&["GET", "DELETE"]), &registry).unwrap();
        assert_eq!(table.routes().len(), 2);

        let (route, params) = table.find("/api/users/7", HttpMethod::Delete).unwrap();
        assert_eq!(route.name, "users");
        assert_eq!(params.get("id").map(String::as_str), Some("7"));
        assert!(table.find("/api/users/7", HttpMethod::Post).is_none());

        assert_eq!(
            table.listing("http://localhost:7070"),
            vec!["users [GET, DELETE] http://localhost:7070/api/users/:id".to_string()]
        );
    }

    #[test]
    fn test_unsupported_method_aborts_registration() {
        let registry = HandlerRegistry::new().with("users", ok_handler());
        let err = RouteTable::build(&template(&["GET", "CONNECT"]), &registry).unwrap_err();
        assert!(matches!(err, StarlessError::UnsupportedMethod(m) if m == "CONNECT"));
    }

    #[test]
    fn test_missing_handler() {
        let err = RouteTable::build(&template(&["GET"]), &HandlerRegistry::new()).unwrap_err();
        assert_eq!(err.to_string(), "No handler registered for function: users");
    }

    #[test]
    fn test_declared_style_must_match() {
        let mut t = template(&["GET"]);
        if let Some(f) = t.functions.get_mut("users") {
            f.style = Some(crate::adapter::HandlerStyle::Context);
        }
        let registry = HandlerRegistry::new().with("users", ok_handler());
        assert!(matches!(
            RouteTable::build(&t, &registry),
            Err(StarlessError::Template(_))
        ));
    }

    #[test]
    fn test_find_by_folder_when_key_differs() {
        let mut t = template(&["GET"]);
        if let Some(f) = t.functions.get_mut("users") {
            f.path = "functions/people/".to_string();
        }
        let registry = HandlerRegistry::new().with("users", ok_handler());
        let table = RouteTable::build(&t, &registry).unwrap();

        let route = table.find_by_folder("People").unwrap();
        assert_eq!(route.name, "users");
        assert_eq!(route.folder, "people");
        assert!(table.find_by_folder("users").is_none());
        assert!(table.find_by_name("people").is_none());
    }
}
