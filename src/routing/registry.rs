//! Route registration and lookup.
//!
//! # Responsibilities
//! - Feed every public controller method through the classifier
//! - Install accepted methods under their normalized route key
//! - Collect every rejection into one report per controller
//! - Freeze the result into an immutable `RouteRegistry`
//!
//! # Design Decisions
//! - Builder during bootstrap, immutable registry while serving
//! - Partial success is normal: rejections never uninstall accepted methods
//! - Methods are classified in name order so reports are stable
//! - A colliding key replaces the earlier route (logged as a warning)

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::observability::metrics;
use crate::routing::method::{Controller, ControllerMethod, Invoker};
use crate::routing::naming::{route_key, title_case};
use crate::routing::signature::{classify, HandlerSignature, Rejection, RejectionReason};

/// A validated, dispatchable controller method.
pub struct Route {
    key: String,
    method_name: String,
    signature: HandlerSignature,
    invoker: Invoker,
}

impl Route {
    /// Normalized `Controller + Verb + Action` key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Method name as declared by the controller.
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn signature(&self) -> &HandlerSignature {
        &self.signature
    }

    pub fn is_raw(&self) -> bool {
        self.signature.is_raw
    }

    pub(crate) fn invoker(&self) -> &Invoker {
        &self.invoker
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("key", &self.key)
            .field("method_name", &self.method_name)
            .field("signature", &self.signature)
            .finish()
    }
}

/// Methods of one controller that could not be registered.
///
/// Displays as one `Method "<name>" error: <reason>` line per method.
#[derive(Debug)]
pub struct RegistrationError {
    pub controller: String,
    pub rejections: Vec<Rejection>,
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rejection in &self.rejections {
            writeln!(f, "{}", rejection)?;
        }
        Ok(())
    }
}

impl std::error::Error for RegistrationError {}

/// Collects routes during bootstrap.
#[derive(Default)]
pub struct RegistryBuilder {
    routes: HashMap<String, Route>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every public method of `controller` under `name`.
    ///
    /// Returns the number of installed methods, or the combined report of
    /// rejected ones. Accepted methods are installed in both cases.
    pub fn register<C: Controller>(&mut self, name: &str, controller: C) -> Result<usize, RegistrationError> {
        self.register_shared(name, Arc::new(controller))
    }

    /// Like [`register`](Self::register) for a controller that is also
    /// used elsewhere.
    pub fn register_shared<C: Controller>(
        &mut self,
        name: &str,
        controller: Arc<C>,
    ) -> Result<usize, RegistrationError> {
        self.register_methods(name, controller.methods())
    }

    /// Register an explicit list of methods under `name`.
    pub fn register_methods(
        &mut self,
        name: &str,
        methods: impl IntoIterator<Item = ControllerMethod>,
    ) -> Result<usize, RegistrationError> {
        let controller = title_case(name);
        let mut methods: Vec<ControllerMethod> =
            methods.into_iter().filter(|m| !m.is_private()).collect();
        methods.sort_by(|a, b| a.name().cmp(b.name()));

        let mut installed = 0;
        let mut rejections = Vec::new();
        for method in methods {
            match self.admit(&controller, method) {
                Ok(()) => installed += 1,
                Err(rejection) => {
                    tracing::debug!(
                        controller = %controller,
                        method = %rejection.method,
                        reason = %rejection.reason,
                        "Method rejected"
                    );
                    rejections.push(rejection);
                }
            }
        }

        metrics::record_registration(&controller, rejections.len());
        tracing::info!(
            controller = %controller,
            installed,
            rejected = rejections.len(),
            "Controller registered"
        );

        if rejections.is_empty() {
            Ok(installed)
        } else {
            Err(RegistrationError {
                controller,
                rejections,
            })
        }
    }

    fn admit(&mut self, controller: &str, method: ControllerMethod) -> Result<(), Rejection> {
        let (method_name, declared, invoker) = method.into_parts();
        let signature = classify(&method_name, &declared)?;
        let Some(invoker) = invoker else {
            return Err(Rejection::new(
                &method_name,
                Some(signature.verb),
                signature.action,
                RejectionReason::NotCallable,
            ));
        };

        let key = route_key(controller, signature.verb, &signature.action);
        let route = Route {
            key: key.clone(),
            method_name,
            signature,
            invoker,
        };
        if let Some(previous) = self.routes.insert(key, route) {
            tracing::warn!(
                route_key = %previous.key,
                replaced = %previous.method_name,
                "Route key registered twice, keeping the latest method"
            );
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freeze the registry. No routes can be added afterwards.
    pub fn build(self) -> RouteRegistry {
        metrics::record_routes_total(self.routes.len());
        RouteRegistry {
            routes: self.routes,
        }
    }
}

/// Immutable route table shared by all request tasks.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: HashMap<String, Route>,
}

impl RouteRegistry {
    /// Look up the route for an already normalized controller name and
    /// resolved method name (`"Projects"`, `"GetWidgets"`).
    pub fn lookup(&self, controller_name: &str, method_name: &str) -> Option<&Route> {
        self.get(&format!("{controller_name}{method_name}"))
    }

    /// Look up a route by its full key.
    pub fn get(&self, key: &str) -> Option<&Route> {
        self.routes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.routes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// All registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::naming::Verb;
    use crate::routing::signature::{MethodSignature, ParamType, ReturnType};

    fn ok_method(name: &str, body: &'static str) -> ControllerMethod {
        ControllerMethod::context(name, move |_cr| async move { Ok::<_, String>(body.to_string()) })
    }

    #[test]
    fn test_register_installs_conforming_methods() {
        let mut builder = RegistryBuilder::new();
        let installed = builder
            .register_methods("projects", vec![ok_method("Index", "i"), ok_method("GetWidgets", "w")])
            .unwrap();
        assert_eq!(installed, 2);

        let registry = builder.build();
        assert_eq!(registry.keys(), vec!["ProjectsGetWidgets", "ProjectsIndex"]);
        let route = registry.lookup("Projects", "GetWidgets").unwrap();
        assert_eq!(route.method_name(), "GetWidgets");
        assert_eq!(route.signature().verb, Verb::Get);
        assert!(!route.is_raw());
    }

    #[test]
    fn test_partial_success_reports_every_rejection() {
        let mut builder = RegistryBuilder::new();
        let err = builder
            .register_methods(
                "projects",
                vec![
                    ok_method("Get", "g"),
                    ok_method("PutBogus", ""),
                    ok_method("Bogus", ""),
                    ok_method("DeleteItem", "d"),
                ],
            )
            .unwrap_err();

        assert_eq!(builder.len(), 2);
        assert_eq!(err.controller, "Projects");
        assert_eq!(
            err.to_string(),
            "Method \"Bogus\" error: Unsupported http verb: \"\"\n\
             Method \"PutBogus\" error: Requires 2 input args (cr *ControllerRequest, json *YourStruct or []YourStruct)\n"
        );
        assert_eq!(err.to_string().lines().count(), 2);
    }

    #[test]
    fn test_private_methods_are_skipped_silently() {
        let mut builder = RegistryBuilder::new();
        let installed = builder
            .register_methods("projects", vec![ok_method("Get", "g"), ok_method("helper", "")])
            .unwrap();
        assert_eq!(installed, 1);
    }

    #[test]
    fn test_unbound_conforming_method_is_rejected() {
        let mut builder = RegistryBuilder::new();
        let err = builder
            .register_methods("projects", vec![ControllerMethod::unbound("Get", MethodSignature::context())])
            .unwrap_err();
        assert_eq!(err.rejections[0].reason, RejectionReason::NotCallable);
        assert_eq!(err.to_string(), "Method \"Get\" error: Internal error validating method\n");
        assert!(builder.is_empty());
    }

    #[test]
    fn test_shape_rejection_wins_over_missing_body() {
        let mut builder = RegistryBuilder::new();
        let sig = MethodSignature::new([ParamType::Request], [ReturnType::Other("i64")]);
        let err = builder
            .register_methods("projects", vec![ControllerMethod::unbound("GetCount", sig)])
            .unwrap_err();
        assert_eq!(err.rejections[0].reason, RejectionReason::UnsupportedReturnType);
    }

    #[test]
    fn test_case_insensitive_keys_collide() {
        let mut builder = RegistryBuilder::new();
        builder
            .register_methods("projects", vec![ok_method("GetWidgets", "first")])
            .unwrap();
        builder
            .register_methods("PROJECTS", vec![ok_method("getwidgets", "private"), ok_method("GETWIDGETS", "second")])
            .unwrap();

        let registry = builder.build();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("ProjectsGetWidgets").unwrap().method_name(), "GETWIDGETS");
    }

    #[test]
    fn test_lookup_miss() {
        let registry = RegistryBuilder::new().build();
        assert!(registry.lookup("Projects", "GetBogus").is_none());
        assert!(!registry.contains("ProjectsIndex"));
    }
}
