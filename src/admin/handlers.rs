use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::http::request::ControllerRequest;
use crate::routing::method::{Controller, ControllerMethod};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct Caller {
    pub user_id: Option<i64>,
    pub half_auth_user_id: Option<i64>,
    pub email: Option<String>,
}

/// Built-in `/status` controller served by the binary.
pub struct StatusController {
    started: Instant,
}

impl StatusController {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub async fn index(&self, _cr: &ControllerRequest) -> Result<String, serde_json::Error> {
        serde_json::to_string(&SystemStatus {
            version: env!("CARGO_PKG_VERSION"),
            status: "operational",
        })
    }

    pub async fn health(&self, _cr: &ControllerRequest) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Health {
            status: "ok",
            uptime_secs: self.started.elapsed().as_secs(),
        })
    }

    /// Echo the identity the router extracted for this request.
    pub async fn whoami(&self, cr: &ControllerRequest) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Caller {
            user_id: cr.identity.user_id,
            half_auth_user_id: cr.identity.half_auth_user_id,
            email: cr.identity.user.as_ref().map(|u| u.email.clone()),
        })
    }
}

impl Default for StatusController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for StatusController {
    fn methods(self: Arc<Self>) -> Vec<ControllerMethod> {
        let index = self.clone();
        let health = self.clone();
        let whoami = self;
        vec![
            ControllerMethod::context("Index", move |cr| {
                let this = index.clone();
                async move { this.index(&cr).await }
            }),
            ControllerMethod::context("GetHealth", move |cr| {
                let this = health.clone();
                async move { this.health(&cr).await }
            }),
            ControllerMethod::context("GetWhoami", move |cr| {
                let this = whoami.clone();
                async move { this.whoami(&cr).await }
            }),
        ]
    }
}
