//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::Request;
use serde::Deserialize;
use tokio::net::TcpListener;

use convention_router::config::RouterConfig;
use convention_router::lifecycle::Shutdown;
use convention_router::routing::{
    Controller, ControllerMethod, MethodSignature, ParamType, RegistrationError, ReturnType,
};
use convention_router::{ControllerRequest, HttpServer, RegistryBuilder, RouteRegistry};

#[derive(Debug, Deserialize)]
pub struct SimpleData {
    #[serde(alias = "Hello")]
    pub hello: String,
}

/// Controller exercising every accepted and rejected method shape.
pub struct MockController;

impl MockController {
    async fn called(name: &str) -> Result<String, String> {
        Ok(format!("called {name}"))
    }
}

impl Controller for MockController {
    fn methods(self: Arc<Self>) -> Vec<ControllerMethod> {
        vec![
            ControllerMethod::context("Index", |_cr| Self::called("Index")),
            ControllerMethod::context("Get", |_cr| Self::called("Get")),
            ControllerMethod::context("GetMethod", |_cr| Self::called("GetMethod")),
            ControllerMethod::context("GetError", |_cr| async {
                Err::<String, _>("failed".to_string())
            }),
            ControllerMethod::unbound(
                "GetWrongReturnType",
                MethodSignature::new([ParamType::Request], [ReturnType::Other("i64"), ReturnType::Error]),
            ),
            ControllerMethod::unbound(
                "GetTooFewReturns",
                MethodSignature::new([ParamType::Request], [ReturnType::Other("i64")]),
            ),
            ControllerMethod::json("Put", |_cr, data: SimpleData| async move {
                Ok::<_, String>(format!("Called Put with value {}", data.hello))
            }),
            ControllerMethod::json_list("PutValid", |_cr, data: Vec<SimpleData>| async move {
                Ok::<_, String>(format!("Called PutValid {}", data.len()))
            }),
            ControllerMethod::context("PutBogus", |_cr| async { Ok::<_, String>(String::new()) }),
            ControllerMethod::unbound(
                "GetBogus",
                MethodSignature::new([ParamType::Str], [ReturnType::Str, ReturnType::Error]),
            ),
            ControllerMethod::raw("GetRawmethod", |_cr, _req| async { "called raw GET method" }),
            ControllerMethod::raw("Post", |_cr, _req| async { "called raw POST method" }),
            ControllerMethod::unbound(
                "Bogus",
                MethodSignature::new(
                    [ParamType::Request, ParamType::Str],
                    [ReturnType::Str, ReturnType::Error],
                ),
            ),
            ControllerMethod::context("helper", |_cr| Self::called("helper")),
        ]
    }
}

/// Echoes the descriptor fields back to the caller.
pub fn echo_methods() -> Vec<ControllerMethod> {
    vec![
        ControllerMethod::context("Get", |cr: ControllerRequest| async move {
            Ok::<_, String>(format!("{}|{}|{}", cr.item_id, cr.action, cr.action_filter))
        }),
        ControllerMethod::context("GetFilter", |cr: ControllerRequest| async move {
            Ok::<_, String>(cr.action_filter)
        }),
        ControllerMethod::context("GetWhoami", |cr: ControllerRequest| async move {
            Ok::<_, String>(format!("{:?}", cr.identity.user_id))
        }),
    ]
}

/// Registers `MockController` under `projects`, returning the rejection report.
pub fn mock_registry() -> (RouteRegistry, RegistrationError) {
    let mut builder = RegistryBuilder::new();
    let err = builder
        .register("projects", MockController)
        .expect_err("mock controller has nonconforming methods");
    builder.register_methods("echo", echo_methods()).unwrap();
    (builder.build(), err)
}

pub fn mock_server(config: RouterConfig) -> HttpServer {
    let (registry, _) = mock_registry();
    HttpServer::new(config, registry).unwrap()
}

pub fn request(method: &str, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(body.into())
        .unwrap()
}

/// A request whose body fails on the first read.
pub fn erroring_request(method: &str, uri: &str) -> Request<Body> {
    let stream = futures_util::stream::once(async {
        Err::<Bytes, std::io::Error>(std::io::Error::other("failed"))
    });
    request(method, uri, Body::from_stream(stream))
}

pub async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Start the mock server on an ephemeral port.
pub async fn spawn_server(config: RouterConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = mock_server(config);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });
    (addr, shutdown)
}
