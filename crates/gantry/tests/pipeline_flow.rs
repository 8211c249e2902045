//! End-to-end pipeline behavior through the in-memory test client.

use gantry::prelude::*;
use gantry_test::{TestClient, TestError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn denied_guard_short_circuits_the_endpoint() {
    let endpoint_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&endpoint_calls);

    let pipeline = Pipeline::builder()
        .add_guard(guard::from_fn(|_| false))
        .add_endpoint(
            Method::GET,
            "/",
            endpoint::from_fn(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                "ok"
            }),
        )
        .build(&Container::new())
        .unwrap();

    let client = TestClient::new(pipeline);
    let response = client.get("/").send().await;

    response.assert_status(401);
    let body = response.json_value().unwrap();
    assert_eq!(body["status"], 401);
    assert_eq!(body["title"], "Unauthorized");
    assert_eq!(endpoint_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn interceptor_authenticates_the_principal() {
    let pipeline = Pipeline::builder()
        .add_interceptor(interceptor::from_fn(|ctx| {
            ctx.principal_mut().authenticate();
        }))
        .add_endpoint(
            Method::GET,
            "/",
            endpoint::from_fn(|ctx: &mut RequestContext| {
                serde_json::json!({"authenticated": ctx.principal().is_authenticated()})
            }),
        )
        .build(&Container::new())
        .unwrap();

    let client = TestClient::new(pipeline);
    let response = client.get("/").send().await;

    response.assert_status(200);
    assert_eq!(
        response.json_value().unwrap(),
        serde_json::json!({"authenticated": true})
    );
}

#[tokio::test]
async fn authenticated_caller_passes_the_guard() {
    let pipeline = Pipeline::builder()
        .add_interceptor(interceptor::from_fn(|ctx| {
            if ctx.header("Authorization").is_some() {
                ctx.principal_mut().authenticate();
            }
        }))
        .add_guard(guard::from_fn(|ctx| ctx.principal().is_authenticated()))
        .add_endpoint(Method::GET, "/secret", endpoint::from_fn(|_| "s3cret"))
        .build(&Container::new())
        .unwrap();

    let client = TestClient::new(pipeline);

    let denied = client.get("/secret").send().await;
    denied.assert_status(401);

    let allowed = client.get("/secret").bearer_token("token").send().await;
    allowed.assert_status(200);
    assert_eq!(allowed.text().unwrap(), "s3cret");
}

#[tokio::test]
async fn forbidden_denial_maps_to_403() {
    let pipeline = Pipeline::builder()
        .add_guard(guard::from_fn(|_| Denial::Forbidden))
        .add_endpoint(Method::GET, "/admin", endpoint::from_fn(|_| "admin"))
        .build(&Container::new())
        .unwrap();

    let client = TestClient::new(pipeline);
    let response = client.get("/admin").send().await;

    response.assert_status(403);
    let body = response.json_value().unwrap();
    assert_eq!(body["title"], "Forbidden");
    assert_eq!(body["instance"], "/admin");
}

#[tokio::test]
async fn error_handler_turns_failures_into_problem_responses() {
    let pipeline = Pipeline::builder()
        .add_error_handler(error_handler::from_fn(|ctx, error| {
            let problem = Problem::from_error(&error).with_instance(ctx.path().to_string());
            Response::problem(&problem)
        }))
        .add_endpoint(
            Method::GET,
            "/widgets/{id}",
            endpoint::from_try_fn(|ctx: &mut RequestContext| {
                let id = ctx.param("id").unwrap_or_default().to_string();
                Err(GantryError::not_found(format!("widget {id} does not exist")))
            }),
        )
        .build(&Container::new())
        .unwrap();

    let client = TestClient::new(pipeline);
    let response = client.get("/widgets/9").send().await;

    response.assert_status(404);
    let body = response.json_value().unwrap();
    assert_eq!(body["status"], 404);
    assert_eq!(body["instance"], "/widgets/9");
    assert!(body["detail"].as_str().unwrap().contains("widget 9"));
}

#[tokio::test]
async fn unhandled_failure_is_observable_by_the_caller() {
    let pipeline = Pipeline::builder()
        .add_endpoint(
            Method::GET,
            "/",
            endpoint::from_try_fn(|_| Err(GantryError::internal("nobody caught this"))),
        )
        .build(&Container::new())
        .unwrap();

    let client = TestClient::new(pipeline);
    let err = client.get("/").try_send().await.unwrap_err();
    assert!(matches!(err, TestError::Pipeline(GantryError::Internal { .. })));
}

#[tokio::test]
async fn registration_order_is_execution_order_across_categories() {
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    let record_mw = {
        let order = Arc::clone(&order);
        middleware::from_fn(move |ctx, next| {
            let order = Arc::clone(&order);
            Box::pin(async move {
                order.lock().unwrap().push("middleware");
                next.run(ctx).await
            })
        })
    };
    let record_interceptor = {
        let order = Arc::clone(&order);
        interceptor::from_fn(move |_ctx| {
            order.lock().unwrap().push("interceptor");
        })
    };
    let record_guard = {
        let order = Arc::clone(&order);
        guard::from_fn(move |_ctx: &RequestContext| {
            order.lock().unwrap().push("guard");
            true
        })
    };
    let record_endpoint = {
        let order = Arc::clone(&order);
        endpoint::from_fn(move |_: &mut RequestContext| {
            order.lock().unwrap().push("endpoint");
            "done"
        })
    };

    let pipeline = Pipeline::builder()
        .add_middleware(record_mw)
        .add_guard(record_guard)
        .add_interceptor(record_interceptor)
        .add_endpoint(Method::GET, "/", record_endpoint)
        .build(&Container::new())
        .unwrap();

    let client = TestClient::new(pipeline);
    client.get("/").send().await.assert_status(200);

    assert_eq!(
        *order.lock().unwrap(),
        vec!["middleware", "guard", "interceptor", "endpoint"]
    );
}

#[tokio::test]
async fn service_steps_resolve_through_the_container() {
    struct AuditLog {
        entries: std::sync::Mutex<Vec<String>>,
    }

    struct AuditInterceptor;
    impl Interceptor for AuditInterceptor {
        fn name(&self) -> &'static str {
            "audit"
        }

        fn intercept<'a>(
            &'a self,
            ctx: &'a mut RequestContext,
        ) -> BoxFuture<'a, GantryResult<()>> {
            Box::pin(async move {
                ctx.set_extension("audited");
                Ok(())
            })
        }
    }

    let mut container = Container::new();
    container.register(Arc::new(AuditLog {
        entries: std::sync::Mutex::new(Vec::new()),
    }));
    container.register(Arc::new(AuditInterceptor));

    let pipeline = Pipeline::builder()
        .add_interceptor(interceptor::service::<AuditInterceptor>())
        .add_endpoint(
            Method::GET,
            "/",
            endpoint::from_fn(|ctx: &mut RequestContext| {
                if ctx.get_extension::<&str>().copied() == Some("audited") {
                    "audited"
                } else {
                    "missed"
                }
            }),
        )
        .build(&container)
        .unwrap();

    let client = TestClient::new(pipeline);
    let response = client.get("/").send().await;
    assert_eq!(response.text().unwrap(), "audited");

    let log: Arc<AuditLog> = container.resolve().unwrap();
    assert!(log.entries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn query_params_and_body_reach_the_endpoint() {
    let pipeline = Pipeline::builder()
        .add_endpoint(
            Method::POST,
            "/items/{id}",
            endpoint::from_try_fn(|ctx: &mut RequestContext| {
                let body: serde_json::Value = ctx.json_body()?;
                Reply::json(&serde_json::json!({
                    "id": ctx.param("id"),
                    "verbose": ctx.query_param("verbose"),
                    "name": body["name"],
                }))
            }),
        )
        .build(&Container::new())
        .unwrap();

    let client = TestClient::new(pipeline);
    let response = client
        .post("/items/12?verbose=yes")
        .json(&serde_json::json!({"name": "flange"}))
        .send()
        .await;

    response.assert_status(200);
    assert_eq!(
        response.json_value().unwrap(),
        serde_json::json!({"id": "12", "verbose": "yes", "name": "flange"})
    );
}
