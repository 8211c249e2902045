//! Minimal Gantry service: an auth interceptor, a guard, and two routes.
//!
//! Run with `cargo run --example hello`, then:
//!
//! ```text
//! curl http://127.0.0.1:8080/hello/world
//! curl http://127.0.0.1:8080/whoami                     # 401
//! curl -H 'Authorization: Bearer dev' http://127.0.0.1:8080/whoami
//! ```

use gantry::prelude::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LogConfig::development())?;

    let pipeline = Pipeline::builder()
        .add_endpoint(
            Method::GET,
            "/hello/{name}",
            endpoint::from_fn(|ctx: &mut RequestContext| {
                format!("hello, {}\n", ctx.param("name").unwrap_or("stranger"))
            }),
        )
        .add_interceptor(interceptor::from_fn(|ctx| {
            if ctx.header("Authorization").is_some() {
                ctx.principal_mut().authenticate();
                ctx.principal_mut().set_claim("sub", "dev-user");
            }
        }))
        .add_guard(guard::from_fn(|ctx| ctx.principal().is_authenticated()))
        .add_endpoint(
            Method::GET,
            "/whoami",
            endpoint::from_try_fn(|ctx: &mut RequestContext| {
                Reply::json(&serde_json::json!({
                    "subject": ctx.principal().log_id(),
                    "authenticated": ctx.principal().is_authenticated(),
                }))
            }),
        )
        .build(&Container::new())?;

    Server::builder()
        .http_addr("127.0.0.1:8080")
        .pipeline(Arc::new(pipeline))
        .build()
        .run()
        .await?;

    Ok(())
}
