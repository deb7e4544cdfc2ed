//! Endpoint handlers of the reference application.

use std::sync::Arc;

use axum::http::header::{self, HeaderValue};
use axum::http::StatusCode;

use crate::http::{BoxFuture, Context, Endpoint, HandlerError, HandlerResult};
use crate::services::{Customer, CustomerRepository};

/// `GET /`
pub fn hello(ctx: &mut Context) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        ctx.write_text("Hello");
        Ok(())
    })
}

/// `GET /customers/{id:int}`
pub struct GetCustomer {
    repository: Arc<dyn CustomerRepository>,
}

impl GetCustomer {
    pub fn new(repository: Arc<dyn CustomerRepository>) -> Self {
        Self { repository }
    }
}

impl Endpoint for GetCustomer {
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            // Guaranteed by the `int` constraint unless registered under another template.
            let id: i32 = ctx
                .param_as("id")
                .ok_or_else(|| HandlerError::Internal("route has no integer `id` param".into()))?;

            let customer = self.repository.get(id);
            tracing::debug!(customer_id = id, "Customer loaded");
            ctx.write_json(&customer).map_err(HandlerError::Serialize)
        })
    }
}

/// `POST A`: echo a customer back as JSON with 201.
pub fn create_customer(ctx: &mut Context) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let customer: Customer = ctx.body_mut().json().await?;
        ctx.set_status(StatusCode::CREATED);
        ctx.write_json(&customer).map_err(HandlerError::Serialize)
    })
}

/// `POST B`: echo the raw body, byte for byte.
pub fn echo_body(ctx: &mut Context) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let body = ctx.body_mut().bytes().await?;
        ctx.set_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        ctx.write(body);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::FakeCustomerRepository;
    use axum::http::Method;

    #[tokio::test]
    async fn test_create_customer_rejects_missing_fields() {
        let mut ctx = Context::new(Method::POST, "/A").with_body(r#"{"FirstName":"X"}"#, 1024);
        let err = create_customer(&mut ctx).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ctx.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_customer_without_param() {
        let handler = GetCustomer::new(Arc::new(FakeCustomerRepository));
        let mut ctx = Context::new(Method::GET, "/customers/1");
        let err = handler.call(&mut ctx).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_echo_body() {
        let mut ctx = Context::new(Method::POST, "/B").with_body("plain text", 1024);
        echo_body(&mut ctx).await.unwrap();
        assert_eq!(ctx.output().as_bytes(), b"plain text");
        assert_eq!(ctx.response_headers()[header::CONTENT_TYPE], "text/plain");
    }

    #[tokio::test]
    async fn test_echo_body_keeps_invalid_utf8() {
        let mut ctx = Context::new(Method::POST, "/B").with_body(vec![0xff, 0x41, 0xfe], 1024);
        echo_body(&mut ctx).await.unwrap();
        assert_eq!(ctx.status(), StatusCode::OK);
        assert_eq!(ctx.output().as_bytes(), &[0xff, 0x41, 0xfe]);
    }
}
