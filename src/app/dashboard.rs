//! Dashboard sub-application.
//!
//! Mounted under a prefix; answers every path below it with one HTML page.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::http::{BoxFuture, Context, HandlerResult, Middleware, Next, Pipeline};
use crate::services::ContentProvider;

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub title: String,
}

/// Terminal middleware rendering the dashboard page.
pub struct DashboardMiddleware {
    options: DashboardOptions,
    content: Arc<dyn ContentProvider>,
}

impl DashboardMiddleware {
    pub fn new(options: DashboardOptions, content: Arc<dyn ContentProvider>) -> Self {
        Self { options, content }
    }
}

impl Middleware for DashboardMiddleware {
    fn handle<'a>(&'a self, ctx: &'a mut Context, _next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let page = render(&self.options.title, &self.content.get());
            ctx.set_status(StatusCode::OK);
            ctx.write_html(page);
            Ok(())
        })
    }
}

/// The dashboard pipeline, ready to mount.
pub fn pipeline(options: DashboardOptions, content: Arc<dyn ContentProvider>) -> Pipeline {
    Pipeline::builder()
        .layer(DashboardMiddleware::new(options, content))
        .build()
}

/// Title is escaped; content is trusted markup.
pub fn render(title: &str, content: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        escape_html(title),
        content
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
