use axum::{extract::Request, middleware::Next, response::Response};

/// Log every request, warning on client and server errors
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    tracing::debug!(method = %method, uri = %uri, "Incoming request");

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(method = %method, uri = %uri, status = %status, "Request failed");
    } else if status.is_client_error() {
        tracing::warn!(method = %method, uri = %uri, status = %status, "Request rejected");
    } else {
        tracing::debug!(method = %method, uri = %uri, status = %status, "Request completed");
    }

    response
}
