//! Close ordering, idempotence, and runtime-ownership behavior.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use http::StatusCode;

    use hyperbridge_core::{BridgeClient, BridgeConfig, RuntimeOwnership};
    use hyperbridge_model::{EnvelopeHandler, HttpRequestSpec};

    use crate::{
        client_on_current_runtime, echo_handler, hermetic_client_config, spawn_server,
        stalling_handler,
    };

    #[tokio::test]
    async fn test_should_resolve_in_flight_request_when_closed() {
        let server = spawn_server(stalling_handler).await;
        let client = client_on_current_runtime();

        let spec = HttpRequestSpec::builder()
            .method("GET")
            .uri(server.uri("/slow"))
            .build();
        let (handler, _envelope) = EnvelopeHandler::new();
        let completion = client.execute(spec, Box::new(handler)).expect("execute");

        // Let the request reach the wire, then close underneath it.
        tokio::time::sleep(Duration::from_millis(50)).await;
        client.close().await.expect("close");

        let outcome = tokio::time::timeout(Duration::from_secs(5), completion)
            .await
            .expect("in-flight request must not hang across close");
        let err = outcome.expect_err("stalled request cannot have succeeded");
        assert!(
            err.is_cancelled() || matches!(err, hyperbridge_model::BridgeError::Transport(_)),
            "expected a well-formed terminal error, got: {err}"
        );
    }

    #[tokio::test]
    async fn test_should_cancel_in_flight_request() {
        let server = spawn_server(stalling_handler).await;
        let client = client_on_current_runtime();

        let spec = HttpRequestSpec::builder()
            .method("GET")
            .uri(server.uri("/slow"))
            .build();
        let (handler, _envelope) = EnvelopeHandler::new();
        let completion = client.execute(spec, Box::new(handler)).expect("execute");

        tokio::time::sleep(Duration::from_millis(50)).await;
        completion.cancel();

        let err = tokio::time::timeout(Duration::from_secs(5), completion)
            .await
            .expect("cancellation must not hang")
            .expect_err("cancelled request must not succeed");
        assert!(err.is_cancelled());

        client.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_should_leave_borrowed_runtime_running_after_close() {
        let server = spawn_server(echo_handler).await;
        let client = client_on_current_runtime();
        assert_eq!(client.runtime_ownership(), RuntimeOwnership::Borrowed);

        let spec = HttpRequestSpec::builder()
            .method("GET")
            .uri(server.uri("/ping"))
            .build();
        client.execute_collect(spec).await.expect("response");
        client.close().await.expect("close");

        // The borrowed runtime must still schedule work...
        let joined = tokio::spawn(async { 40 + 2 }).await.expect("join");
        assert_eq!(joined, 42);

        // ...including a fresh adapter on the same runtime.
        let second = client_on_current_runtime();
        let spec = HttpRequestSpec::builder()
            .method("GET")
            .uri(server.uri("/ping"))
            .build();
        let response = second.execute_collect(spec).await.expect("response");
        assert_eq!(response.status, StatusCode::OK);
        second.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_should_close_concurrently_without_double_teardown() {
        let client = client_on_current_runtime();
        let clone = client.clone();
        let (first, second) = tokio::join!(client.close(), clone.close());
        first.expect("first close");
        second.expect("second close");
        assert!(client.is_closed());
    }

    #[test]
    fn test_should_terminate_owned_runtime_on_close() {
        // The server lives on its own runtime; the adapter gets none and
        // must lazily create, use, and then terminate its own.
        let server_runtime = tokio::runtime::Runtime::new().expect("server runtime");
        let server = server_runtime.block_on(spawn_server(echo_handler));

        let config = BridgeConfig::builder()
            .client(hermetic_client_config())
            .build();
        let client = BridgeClient::new(config).expect("client");
        assert_eq!(client.runtime_ownership(), RuntimeOwnership::Owned);

        let spec = HttpRequestSpec::builder()
            .method("GET")
            .uri(server.uri("/ping"))
            .build();
        let response =
            futures::executor::block_on(client.execute_collect(spec)).expect("response");
        assert_eq!(response.status, StatusCode::OK);

        futures::executor::block_on(client.close()).expect("close");

        let spec = HttpRequestSpec::builder()
            .method("GET")
            .uri(server.uri("/ping"))
            .build();
        let (handler, _envelope) = EnvelopeHandler::new();
        let err = client.execute(spec, Box::new(handler)).expect_err("closed");
        assert!(err.is_closed());

        drop(server);
    }
}
