//! Error propagation through the adapter's synchronous and asynchronous
//! paths.

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use hyperbridge_core::{BridgeClient, BridgeConfig};
    use hyperbridge_http::ClientConfig;
    use hyperbridge_model::{BridgeError, ConfigurationError, EnvelopeHandler, HttpRequestSpec};

    use crate::{client_on_current_runtime, echo_handler, spawn_server};

    /// A localhost address with nothing listening on it.
    fn dead_endpoint() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn test_should_surface_connection_refused_as_transport_error() {
        let client = client_on_current_runtime();

        let spec = HttpRequestSpec::builder()
            .method("GET")
            .uri(dead_endpoint())
            .build();
        let err = client.execute_collect(spec).await.expect_err("must fail");
        assert!(matches!(err, BridgeError::Transport(_)));

        client.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_should_fail_zero_pool_size_before_any_network_call() {
        let config = BridgeConfig::builder()
            .client(ClientConfig::builder().max_connections(0).build())
            .build();
        let err = BridgeClient::new(config).expect_err("must fail");
        assert!(matches!(
            err,
            BridgeError::Configuration(ConfigurationError::InvalidPoolSize)
        ));
    }

    #[tokio::test]
    async fn test_should_reject_unsupported_method_before_any_io() {
        let client = client_on_current_runtime();

        let spec = HttpRequestSpec::builder()
            .method("BREW")
            .uri("http://127.0.0.1:1/")
            .build();
        let (handler, _envelope) = EnvelopeHandler::new();
        let err = client.execute(spec, Box::new(handler)).expect_err("must fail");
        assert!(matches!(err, BridgeError::Translation(_)));

        client.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_should_keep_other_requests_healthy_after_failure() {
        let server = spawn_server(echo_handler).await;
        let client = client_on_current_runtime();

        let failing = HttpRequestSpec::builder()
            .method("GET")
            .uri(dead_endpoint())
            .build();
        let healthy = HttpRequestSpec::builder()
            .method("GET")
            .uri(server.uri("/ping"))
            .build();

        let (failed, succeeded) = tokio::join!(
            client.execute_collect(failing),
            client.execute_collect(healthy),
        );
        failed.expect_err("dead endpoint must fail");
        let response = succeeded.expect("healthy endpoint must succeed");
        assert_eq!(response.status, StatusCode::OK);

        client.close().await.expect("close");
    }
}
