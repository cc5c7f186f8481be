//! End-to-end request/response round-trips through the adapter.

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;

    use hyperbridge_model::{BoxError, EnvelopeHandler, HttpRequestSpec, RequestBody};

    use crate::{client_on_current_runtime, echo_handler, spawn_server};

    #[tokio::test]
    async fn test_should_round_trip_method_headers_and_body() {
        let server = spawn_server(echo_handler).await;
        let client = client_on_current_runtime();

        let spec = HttpRequestSpec::builder()
            .method("PUT")
            .uri(server.uri("/upload"))
            .header("content-type", "application/octet-stream")
            .header("x-amz-meta-rev", "1")
            .header("x-amz-meta-rev", "2")
            .body(RequestBody::from_bytes("hello, bridge"))
            .build();

        let response = client.execute_collect(spec).await.expect("response");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.headers.get("x-echo-method").expect("header"),
            "PUT"
        );
        assert_eq!(
            response.headers.get("x-echo-meta-count").expect("header"),
            "2",
            "duplicate headers must reach the wire in order"
        );
        assert_eq!(
            response.headers.get("x-echo-content-type").expect("header"),
            "application/octet-stream"
        );
        assert_eq!(response.body.as_ref(), b"hello, bridge");

        client.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_should_stream_request_body_without_buffering() {
        let server = spawn_server(echo_handler).await;
        let client = client_on_current_runtime();

        let payload: Vec<u8> = (0..16u8).flat_map(|i| vec![i; 1024]).collect();
        let chunks = futures::stream::iter(
            (0..16u8).map(|i| Ok::<_, BoxError>(Bytes::from(vec![i; 1024]))),
        );
        let spec = HttpRequestSpec::builder()
            .method("POST")
            .uri(server.uri("/upload"))
            .body(RequestBody::from_stream(chunks, None))
            .build();

        let response = client.execute_collect(spec).await.expect("response");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.as_ref(), payload.as_slice());

        client.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_should_deliver_headers_before_body() {
        let server = spawn_server(echo_handler).await;
        let client = client_on_current_runtime();

        let spec = HttpRequestSpec::builder()
            .method("PUT")
            .uri(server.uri("/ordered"))
            .body(RequestBody::from_bytes("payload"))
            .build();

        let (handler, envelope) = EnvelopeHandler::new();
        let completion = client.execute(spec, Box::new(handler)).expect("execute");

        // The envelope resolves on headers, before the body is consumed.
        let envelope = envelope.await.expect("envelope");
        assert_eq!(envelope.status, StatusCode::OK);
        assert!(envelope.headers.contains_key("x-echo-method"));

        let body = envelope.body.collect().await.expect("body");
        assert_eq!(body.as_ref(), b"payload");

        completion.await.expect("completion");
        client.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_should_handle_empty_response_body() {
        let server = spawn_server(echo_handler).await;
        let client = client_on_current_runtime();

        let spec = HttpRequestSpec::builder()
            .method("GET")
            .uri(server.uri("/empty"))
            .build();
        let response = client.execute_collect(spec).await.expect("response");
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.is_empty());

        client.close().await.expect("close");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_should_run_concurrent_requests_independently() {
        let server = spawn_server(echo_handler).await;
        let client = client_on_current_runtime();

        let requests = (0..8u8).map(|i| {
            let client = client.clone();
            let uri = server.uri("/concurrent");
            async move {
                let payload = vec![i; 64];
                let spec = HttpRequestSpec::builder()
                    .method("PUT")
                    .uri(uri)
                    .body(RequestBody::from_bytes(payload.clone()))
                    .build();
                let response = client.execute_collect(spec).await.expect("response");
                assert_eq!(response.body.as_ref(), payload.as_slice());
            }
        });
        futures::future::join_all(requests).await;

        client.close().await.expect("close");
    }
}
