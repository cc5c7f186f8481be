//! Streaming-body behavior under large payloads and slow consumers.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::Bytes;
    use futures::StreamExt;
    use http::StatusCode;

    use hyperbridge_model::{EnvelopeHandler, HttpRequestSpec, RequestBody};

    use crate::{client_on_current_runtime, random_bytes, spawn_object_store};

    #[tokio::test]
    async fn test_should_round_trip_large_payload() {
        let (server, _store) = spawn_object_store().await;
        let client = client_on_current_runtime();

        let payload = random_bytes(1024 * 1024);
        let put = HttpRequestSpec::builder()
            .method("PUT")
            .uri(server.uri("/bucket/large-object"))
            .body(RequestBody::from_bytes(payload.clone()))
            .build();
        let response = client.execute_collect(put).await.expect("put");
        assert_eq!(response.status, StatusCode::OK);

        let get = HttpRequestSpec::builder()
            .method("GET")
            .uri(server.uri("/bucket/large-object"))
            .build();
        let response = client.execute_collect(get).await.expect("get");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.as_ref(), payload.as_slice());

        client.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_should_not_lose_bytes_with_slow_consumer() {
        let (server, store) = spawn_object_store().await;
        let payload = Bytes::from(random_bytes(256 * 1024));
        store.insert("/bucket/slow-read".to_owned(), payload.clone());

        let client = client_on_current_runtime();
        let spec = HttpRequestSpec::builder()
            .method("GET")
            .uri(server.uri("/bucket/slow-read"))
            .build();

        let (handler, envelope) = EnvelopeHandler::new();
        let completion = client.execute(spec, Box::new(handler)).expect("execute");
        let envelope = envelope.await.expect("envelope");

        // Consume deliberately slowly; backpressure must hold bytes rather
        // than drop them.
        let mut body = envelope.body;
        let mut collected = Vec::with_capacity(payload.len());
        while let Some(chunk) = body.next().await {
            collected.extend_from_slice(&chunk.expect("chunk"));
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert_eq!(collected.as_slice(), payload.as_ref());

        completion.await.expect("completion");
        client.close().await.expect("close");
    }
}
