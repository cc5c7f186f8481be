//! SDK-shaped object-store scenarios driven through the adapter.

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use hyperbridge_model::{HttpRequestSpec, RequestBody};

    use crate::{client_on_current_runtime, random_bytes, spawn_object_store};

    #[tokio::test]
    async fn test_should_create_bucket_write_and_read_back_object() {
        let (server, _store) = spawn_object_store().await;
        let client = client_on_current_runtime();

        let create_bucket = HttpRequestSpec::builder()
            .method("PUT")
            .uri(server.uri("/foo"))
            .build();
        let response = client.execute_collect(create_bucket).await.expect("create bucket");
        assert_eq!(response.status, StatusCode::OK);

        let payload = random_bytes(1000);
        let put_object = HttpRequestSpec::builder()
            .method("PUT")
            .uri(server.uri("/foo/my-file"))
            .header("content-type", "application/octet-stream")
            .body(RequestBody::from_bytes(payload.clone()))
            .build();
        let response = client.execute_collect(put_object).await.expect("put object");
        assert_eq!(response.status, StatusCode::OK);

        let get_object = HttpRequestSpec::builder()
            .method("GET")
            .uri(server.uri("/foo/my-file"))
            .build();
        let response = client.execute_collect(get_object).await.expect("get object");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.body.as_ref(),
            payload.as_slice(),
            "read bytes must equal written bytes"
        );

        client.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_should_deliver_not_found_without_retrying() {
        let (server, _store) = spawn_object_store().await;
        let client = client_on_current_runtime();

        let get_missing = HttpRequestSpec::builder()
            .method("GET")
            .uri(server.uri("/foo/absent"))
            .build();
        let response = client.execute_collect(get_missing).await.expect("response");
        assert_eq!(response.status, StatusCode::NOT_FOUND);

        client.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_should_delete_object() {
        let (server, store) = spawn_object_store().await;
        let client = client_on_current_runtime();

        store.insert("/foo/tmp".to_owned(), bytes::Bytes::from_static(b"x"));
        let delete = HttpRequestSpec::builder()
            .method("DELETE")
            .uri(server.uri("/foo/tmp"))
            .build();
        let response = client.execute_collect(delete).await.expect("delete");
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert!(store.get("/foo/tmp").is_none());

        client.close().await.expect("close");
    }
}
