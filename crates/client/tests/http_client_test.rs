#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use extract_client::HttpExtractionClient;
    use extract_core::{ExtractError, ExtractionClient, FileHandle};
    use serde_json::json;

    const ENDPOINT: &str = "/api/extract/single";

    async fn spawn_server(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn client_for(addr: SocketAddr) -> HttpExtractionClient {
        HttpExtractionClient::builder(format!("http://{addr}"))
            .request_timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    /// 模拟提取服务：读取 `file` 字段并把内容当作文本返回
    async fn echo_extract(mut multipart: Multipart) -> impl IntoResponse {
        while let Some(field) = multipart.next_field().await.unwrap() {
            if field.name() != Some("file") {
                continue;
            }
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap();
            return (
                StatusCode::OK,
                Json(json!({
                    "fileName": file_name,
                    "fileSize": bytes.len(),
                    "fileType": content_type,
                    "content": String::from_utf8_lossy(&bytes),
                    "errorMsg": null
                })),
            );
        }
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"errorMsg": "missing file field"})),
        )
    }

    #[tokio::test]
    async fn test_submit_success() {
        let addr = spawn_server(Router::new().route(ENDPOINT, post(echo_extract))).await;
        let client = client_for(addr);

        let file = FileHandle::new("notes.txt", b"hello extract".to_vec());
        let result = client.submit(&file).await.unwrap();

        assert_eq!(result.file_name.as_deref(), Some("notes.txt"));
        assert_eq!(result.file_size, Some(13));
        assert_eq!(result.file_type.as_deref(), Some("text/plain"));
        assert_eq!(result.content.as_deref(), Some("hello extract"));
        assert!(result.error_msg.is_none());
    }

    #[tokio::test]
    async fn test_custom_file_field() {
        let router = Router::new().route(
            "/extract",
            post(|mut multipart: Multipart| async move {
                let field = multipart.next_field().await.unwrap().unwrap();
                let name = field.name().unwrap_or_default().to_string();
                Json(json!({ "content": name }))
            }),
        );
        let addr = spawn_server(router).await;
        let client = HttpExtractionClient::builder(format!("http://{addr}"))
            .endpoint_path("/extract")
            .file_field("document")
            .build()
            .unwrap();

        let result = client
            .submit(&FileHandle::new("a.bin", vec![1u8, 2, 3]))
            .await
            .unwrap();
        assert_eq!(result.content.as_deref(), Some("document"));
    }

    #[tokio::test]
    async fn test_service_error_is_returned_as_value() {
        let router = Router::new().route(
            ENDPOINT,
            post(|| async { Json(json!({"fileName": "x.xyz", "errorMsg": "unsupported format"})) }),
        );
        let addr = spawn_server(router).await;

        let result = client_for(addr)
            .submit(&FileHandle::new("x.xyz", b"??".to_vec()))
            .await
            .unwrap();
        assert!(result.is_extraction_failure());
        assert_eq!(result.error_msg.as_deref(), Some("unsupported format"));
    }

    #[tokio::test]
    async fn test_missing_metadata_is_filled_from_file() {
        let router = Router::new().route(ENDPOINT, post(|| async { Json(json!({"content": "ok"})) }));
        let addr = spawn_server(router).await;

        let result = client_for(addr)
            .submit(&FileHandle::new("scan.pdf", vec![0u8; 42]))
            .await
            .unwrap();
        assert_eq!(result.file_name.as_deref(), Some("scan.pdf"));
        assert_eq!(result.file_size, Some(42));
        assert!(result.file_type.is_none());
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let long_body = "x".repeat(2000);
        let router = Router::new().route(
            ENDPOINT,
            post(move || {
                let body = long_body.clone();
                async move { (StatusCode::INTERNAL_SERVER_ERROR, body) }
            }),
        );
        let addr = spawn_server(router).await;

        let err = client_for(addr)
            .submit(&FileHandle::new("a.txt", b"a".to_vec()))
            .await
            .unwrap_err();
        match err {
            ExtractError::HttpStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.chars().count(), 512);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let router = Router::new().route(ENDPOINT, post(|| async { "<html>not json</html>" }));
        let addr = spawn_server(router).await;

        let err = client_for(addr)
            .submit(&FileHandle::new("a.txt", b"a".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Decode(_)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(addr)
            .submit(&FileHandle::new("a.txt", b"a".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Transport(_)));
    }

    #[tokio::test]
    async fn test_request_timeout_is_transport_error() {
        let router = Router::new().route(
            ENDPOINT,
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({"content": "late"}))
            }),
        );
        let addr = spawn_server(router).await;
        let client = HttpExtractionClient::builder(format!("http://{addr}"))
            .request_timeout(Duration::from_millis(200))
            .build()
            .unwrap();

        let err = client
            .submit(&FileHandle::new("slow.txt", b"a".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Transport(_)));
    }
}
