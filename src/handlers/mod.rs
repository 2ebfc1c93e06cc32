pub mod form;
pub mod health_ping;
pub mod transcribe;

pub use health_ping::health_ping;
pub use transcribe::transcribe_chunk;

/// Shared helpers for handler tests: hand-rolled multipart bodies so the
/// tests exercise the same parsing path the browser hits.
#[cfg(test)]
pub(crate) mod testing {
    use actix_web::test::TestRequest;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    const BOUNDARY: &str = "---------------------------relaytestboundary";

    pub struct FormPart {
        name: String,
        filename: Option<String>,
        data: Vec<u8>,
    }

    impl FormPart {
        pub fn file(name: &str, filename: &str, data: Vec<u8>) -> Self {
            Self {
                name: name.to_string(),
                filename: Some(filename.to_string()),
                data,
            }
        }

        pub fn text(name: &str, value: &str) -> Self {
            Self {
                name: name.to_string(),
                filename: None,
                data: value.as_bytes().to_vec(),
            }
        }
    }

    /// Build a POST with a multipart/form-data body from the given parts.
    pub fn multipart_request(uri: &str, parts: Vec<FormPart>) -> TestRequest {
        let mut body: Vec<u8> = Vec::new();

        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part.filename {
                Some(filename) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                            part.name, filename
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
                }
                None => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(&part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        TestRequest::post()
            .uri(uri)
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
    }

    /// What the provider-side stub saw on the wire, parsed just enough
    /// for tests to assert on the forwarded request.
    pub struct CapturedRequest {
        pub request_line: String,
        headers: Vec<(String, String)>,
        pub body: Vec<u8>,
    }

    impl CapturedRequest {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    /// One-shot HTTP stub standing in for Deepgram: accepts a single
    /// connection, reads the full request, answers 200 with the given
    /// JSON, and goes away. Returns the base URL to point the client at.
    pub async fn spawn_provider_stub(json_body: &'static str) -> String {
        let (base_url, _) = spawn_capturing_provider_stub(json_body).await;
        base_url
    }

    /// Like [`spawn_provider_stub`], but also hands back the request the
    /// stub received so tests can check what the relay actually forwarded.
    pub async fn spawn_capturing_provider_stub(
        json_body: &'static str,
    ) -> (String, tokio::sync::oneshot::Receiver<CapturedRequest>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();

        tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };

            let mut request = Vec::new();
            let mut buf = [0u8; 8192];
            loop {
                let Ok(n) = socket.read(&mut buf).await else {
                    return;
                };
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);

                if let Some(header_end) = find_header_end(&request) {
                    let content_length = parse_content_length(&request[..header_end]);
                    if request.len() >= header_end + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                json_body.len(),
                json_body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.flush().await;

            let _ = tx.send(parse_request(&request));
        });

        (format!("http://{}", addr), rx)
    }

    fn parse_request(raw: &[u8]) -> CapturedRequest {
        let header_end = find_header_end(raw).unwrap_or(raw.len());
        let head = String::from_utf8_lossy(&raw[..header_end]);
        let mut lines = head.lines();

        let request_line = lines.next().unwrap_or_default().to_string();
        let headers = lines
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                Some((name.trim().to_string(), value.trim().to_string()))
            })
            .collect();

        CapturedRequest {
            request_line,
            headers,
            body: raw[header_end..].to_vec(),
        }
    }

    fn find_header_end(bytes: &[u8]) -> Option<usize> {
        bytes.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
    }

    fn parse_content_length(headers: &[u8]) -> usize {
        String::from_utf8_lossy(headers)
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.eq_ignore_ascii_case("content-length") {
                    value.trim().parse().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0)
    }
}
