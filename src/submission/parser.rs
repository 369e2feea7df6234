use axum::http::HeaderMap;
use percent_encoding::percent_decode;

use super::RawSubmission;

/// Parse a non-multipart request body based on Content-Type header.
/// `content_type` is expected lowercased.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<RawSubmission, String> {
    let ct = content_type.unwrap_or("application/x-www-form-urlencoded");

    if ct.contains("application/x-www-form-urlencoded") {
        Ok(parse_form_urlencoded(body))
    } else if ct.contains("multipart/form-data") {
        Err("multipart".to_string())
    } else {
        Err(format!("Unsupported content type: {ct}"))
    }
}

// Works on bytes throughout so percent-escaped non-UTF-8 survives.
fn parse_form_urlencoded(body: &[u8]) -> RawSubmission {
    RawSubmission::from_pairs(
        body.split(|b| *b == b'&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (name, value) = match pair.iter().position(|b| *b == b'=') {
                    Some(eq) => (&pair[..eq], &pair[eq + 1..]),
                    None => (pair, &pair[pair.len()..]),
                };
                (String::from_utf8_lossy(&decode_component(name)).into_owned(), decode_component(value))
            }),
    )
}

fn decode_component(input: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = input
        .iter()
        .map(|b| if *b == b'+' { b' ' } else { *b })
        .collect();
    percent_decode(&spaced).collect()
}

/// Parse multipart form data using multer. Field values are kept as bytes.
pub async fn parse_multipart(headers: &HeaderMap, body: bytes::Bytes) -> Result<RawSubmission, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut fields: Vec<(String, bytes::Bytes)> = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(format!("Multipart error: {e}")),
        };
        // Unnamed parts cannot be one of ours.
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| format!("Field read error for {name}: {e}"))?;
        fields.push((name, data));
    }

    Ok(RawSubmission::from_pairs(fields))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn decodes_urlencoded_newlines_and_plus() {
        let body = b"stacktrace=line+one%0Aline%09two&package_name=AppX&package_version=1.2";
        let raw = parse_body(Some("application/x-www-form-urlencoded"), body).unwrap();
        assert_eq!(raw.stacktrace.as_deref(), Some(&b"line one\nline\ttwo"[..]));
        assert_eq!(raw.package_name.as_deref(), Some("AppX"));
    }

    #[test]
    fn missing_content_type_is_treated_as_form() {
        let raw = parse_body(None, b"package_name=AppX").unwrap();
        assert_eq!(raw.package_name.as_deref(), Some("AppX"));
        assert_eq!(raw.stacktrace, None);
    }

    #[test]
    fn json_bodies_are_not_accepted() {
        assert!(parse_body(Some("application/json"), br#"{"stacktrace":"x"}"#).is_err());
    }

    #[test]
    fn escaped_invalid_utf8_is_decoded_bytewise() {
        let body = b"stacktrace=ab%FFcd&package_name=AppX&package_version=1.2";
        let raw = parse_body(Some("application/x-www-form-urlencoded"), body).unwrap();
        assert_eq!(raw.stacktrace.as_deref(), Some(&[b'a', b'b', 0xff, b'c', b'd'][..]));
    }

    #[test]
    fn raw_invalid_utf8_body_still_parses() {
        let mut body = b"stacktrace=ab".to_vec();
        body.push(0xff);
        body.extend_from_slice(b"cd&package_name=AppX&package_version=1.2");
        let raw = parse_body(Some("application/x-www-form-urlencoded"), &body).unwrap();
        assert_eq!(raw.stacktrace.as_deref(), Some(&[b'a', b'b', 0xff, b'c', b'd'][..]));
        assert_eq!(raw.package_version.as_deref(), Some("1.2"));
    }

    #[test]
    fn escaped_plus_and_ampersand_survive() {
        let raw = parse_body(None, b"stacktrace=a%2Bb%26c%3Dd&flag").unwrap();
        assert_eq!(raw.stacktrace.as_deref(), Some(&b"a+b&c=d"[..]));
    }

    #[tokio::test]
    async fn reads_multipart_fields() {
        let body = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"stacktrace\"\r\n\r\n\
            boom\nat main\r\n\
            --XYZ\r\n\
            Content-Disposition: form-data; name=\"package_name\"\r\n\r\n\
            AppX\r\n\
            --XYZ--\r\n";
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("multipart/form-data; boundary=XYZ"),
        );

        let raw = parse_multipart(&headers, bytes::Bytes::from(body)).await.unwrap();
        assert_eq!(raw.stacktrace.as_deref(), Some(&b"boom\nat main"[..]));
        assert_eq!(raw.package_name.as_deref(), Some("AppX"));
        assert_eq!(raw.package_version, None);
    }

    #[tokio::test]
    async fn multipart_keeps_binary_stacktrace() {
        let mut body = b"--XYZ\r\nContent-Disposition: form-data; name=\"stacktrace\"\r\n\r\n".to_vec();
        body.extend_from_slice(&[b'x', 0xff, 0x00, b'y']);
        body.extend_from_slice(b"\r\n--XYZ--\r\n");
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("multipart/form-data; boundary=XYZ"),
        );

        let raw = parse_multipart(&headers, bytes::Bytes::from(body)).await.unwrap();
        assert_eq!(raw.stacktrace.as_deref(), Some(&[b'x', 0xff, 0x00, b'y'][..]));
    }

    #[tokio::test]
    async fn multipart_without_boundary_fails() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("multipart/form-data"));
        assert!(parse_multipart(&headers, bytes::Bytes::new()).await.is_err());
    }
}
