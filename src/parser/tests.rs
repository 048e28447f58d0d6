//! Tests for the HTTP parser.

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, ReadBuf};

    use crate::parser::{request_from_reader, Error, Headers, HttpVersion, Method, ParserState, ReadBuffer, Request};

    /// A reader that hands out at most `chunk_size` bytes per read.
    struct ChunkReader {
        data: Cursor<Vec<u8>>,
        chunk_size: usize,
    }

    impl ChunkReader {
        fn new(data: impl Into<Vec<u8>>, chunk_size: usize) -> Self {
            Self {
                data: Cursor::new(data.into()),
                chunk_size,
            }
        }
    }

    impl AsyncRead for ChunkReader {
        fn poll_read(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            let unfilled = buf.initialize_unfilled();
            let limit = unfilled.len().min(this.chunk_size);
            let n = std::io::Read::read(&mut this.data, &mut unfilled[..limit])?;
            buf.advance(n);
            Poll::Ready(Ok(()))
        }
    }

    /// A reader whose every read fails.
    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer")))
        }
    }

    const GET_REQUEST: &[u8] = b"GET / HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";

    const POST_REQUEST: &[u8] = b"POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 13\r\n\r\nhello world!\n";

    fn feed_all(request: &mut Request, data: &[u8]) -> Result<usize, Error> {
        let mut offset = 0;
        while !request.is_done() {
            let consumed = request.feed(&data[offset..])?;
            if consumed == 0 {
                break;
            }
            offset += consumed;
        }
        Ok(offset)
    }

    // Headers

    #[test]
    fn test_valid_single_header() {
        let mut headers = Headers::new();
        let (n, done) = headers.parse(b"Host: localhost:42069\r\n\r\n").unwrap();
        assert_eq!(headers.get("host"), Some("localhost:42069"));
        assert_eq!(n, 23);
        assert!(!done);
    }

    #[test]
    fn test_header_without_crlf_needs_more_data() {
        let mut headers = Headers::new();
        let (n, done) = headers.parse(b"Host: localhost:42069").unwrap();
        assert_eq!(n, 0);
        assert!(!done);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_header_with_extra_whitespace() {
        let mut headers = Headers::new();
        let (n, done) = headers.parse(b" Host:   localhost:42069  \r\n\r\n").unwrap();
        assert_eq!(headers.get("host"), Some("localhost:42069"));
        assert_eq!(n, 28);
        assert!(!done);
    }

    #[test]
    fn test_header_block_end() {
        let mut headers = Headers::new();
        let (n, done) = headers.parse(b"\r\nleftover").unwrap();
        assert_eq!(n, 2);
        assert!(done);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_two_headers_one_line_at_a_time() {
        let mut headers = Headers::new();
        let data = b"Host: localhost:42069\r\nFoo: Bar\r\n\r\n";

        let (n1, done) = headers.parse(data).unwrap();
        assert_eq!(n1, 23);
        assert!(!done);

        let (n2, done) = headers.parse(&data[n1..]).unwrap();
        assert_eq!(n2, 10);
        assert!(!done);

        let (n3, done) = headers.parse(&data[n1 + n2..]).unwrap();
        assert_eq!(n3, 2);
        assert!(done);

        assert_eq!(headers.get("foo"), Some("Bar"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_repeated_header_is_merged() {
        let mut headers = Headers::new();
        let data = b"Host: localhost:42069\r\nhOsT: localhost:42070\r\n\r\n";
        let (n, _) = headers.parse(data).unwrap();
        headers.parse(&data[n..]).unwrap();

        assert_eq!(headers.get("Host"), Some("localhost:42069, localhost:42070"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_header_keys_are_lowercased() {
        let mut headers = Headers::new();
        headers.parse(b"Content-TYPE: text/plain\r\n").unwrap();
        let keys: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["content-type"]);
        assert_eq!(headers.get("CONTENT-type"), Some("text/plain"));
    }

    #[test]
    fn test_header_value_with_colons() {
        let mut headers = Headers::new();
        headers.parse(b"X-Test: value:with:colons\r\n").unwrap();
        assert_eq!(headers.get("x-test"), Some("value:with:colons"));
    }

    #[test]
    fn test_header_without_colon_is_rejected() {
        let mut headers = Headers::new();
        let result = headers.parse(b"Foo Bar\r\n\r\n");
        assert!(matches!(result, Err(Error::MalformedHeader(_))));
        assert!(headers.is_empty());
    }

    #[test]
    fn test_header_with_space_before_colon_is_rejected() {
        let mut headers = Headers::new();
        let result = headers.parse(b"       Host : localhost:42069       \r\n\r\n");
        assert!(matches!(result, Err(Error::HeaderKeyTrailingWhitespace(_))));
    }

    #[test]
    fn test_header_with_invalid_key_character_is_rejected() {
        let mut headers = Headers::new();
        let result = headers.parse("H©st: localhost:42069\r\n\r\n".as_bytes());
        assert!(matches!(result, Err(Error::InvalidHeaderKey(_))));
    }

    #[test]
    fn test_header_with_empty_key_is_rejected() {
        let mut headers = Headers::new();
        let result = headers.parse(b": no-name\r\n");
        assert!(matches!(result, Err(Error::InvalidHeaderKey(_))));
    }

    #[test]
    fn test_header_key_token_symbols_are_accepted() {
        let mut headers = Headers::new();
        headers.parse(b"X-!#$%&'*+-.^_`|~: ok\r\n").unwrap();
        assert_eq!(headers.get("x-!#$%&'*+-.^_`|~"), Some("ok"));
    }

    #[test]
    fn test_headers_set_replaces_and_append_merges() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain");
        headers.set("content-type", "text/html");
        assert_eq!(headers.get("Content-Type"), Some("text/html"));

        headers.append("Accept", "text/html");
        headers.append("ACCEPT", "application/json");
        assert_eq!(headers.get("accept"), Some("text/html, application/json"));

        assert_eq!(headers.remove("Accept"), Some("text/html, application/json".to_string()));
        assert!(!headers.contains("accept"));
    }

    // Request line

    #[test]
    fn test_method_must_be_uppercase_letters() {
        assert_eq!("PROPFIND".parse::<Method>().unwrap(), "PROPFIND");
        assert!(matches!("Get".parse::<Method>(), Err(Error::InvalidMethod(_))));
        assert!(matches!("GET1".parse::<Method>(), Err(Error::InvalidMethod(_))));
        assert!(matches!("".parse::<Method>(), Err(Error::InvalidMethod(_))));
    }

    #[test]
    fn test_only_http11_is_supported() {
        assert_eq!("HTTP/1.1".parse::<HttpVersion>().unwrap(), HttpVersion::Http11);
        assert_eq!(HttpVersion::Http11.as_str(), "1.1");
        assert!(matches!("HTTP/1.0".parse::<HttpVersion>(), Err(Error::UnsupportedVersion(_))));
        assert!(matches!("HTTP/2".parse::<HttpVersion>(), Err(Error::UnsupportedVersion(_))));
    }

    #[test]
    fn test_request_line_is_parsed() {
        let mut request = Request::new();
        let consumed = request.feed(b"GET /coffee HTTP/1.1\r\nHost: x\r\n").unwrap();
        assert_eq!(consumed, 22);
        assert_eq!(request.state(), ParserState::ParsingHeaders);
        assert_eq!(request.request_line.method, "GET");
        assert_eq!(request.request_line.target, "/coffee");
        assert_eq!(request.request_line.version, HttpVersion::Http11);
    }

    #[test]
    fn test_partial_request_line_needs_more_data() {
        let mut request = Request::new();
        assert_eq!(request.feed(b"GET /coffee HTTP/1.").unwrap(), 0);
        assert_eq!(request.state(), ParserState::Initialized);
    }

    #[test]
    fn test_request_line_with_wrong_field_count() {
        for line in [&b"GET /\r\n"[..], b"GET / HTTP/1.1 extra\r\n", b"/coffee HTTP/1.1\r\n"] {
            let mut request = Request::new();
            let result = request.feed(line);
            assert!(matches!(result, Err(Error::MalformedRequestLine(_))), "{result:?}");
        }
    }

    #[test]
    fn test_request_line_with_lowercase_method() {
        let mut request = Request::new();
        let result = request.feed(b"get / HTTP/1.1\r\n");
        assert!(matches!(result, Err(Error::InvalidMethod(ref m)) if m == "get"));
        assert_eq!(request.state(), ParserState::Initialized);
    }

    #[test]
    fn test_request_line_with_unsupported_version() {
        let mut request = Request::new();
        let result = request.feed(b"GET / HTTP/1.0\r\n");
        assert!(matches!(result, Err(Error::UnsupportedVersion(ref v)) if v == "HTTP/1.0"));
    }

    #[test]
    fn test_request_target_is_not_decoded() {
        let mut request = Request::new();
        request.feed(b"GET /a%20b?x=1&y=%2F HTTP/1.1\r\n").unwrap();
        assert_eq!(request.request_line.target, "/a%20b?x=1&y=%2F");
    }

    // Full requests

    #[test]
    fn test_get_without_body() {
        let mut request = Request::new();
        let consumed = feed_all(&mut request, GET_REQUEST).unwrap();
        assert_eq!(consumed, GET_REQUEST.len());
        assert!(request.is_done());
        assert_eq!(request.headers.get("host"), Some("localhost:42069"));
        assert_eq!(request.headers.get("user-agent"), Some("curl/7.81.0"));
        assert_eq!(request.headers.get("accept"), Some("*/*"));
        assert!(request.body.is_none());
        assert_eq!(request.content_length(), None);
    }

    #[test]
    fn test_post_with_body() {
        let mut request = Request::new();
        feed_all(&mut request, POST_REQUEST).unwrap();
        assert!(request.is_done());
        assert_eq!(request.body.as_deref(), Some(&b"hello world!\n"[..]));
        assert_eq!(request.content_length(), Some(13));
    }

    #[test]
    fn test_zero_content_length_is_done_with_empty_body() {
        let mut request = Request::new();
        feed_all(&mut request, b"POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n").unwrap();
        assert!(request.is_done());
        assert_eq!(request.body, Some(Vec::new()));
    }

    #[test]
    fn test_invalid_content_length() {
        for value in ["abc", "-1", "1.5", ""] {
            let raw = format!("POST / HTTP/1.1\r\nContent-Length: {value}\r\n\r\n");
            let mut request = Request::new();
            let result = feed_all(&mut request, raw.as_bytes());
            assert!(matches!(result, Err(Error::InvalidContentLength(_))), "{value}: {result:?}");
        }
    }

    #[test]
    fn test_body_longer_than_content_length() {
        let mut request = Request::new();
        let raw = b"POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nhello";
        let result = feed_all(&mut request, raw);
        assert!(matches!(
            result,
            Err(Error::BodyTooLarge { declared: 3, read: 0, received: 5 })
        ));
    }

    #[test]
    fn test_huge_content_length_is_not_preallocated() {
        for declared in [1_000_000_000_000_000_usize, usize::MAX] {
            let raw = format!("POST / HTTP/1.1\r\nContent-Length: {declared}\r\n\r\nabc");
            let mut request = Request::new();
            feed_all(&mut request, raw.as_bytes()).unwrap();
            assert_eq!(request.state(), ParserState::ParsingBody);
            assert_eq!(request.content_length(), Some(declared));
            assert_eq!(request.body.as_deref(), Some(&b"abc"[..]));
        }
    }

    #[test]
    fn test_short_body_waits_for_more() {
        let mut request = Request::new();
        let raw = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhel";
        feed_all(&mut request, raw).unwrap();
        assert_eq!(request.state(), ParserState::ParsingBody);

        assert_eq!(request.feed(b"lo").unwrap(), 2);
        assert!(request.is_done());
        assert_eq!(request.body.as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn test_feed_after_done_is_an_error() {
        let mut request = Request::new();
        feed_all(&mut request, GET_REQUEST).unwrap();
        assert!(matches!(request.feed(b"GET / HTTP/1.1\r\n"), Err(Error::ParseAfterDone)));
        assert!(matches!(request.feed(b""), Err(Error::ParseAfterDone)));
    }

    #[test]
    fn test_display_renders_request() {
        let mut request = Request::new();
        feed_all(&mut request, b"POST /submit HTTP/1.1\r\nContent-Length: 2\r\n\r\nhi").unwrap();
        let rendered = request.to_string();
        assert_eq!(
            rendered,
            "Request line:\n- Method: POST\n- Target: /submit\n- Version: 1.1\nHeaders:\n- content-length: 2\nBody:\nhi\n"
        );
    }

    // Buffer

    #[test]
    fn test_read_buffer_grows_and_compacts() {
        let mut buffer = ReadBuffer::with_capacity(4);
        buffer.unfilled_mut()[..4].copy_from_slice(b"abcd");
        buffer.advance(4);
        assert_eq!(buffer.capacity(), 4);

        let tail = buffer.unfilled_mut();
        assert_eq!(tail.len(), 4);
        tail[..2].copy_from_slice(b"ef");
        buffer.advance(2);
        assert_eq!(buffer.capacity(), 8);
        assert_eq!(buffer.filled(), b"abcdef");

        buffer.consume(3);
        assert_eq!(buffer.filled(), b"def");
        buffer.consume(3);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_read_buffer_zero_capacity_is_usable() {
        let mut buffer = ReadBuffer::with_capacity(0);
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.unfilled_mut().len(), 1);
    }

    // Reader

    #[tokio::test]
    async fn test_reader_single_read() {
        let mut reader = ChunkReader::new(POST_REQUEST, POST_REQUEST.len());
        let request = request_from_reader(&mut reader, 1024).await.unwrap();
        assert!(request.is_done());
        assert_eq!(request.request_line.method, "POST");
        assert_eq!(request.request_line.target, "/submit");
        assert_eq!(request.body.as_deref(), Some(&b"hello world!\n"[..]));
    }

    #[tokio::test]
    async fn test_reader_any_read_size_gives_same_request() {
        let mut reference_reader = ChunkReader::new(POST_REQUEST, POST_REQUEST.len());
        let reference = request_from_reader(&mut reference_reader, 1024).await.unwrap();

        for chunk_size in [1, 2, 3, 7, 8, 16, 33] {
            for initial_capacity in [1, 8, 1024] {
                let mut reader = ChunkReader::new(POST_REQUEST, chunk_size);
                let request = request_from_reader(&mut reader, initial_capacity).await.unwrap();
                assert_eq!(request.request_line, reference.request_line);
                assert_eq!(request.headers, reference.headers);
                assert_eq!(request.body, reference.body);
            }
        }
    }

    #[tokio::test]
    async fn test_reader_long_header_with_tiny_buffer() {
        let long_value = "x".repeat(500);
        let raw = format!("GET / HTTP/1.1\r\nX-Long: {long_value}\r\n\r\n");
        let mut reader = ChunkReader::new(raw.into_bytes(), 3);
        let request = request_from_reader(&mut reader, 8).await.unwrap();
        assert_eq!(request.headers.get("x-long"), Some(long_value.as_str()));
    }

    #[tokio::test]
    async fn test_reader_short_body_is_incomplete() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nabc";
        let mut reader = ChunkReader::new(&raw[..], 4);
        let result = request_from_reader(&mut reader, 8).await;
        assert!(matches!(
            result,
            Err(Error::IncompleteRequest { state: ParserState::ParsingBody, .. })
        ));
    }

    #[tokio::test]
    async fn test_reader_huge_content_length_with_short_body_is_incomplete() {
        let raw = "POST / HTTP/1.1\r\nContent-Length: 1000000000000000\r\n\r\nabc";
        let mut reader = ChunkReader::new(raw.as_bytes(), 8);
        let result = request_from_reader(&mut reader, 8).await;
        assert!(matches!(
            result,
            Err(Error::IncompleteRequest { state: ParserState::ParsingBody, buffered: 0 })
        ));
    }

    #[tokio::test]
    async fn test_reader_exact_body_is_done() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nabcde";
        let mut reader = ChunkReader::new(&raw[..], 4);
        let request = request_from_reader(&mut reader, 8).await.unwrap();
        assert_eq!(request.state(), ParserState::Done);
        assert_eq!(request.body.as_deref(), Some(&b"abcde"[..]));
    }

    #[tokio::test]
    async fn test_reader_empty_stream_is_incomplete() {
        let mut reader = ChunkReader::new(Vec::new(), 8);
        let result = request_from_reader(&mut reader, 8).await;
        assert!(matches!(
            result,
            Err(Error::IncompleteRequest { state: ParserState::Initialized, buffered: 0 })
        ));
    }

    #[tokio::test]
    async fn test_reader_missing_blank_line_is_incomplete() {
        let raw = b"GET / HTTP/1.1\r\nHost: localhost\r\n";
        let mut reader = ChunkReader::new(&raw[..], 5);
        let result = request_from_reader(&mut reader, 8).await;
        assert!(matches!(
            result,
            Err(Error::IncompleteRequest { state: ParserState::ParsingHeaders, .. })
        ));
    }

    #[tokio::test]
    async fn test_reader_reports_malformed_input() {
        let raw = b"GET / HTTP/1.1\r\nBad Header\r\n\r\n";
        let mut reader = ChunkReader::new(&raw[..], 1);
        let result = request_from_reader(&mut reader, 4).await;
        assert!(matches!(result, Err(Error::MalformedHeader(_))));
    }

    #[tokio::test]
    async fn test_reader_transport_error() {
        let result = request_from_reader(&mut FailingReader, 8).await;
        assert!(matches!(result, Err(Error::Io(ref e)) if e.kind() == io::ErrorKind::ConnectionReset));
    }
}
