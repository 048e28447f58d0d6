//! An HTTP server demonstrating fixed-length and chunked responses.
//!
//! Routes:
//!
//! - `/yourproblem` answers 400 with an HTML page
//! - `/myproblem` answers 500 with an HTML page
//! - `/chunked/<n>` streams `n` bytes of generated text in chunks, followed
//!   by `X-Content-Length` and `X-Content-Sha256` trailers
//! - anything else answers 200 with an HTML page

use httpfromtcp::{
    default_headers, Handler, HandlerFuture, Headers, Request, ResponseWriter, Server, ServerConfig, ServerError,
    StatusCode, DEFAULT_PORT,
};
use log::info;
use sha2::{Digest, Sha256};

const CHUNK_SIZE: usize = 32;

const YOUR_PROBLEM_RESPONSE: &str = "<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>Your request honestly kinda sucked.</p>
  </body>
</html>";

const MY_PROBLEM_RESPONSE: &str = "<html>
  <head>
    <title>500 Internal Server Error</title>
  </head>
  <body>
    <h1>Internal Server Error</h1>
    <p>Okay, you know what? This one is on me.</p>
  </body>
</html>";

const SUCCESS_RESPONSE: &str = "<html>
  <head>
    <title>200 OK</title>
  </head>
  <body>
    <h1>Success!</h1>
    <p>Your request was an absolute banger.</p>
  </body>
</html>";

struct DemoHandler;

impl DemoHandler {
    async fn html(writer: &mut ResponseWriter<'_>, status: StatusCode, page: &str) -> Result<(), ServerError> {
        let mut headers = default_headers(page.len());
        headers.set("Content-Type", "text/html");

        writer.write_status_line(status).await?;
        writer.write_headers(&headers).await?;
        writer.write_body(page.as_bytes()).await?;
        Ok(())
    }

    /// Stream `length` bytes of `abc...z` text, one chunk at a time.
    async fn chunked(writer: &mut ResponseWriter<'_>, length: usize) -> Result<(), ServerError> {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain");
        headers.set("Transfer-Encoding", "chunked");
        headers.set("Trailer", "X-Content-Length, X-Content-Sha256");
        headers.set("Connection", "close");

        writer.write_status_line(StatusCode::OK).await?;
        writer.write_headers(&headers).await?;

        let mut hasher = Sha256::new();
        let mut chunk = Vec::with_capacity(CHUNK_SIZE);
        let mut sent = 0;
        while sent < length {
            chunk.clear();
            let end = length.min(sent + CHUNK_SIZE);
            chunk.extend((sent..end).map(|i| b'a' + (i % 26) as u8));
            hasher.update(&chunk);
            writer.write_chunked_body(&chunk).await?;
            sent = end;
        }
        writer.write_chunked_body_done().await?;

        let mut trailers = Headers::new();
        trailers.set("X-Content-Length", sent.to_string());
        trailers.set("X-Content-Sha256", format!("{:x}", hasher.finalize()));
        writer.write_trailers(&trailers).await?;
        Ok(())
    }
}

impl Handler for DemoHandler {
    fn handle<'a>(&'a self, writer: &'a mut ResponseWriter<'_>, request: &'a Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let target = request.request_line.target.as_str();

            if let Some(length) = target.strip_prefix("/chunked/") {
                return match length.parse() {
                    Ok(length) => Self::chunked(writer, length).await,
                    Err(_) => Self::html(writer, StatusCode::BAD_REQUEST, YOUR_PROBLEM_RESPONSE).await,
                };
            }

            match target {
                "/yourproblem" => Self::html(writer, StatusCode::BAD_REQUEST, YOUR_PROBLEM_RESPONSE).await,
                "/myproblem" => Self::html(writer, StatusCode::INTERNAL_SERVER_ERROR, MY_PROBLEM_RESPONSE).await,
                _ => Self::html(writer, StatusCode::OK, SUCCESS_RESPONSE).await,
            }
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let port = match std::env::var("PORT") {
        Ok(port) => port.parse()?,
        Err(_) => DEFAULT_PORT,
    };

    let mut server = Server::serve(ServerConfig::with_port(port), DemoHandler).await?;
    info!("Server started on port {port}");

    tokio::signal::ctrl_c().await?;
    server.close().await?;
    info!("Server gracefully stopped");

    Ok(())
}
