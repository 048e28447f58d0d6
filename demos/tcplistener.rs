//! Accepts TCP connections and prints each parsed request.

use httpfromtcp::{request_from_reader, DEFAULT_PORT};
use log::{error, info};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let listener = TcpListener::bind(("0.0.0.0", DEFAULT_PORT)).await?;
    info!("Listening on {addr}", addr = listener.local_addr()?);

    loop {
        let (mut socket, addr) = listener.accept().await?;
        info!("Connection accepted from {addr}");

        tokio::spawn(async move {
            match request_from_reader(&mut socket, 8).await {
                Ok(request) => println!("{request}"),
                Err(e) => error!("Error processing request from {addr}: {e}"),
            }
        });
    }
}
