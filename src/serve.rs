// src/serve.rs
//
// Preview server: answers every HTTP request with one pre-rendered page.
// Connections are handled one at a time on the calling thread.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Ipv4Addr, TcpListener};

use crate::error::Error;

/// Largest request head read before answering anyway.
const MAX_HEAD: usize = 16 * 1024;

/// Bind `0.0.0.0:port` and serve `page` until the process is stopped.
pub fn serve(port: u16, page: &[u8]) -> Result<(), Error> {
    let listener = bind(port)?;
    let addr = listener.local_addr().map_err(|source| Error::Bind { port, source })?;
    log::info!("serving on http://localhost:{}", addr.port());
    serve_on(&listener, page);
    Ok(())
}

pub fn bind(port: u16) -> Result<TcpListener, Error> {
    TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).map_err(|source| Error::Bind { port, source })
}

/// Accept connections on `listener` forever.
pub fn serve_on(listener: &TcpListener, page: &[u8]) {
    for stream in listener.incoming() {
        let result = stream.and_then(|mut stream| {
            let peer = stream.peer_addr()?;
            log::debug!("connection from {peer}");
            respond(&mut stream, page)
        });
        if let Err(err) = result {
            log::warn!("connection failed: {err}");
        }
    }
}

/// Skip over the request head.
fn read_head<R: Read>(stream: R) -> io::Result<()> {
    let mut reader = BufReader::new(stream.take(MAX_HEAD as u64));
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line)?;
        if n == 0 || line == "\r\n" || line == "\n" {
            return Ok(());
        }
        if line.starts_with("GET ") || line.starts_with("HEAD ") {
            log::trace!("request: {}", line.trim_end());
        }
    }
}

/// Write a complete response carrying `page`, whatever was asked for.
pub(crate) fn respond<S: Read + Write>(stream: &mut S, page: &[u8]) -> io::Result<()> {
    read_head(&mut *stream)?;
    write!(
        stream,
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/html; charset=utf-8\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n",
        page.len()
    )?;
    stream.write_all(page)?;
    stream.flush()
}
