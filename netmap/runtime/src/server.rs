use crate::store::SharedSnapshot;
use anyhow::{Context, Result};
use bytes::Bytes;
use hyper::{
    body::Incoming, header, server::conn::http1, service::service_fn, Method, Request,
    Response, StatusCode,
};
use hyper_util::rt::TokioIo;
use netmap_core::NetworkGraph;
use netmap_graph::{warning_rows, WARNING_COLUMNS};
use std::{path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing::{debug, info, trace};

type Body = http_body_util::Full<Bytes>;

/// Serves the most recent network map.
#[derive(Clone, Debug)]
pub(crate) struct MapService {
    snapshot: SharedSnapshot,

    /// The output file's name as a request path, e.g. `/network-map.html`.
    page_path: Option<Arc<str>>,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("failed to encode graph: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode warnings: {0}")]
    Csv(#[from] csv::Error),
}

/// Accepts connections until shutdown is signaled. In-flight connections are closed gracefully.
pub(crate) async fn serve(listener: TcpListener, svc: MapService, drain: drain::Watch) -> Result<()> {
    let addr = listener.local_addr().context("failed to read listener address")?;
    info!(%addr, "Network map server listening");

    let shutdown = drain.clone().signaled();
    tokio::pin!(shutdown);
    loop {
        let (socket, client) = tokio::select! {
            res = listener.accept() => match res {
                Ok(conn) => conn,
                Err(error) => {
                    debug!(%error, "Failed to accept connection");
                    continue;
                }
            },
            _ = &mut shutdown => return Ok(()),
        };
        trace!(%client, "Accepted");

        let svc = svc.clone();
        let drain = drain.clone();
        tokio::spawn(async move {
            let conn = http1::Builder::new().serve_connection(
                TokioIo::new(socket),
                service_fn(move |req: Request<Incoming>| {
                    let svc = svc.clone();
                    async move { svc.handle(&req) }
                }),
            );
            tokio::pin!(conn);
            let res = tokio::select! {
                res = &mut conn => res,
                handle = drain.signaled() => {
                    conn.as_mut().graceful_shutdown();
                    handle.release_after(conn).await
                }
            };
            if let Err(error) = res {
                debug!(%error, %client, "Connection failed");
            }
        });
    }
}

// === impl MapService ===

impl MapService {
    pub(crate) fn new(snapshot: SharedSnapshot, output: &Path) -> Self {
        let page_path = output
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| format!("/{name}").into());
        Self {
            snapshot,
            page_path,
        }
    }

    pub(crate) fn handle<B>(&self, req: &Request<B>) -> Result<Response<Body>, Error> {
        trace!(method = %req.method(), path = req.uri().path(), "Request");
        if req.method() != Method::GET && req.method() != Method::HEAD {
            return Ok(status(StatusCode::METHOD_NOT_ALLOWED));
        }

        let path = req.uri().path();
        if path == "/healthz" {
            return Ok(respond(StatusCode::OK, "text/plain", Bytes::from_static(b"ok")));
        }
        if path != "/"
            && path != "/warnings.csv"
            && path != "/graph.json"
            && self.page_path.as_deref() != Some(path)
        {
            return Ok(status(StatusCode::NOT_FOUND));
        }

        let Some(snapshot) = self.snapshot.current() else {
            return Ok(respond(
                StatusCode::SERVICE_UNAVAILABLE,
                "text/plain",
                Bytes::from_static(b"Graph not yet generated"),
            ));
        };

        match path {
            "/warnings.csv" => {
                let csv = warnings_csv(&snapshot.graph)?;
                let mut rsp = respond(StatusCode::OK, "text/csv", csv.into());
                rsp.headers_mut().insert(
                    header::CONTENT_DISPOSITION,
                    header::HeaderValue::from_static("attachment; filename=warnings.csv"),
                );
                Ok(rsp)
            }
            "/graph.json" => {
                let json = serde_json::to_vec(&snapshot.graph)?;
                Ok(respond(StatusCode::OK, "application/json", json.into()))
            }
            _ => Ok(respond(
                StatusCode::OK,
                "text/html; charset=utf-8",
                Bytes::copy_from_slice(snapshot.html.as_bytes()),
            )),
        }
    }
}

/// Encodes the graph's warning details as CSV with a header row.
pub(crate) fn warnings_csv(graph: &NetworkGraph) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(WARNING_COLUMNS)?;
    for row in warning_rows(graph) {
        writer.write_record(row.cells())?;
    }
    writer
        .into_inner()
        .map_err(|error| csv::Error::from(error.into_error()))
}

fn respond(code: StatusCode, content_type: &'static str, body: Bytes) -> Response<Body> {
    Response::builder()
        .status(code)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::new(body))
        .expect("response must be valid")
}

fn status(code: StatusCode) -> Response<Body> {
    Response::builder()
        .status(code)
        .body(Body::default())
        .expect("status response must be valid")
}
