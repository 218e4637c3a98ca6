use crate::{
    generate::Generator,
    metrics::GraphMetrics,
    server::{self, MapService},
    store::SharedSnapshot,
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use netmap_k8s_scan::{parse_namespaces, Scanner};
use prometheus_client::registry::Registry;
use std::{net::SocketAddr, path::PathBuf};
use tokio::time::Duration;
use tracing::{info, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "netmap",
    about = "Maps which workloads may reach which ports under the cluster's access policies"
)]
pub struct Args {
    #[clap(long, default_value = "netmap=info,warn", env = "NETMAP_LOG")]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Path of the generated HTML page.
    #[clap(long, default_value = "network-map.html")]
    output: PathBuf,

    /// Comma-separated namespaces to scan.
    #[clap(long, default_value = "default")]
    namespaces: String,

    /// Serves the map over HTTP and regenerates it periodically.
    #[clap(long)]
    serve: bool,

    #[clap(long, default_value = "0.0.0.0:8090")]
    addr: SocketAddr,

    /// Seconds between regenerations when serving.
    #[clap(long, default_value = "300", value_parser = clap::value_parser!(u64).range(1..))]
    refresh_secs: u64,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            admin,
            output,
            namespaces,
            serve,
            addr,
            refresh_secs,
        } = self;

        let namespaces = parse_namespaces(&namespaces);
        if namespaces.is_empty() {
            bail!("no namespaces to scan");
        }

        let mut prom = <Registry>::default();
        let metrics = GraphMetrics::register(prom.sub_registry_with_prefix("graph"));

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        let snapshot = SharedSnapshot::default();
        let generator = Generator::new(
            Scanner::new(runtime.client()),
            namespaces,
            output.clone(),
            snapshot.clone(),
            metrics,
        );

        // The first map must be generated even when serving.
        generator
            .generate()
            .await
            .context("failed to generate network map")?;
        if !serve {
            return Ok(());
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        let svc = MapService::new(snapshot, &output);
        tokio::spawn(
            generator
                .refresh(Duration::from_secs(refresh_secs), runtime.shutdown_handle())
                .instrument(info_span!("refresh")),
        );
        tokio::spawn(
            server::serve(listener, svc, runtime.shutdown_handle())
                .instrument(info_span!("server")),
        );
        info!(%addr, refresh_secs, "Serving network map");

        // Block the main thread on the shutdown signal. Once it fires, wait for the background tasks to
        // complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
