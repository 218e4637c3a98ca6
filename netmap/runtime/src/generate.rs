use crate::{
    metrics::GraphMetrics,
    render,
    store::{SharedSnapshot, Snapshot},
};
use anyhow::{Context, Result};
use netmap_core::NetworkGraph;
use netmap_graph::Builder;
use netmap_k8s_scan::Scanner;
use std::{path::PathBuf, sync::Arc};
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{info, instrument, warn};

/// Scans the cluster and publishes a freshly built network map.
#[derive(Clone)]
pub(crate) struct Generator {
    scanner: Scanner,
    namespaces: Vec<String>,
    publisher: Publisher,
}

/// Renders a graph, makes it the current snapshot and writes the page to disk.
#[derive(Clone)]
struct Publisher {
    output: PathBuf,
    snapshot: SharedSnapshot,
    metrics: GraphMetrics,
}

impl Generator {
    pub(crate) fn new(
        scanner: Scanner,
        namespaces: Vec<String>,
        output: PathBuf,
        snapshot: SharedSnapshot,
        metrics: GraphMetrics,
    ) -> Self {
        Self {
            scanner,
            namespaces,
            publisher: Publisher {
                output,
                snapshot,
                metrics,
            },
        }
    }

    /// Runs one generation. A build is counted once, as a success only if the page was written.
    #[instrument(skip(self), fields(namespaces = ?self.namespaces))]
    pub(crate) async fn generate(&self) -> Result<Arc<Snapshot>> {
        let resources = match self.scanner.scan(&self.namespaces).await {
            Ok(resources) => resources,
            Err(error) => {
                self.publisher.metrics.failed();
                return Err(error);
            }
        };
        let graph = Builder::new()
            .with_namespaces(resources.namespaces)
            .build(&resources.workloads, &resources.policies);
        info!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            warnings = graph.warning_details.len(),
            "Built network map"
        );
        self.publisher.publish(graph).await
    }

    /// Regenerates the map every `period` until shutdown. Failures keep the previous snapshot.
    pub(crate) async fn refresh(self, period: Duration, drain: drain::Watch) {
        let mut interval = time::interval_at(time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = drain.signaled();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    info!("Refreshing network map");
                    if let Err(error) = self.generate().await {
                        warn!(error = format!("{error:#}"), "Failed to refresh network map");
                    }
                }
                _ = &mut shutdown => return,
            }
        }
    }
}

// === impl Publisher ===

impl Publisher {
    async fn publish(&self, graph: NetworkGraph) -> Result<Arc<Snapshot>> {
        let res = self.try_publish(graph).await;
        match &res {
            Ok(_) => self.metrics.succeeded(),
            Err(_) => self.metrics.failed(),
        }
        res
    }

    async fn try_publish(&self, graph: NetworkGraph) -> Result<Arc<Snapshot>> {
        let html = render::html(&graph).context("failed to render network map")?;
        let snapshot = self.snapshot.publish(Snapshot { graph, html });
        self.metrics.published(&snapshot.graph);

        tokio::fs::write(&self.output, snapshot.html.as_bytes())
            .await
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        info!(output = %self.output.display(), "Wrote network map");
        Ok(snapshot)
    }
}
