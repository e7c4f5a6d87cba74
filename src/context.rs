//! Application context providing dependency injection root.

use std::sync::Arc;

use crate::config::Config;
use crate::di::FromRef;
use crate::error::AppError;
use crate::graph::backends::neo4j::Neo4jClient;
use crate::graph::Graph;

/// Shared graph handle used by every repository.
pub type AppGraph = Arc<Graph<Neo4jClient>>;

/// Root application context for dependency injection.
///
/// Holds the shared dependencies; repositories are built from it with
/// [`FromRef`]. The connection pool is released when the last clone of
/// the graph handle is dropped.
#[derive(Clone)]
pub struct Context {
    /// Neo4j graph, with the configured operation deadline.
    pub graph: AppGraph,
    /// Application configuration.
    pub config: Arc<Config>,
}

impl Context {
    /// Creates a new context with the given dependencies.
    pub fn new(graph: AppGraph, config: Config) -> Self {
        Self {
            graph,
            config: Arc::new(config),
        }
    }

    /// Connects to Neo4j using the configuration and builds the context.
    pub async fn from(config: Config) -> Result<Self, AppError> {
        tracing::info!("Connecting to Neo4j at {}", config.neo4j.uri);
        let client = Neo4jClient::connect(&config.neo4j).await?;
        let graph = Graph::new(client).with_timeout(config.neo4j.timeout());
        tracing::info!("Connected to Neo4j");

        Ok(Self::new(Arc::new(graph), config))
    }

    /// Resolves a dependency from this context.
    pub fn resolve<T: FromRef<Self>>(&self) -> T {
        T::from_ref(self)
    }
}

impl FromRef<Context> for AppGraph {
    fn from_ref(ctx: &Context) -> Self {
        Arc::clone(&ctx.graph)
    }
}

impl FromRef<Context> for Arc<Config> {
    fn from_ref(ctx: &Context) -> Self {
        Arc::clone(&ctx.config)
    }
}
