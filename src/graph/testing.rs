//! Recording mock backend for unit tests.
//!
//! Every statement is recorded with its parameters; results are scripted
//! in order with [`MockClient::respond`] and [`MockClient::fail`]. A
//! statement with no scripted response yields no rows.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppError;
use crate::graph::row::{Params, Row, RowStream};
use crate::graph::traits::{CypherExecutor, GraphClient, Transaction};

#[derive(Debug, Clone)]
pub struct Call {
    pub cypher: String,
    pub params: Params,
    pub in_transaction: bool,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    responses: VecDeque<Result<Vec<Row>, String>>,
    begins: usize,
    commits: usize,
    rollbacks: usize,
    delay: Option<Duration>,
    rollback_delay: Option<Duration>,
    commit_failure: Option<String>,
}

#[derive(Clone, Default)]
pub struct MockClient {
    state: Arc<Mutex<State>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the rows returned by the next statement.
    pub fn respond(&self, rows: Vec<Row>) -> &Self {
        self.state.lock().unwrap().responses.push_back(Ok(rows));
        self
    }

    /// Queues a store failure for the next statement.
    pub fn fail(&self, message: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back(Err(message.to_string()));
        self
    }

    /// Makes every statement sleep before answering.
    pub fn delay(&self, delay: Duration) -> &Self {
        self.state.lock().unwrap().delay = Some(delay);
        self
    }

    /// Makes rollback sleep before completing.
    pub fn stall_rollback(&self, delay: Duration) -> &Self {
        self.state.lock().unwrap().rollback_delay = Some(delay);
        self
    }

    /// Makes the next commit fail.
    pub fn fail_commit(&self, message: &str) -> &Self {
        self.state.lock().unwrap().commit_failure = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn begins(&self) -> usize {
        self.state.lock().unwrap().begins
    }

    pub fn commits(&self) -> usize {
        self.state.lock().unwrap().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.state.lock().unwrap().rollbacks
    }

    async fn answer(
        &self,
        cypher: &str,
        params: Params,
        in_transaction: bool,
    ) -> Result<Vec<Row>, AppError> {
        let (response, delay) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call {
                cypher: cypher.to_string(),
                params,
                in_transaction,
            });
            let response = state.responses.pop_front().unwrap_or(Ok(Vec::new()));
            (response, state.delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        response.map_err(|message| AppError::Query {
            message,
            query: cypher.to_string(),
        })
    }
}

fn stream(rows: Vec<Row>) -> RowStream<'static> {
    Box::pin(futures::stream::iter(rows.into_iter().map(Ok)))
}

#[async_trait]
impl CypherExecutor for MockClient {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        self.answer(cypher, params, false).await.map(stream)
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        self.answer(cypher, params, false).await.map(|_| ())
    }
}

#[async_trait]
impl GraphClient for MockClient {
    type Tx<'a> = MockTransaction;

    async fn begin(&self) -> Result<Self::Tx<'_>, AppError> {
        self.state.lock().unwrap().begins += 1;
        Ok(MockTransaction {
            client: self.clone(),
        })
    }
}

pub struct MockTransaction {
    client: MockClient,
}

#[async_trait]
impl CypherExecutor for MockTransaction {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        self.client.answer(cypher, params, true).await.map(stream)
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        self.client.answer(cypher, params, true).await.map(|_| ())
    }
}

#[async_trait]
impl Transaction for MockTransaction {
    async fn commit(self) -> Result<(), AppError> {
        let mut state = self.client.state.lock().unwrap();
        if let Some(message) = state.commit_failure.take() {
            return Err(AppError::Query {
                message,
                query: "COMMIT".to_string(),
            });
        }
        state.commits += 1;
        Ok(())
    }

    async fn rollback(self) -> Result<(), AppError> {
        let delay = {
            let mut state = self.client.state.lock().unwrap();
            state.rollbacks += 1;
            state.rollback_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}
