//! Background query manager using threads and channels.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use tracing::{debug, warn};

use crate::async_io::{QueryRequest, QueryResponse};
use crate::query::{ClientState, DirectoryQueryClient};

/// Runs directory queries on a dedicated thread.
///
/// Requests are sent via `send()` and responses are polled via `try_recv()`.
/// The background thread terminates when the QueryManager is dropped.
pub struct QueryManager {
    tx: Sender<QueryRequest>,
    rx: Receiver<QueryResponse>,
    client_name: String,
    client_state: ClientState,
}

impl QueryManager {
    /// Move `client` onto a new worker thread.
    #[must_use]
    pub fn new(mut client: Box<dyn DirectoryQueryClient>) -> Self {
        let (req_tx, req_rx) = channel::<QueryRequest>();
        let (res_tx, res_rx) = channel::<QueryResponse>();
        let client_name = client.name().to_string();
        let client_state = client.client_state();

        thread::spawn(move || {
            while let Ok(request) = req_rx.recv() {
                handle_request(client.as_mut(), request, &res_tx);
            }
        });

        Self {
            tx: req_tx,
            rx: res_rx,
            client_name,
            client_state,
        }
    }

    /// Send a request to the background worker.
    pub fn send(&self, req: QueryRequest) {
        debug!(generation = req.generation, path = %req.request.path, "query issued");
        if self.tx.send(req).is_err() {
            warn!("query worker has exited");
        }
    }

    /// Try to receive a response without blocking.
    #[must_use]
    pub fn try_recv(&self) -> Option<QueryResponse> {
        self.rx.try_recv().ok()
    }

    /// Client state captured when the worker started
    pub fn client_state(&self) -> &ClientState {
        &self.client_state
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }
}

fn handle_request(client: &mut dyn DirectoryQueryClient, req: QueryRequest, tx: &Sender<QueryResponse>) {
    let result = client.query_directory(&req.request);
    // The receiver only disappears when the app is shutting down
    let _ = tx.send(QueryResponse {
        generation: req.generation,
        request: req.request,
        result,
    });
}
