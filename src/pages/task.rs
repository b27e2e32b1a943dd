use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Single in-flight slot for a page.
///
/// Starting a new task aborts the previous one, and only the result of the
/// newest task is ever handed out. Dropping the slot aborts whatever is still
/// running, which is how pages cancel their requests on unmount.
pub struct Latest<T> {
    generation: u64,
    handle: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<(u64, T)>,
    rx: mpsc::UnboundedReceiver<(u64, T)>,
}

impl<T: Send + 'static> Latest<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            generation: 0,
            handle: None,
            tx,
            rx,
        }
    }

    /// Spawn `fut` on the runtime, superseding any pending task.
    pub fn start<F>(&mut self, fut: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let tx = self.tx.clone();
        self.handle = Some(tokio::spawn(async move {
            let output = fut.await;
            let _ = tx.send((generation, output));
        }));
    }

    /// Abort the pending task, if any. Its result will never be delivered.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            self.generation += 1;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.is_some()
    }

    /// Non-blocking: the newest result if it has arrived. Stale results from
    /// superseded tasks are discarded.
    pub fn poll(&mut self) -> Option<T> {
        while let Ok((generation, output)) = self.rx.try_recv() {
            if generation == self.generation && self.handle.is_some() {
                self.handle = None;
                return Some(output);
            }
        }
        None
    }

    /// Wait for the pending task. `None` when nothing is pending.
    pub async fn wait(&mut self) -> Option<T> {
        while self.handle.is_some() {
            match self.rx.recv().await {
                Some((generation, output)) if generation == self.generation => {
                    self.handle = None;
                    return Some(output);
                }
                Some(_) => continue,
                None => return None,
            }
        }
        None
    }
}

impl<T: Send + 'static> Default for Latest<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Latest<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
