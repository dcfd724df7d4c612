//! MemorySink - records deliveries in memory (tests, dry runs)

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use contracts::{Block, BlockSink, ContractError, WorkerId};

/// One block as seen by one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub worker: WorkerId,
    pub block: Block,
}

/// Sink that appends every delivery to a shared log
#[derive(Clone)]
pub struct MemorySink {
    name: String,
    worker: WorkerId,
    log: Arc<Mutex<Vec<Delivery>>>,
    delay: Duration,
    fail: bool,
}

impl MemorySink {
    /// Create a sink and the log it writes to
    pub fn new(name: impl Into<String>) -> (Self, Arc<Mutex<Vec<Delivery>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Self {
            name: name.into(),
            worker: 1,
            log: Arc::clone(&log),
            delay: Duration::ZERO,
            fail: false,
        };
        (sink, log)
    }

    /// Sleep this long before recording each block
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Reject every write
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Copy of this sink for another worker of the same class
    pub fn for_worker(&self, worker: WorkerId) -> Self {
        Self {
            worker,
            ..self.clone()
        }
    }

    /// Read a delivery log
    pub fn deliveries(log: &Mutex<Vec<Delivery>>) -> Vec<Delivery> {
        Self::lock(log).clone()
    }

    fn lock(log: &Mutex<Vec<Delivery>>) -> MutexGuard<'_, Vec<Delivery>> {
        log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BlockSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, block: &Block) -> Result<(), ContractError> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        if self.fail {
            return Err(ContractError::sink_write(
                &self.name,
                std::io::Error::other("injected failure"),
            ));
        }
        Self::lock(&self.log).push(Delivery {
            worker: self.worker,
            block: block.clone(),
        });
        Ok(())
    }
}
