// Read/write routing.
//
// One writer handle, any number of reader handles. Reads are spread across
// the readers by a pluggable pick function (random by default); writes and
// transactions always go to the writer. When no readers are registered the
// writer serves reads too.

use once_cell::sync::OnceCell;
use rand::Rng;

use crate::db::Db;
use crate::error::Error;
use crate::tx::Tx;

static GLOBAL: OnceCell<Router> = OnceCell::new();

/// Picks a reader index given the reader count (always >= 1 when called).
pub type PickFn = fn(usize) -> usize;

fn pick_random(count: usize) -> usize {
    rand::thread_rng().gen_range(0..count)
}

#[derive(Clone)]
pub struct Router {
    writer: Db,
    readers: Vec<Db>,
    pick: PickFn,
}

impl Router {
    pub fn new(writer: Db) -> Self {
        Self {
            writer,
            readers: Vec::new(),
            pick: pick_random,
        }
    }

    pub fn add_reader(&mut self, reader: Db) -> &mut Self {
        self.readers.push(reader);
        self
    }

    /// Replace the reader selection policy.
    pub fn set_pick(&mut self, pick: PickFn) -> &mut Self {
        self.pick = pick;
        self
    }

    /// The write handle.
    pub fn writer(&self) -> Db {
        self.writer.clone()
    }

    /// A read handle, chosen by the pick function. Falls back to the writer
    /// when no readers are registered.
    pub fn reader(&self) -> Db {
        if self.readers.is_empty() {
            return self.writer.clone();
        }
        let idx = (self.pick)(self.readers.len()) % self.readers.len();
        self.readers[idx].clone()
    }

    /// Begin a transaction on the writer.
    pub async fn begin(&self) -> Result<Tx, Error> {
        self.writer.begin().await
    }

    /// Install this router as the process-wide default. Returns the router
    /// back on failure; only the first install wins.
    pub fn install(self) -> Result<(), Router> {
        GLOBAL.set(self)
    }

    /// The process-wide router, if one was installed.
    pub fn global() -> Option<&'static Router> {
        GLOBAL.get()
    }
}

#[cfg(test)]
mod tests {
    use super::pick_random;

    #[test]
    fn random_pick_stays_in_range() {
        for count in 1..8 {
            for _ in 0..64 {
                assert!(pick_random(count) < count);
            }
        }
    }
}
