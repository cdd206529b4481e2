/// Receives the running count of records written by the encoder.
///
/// Counts only ever increase. Implementations are free to ignore them.
pub trait Progress {
    fn update(&mut self, processed: usize);
}

/// Discards progress updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn update(&mut self, _processed: usize) {}
}

impl<F: FnMut(usize)> Progress for F {
    fn update(&mut self, processed: usize) {
        self(processed)
    }
}
