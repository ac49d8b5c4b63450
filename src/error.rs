/// Problems with a render request, caught before any rays are traced.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("image dimensions must be nonzero (got {width}x{height})")]
    EmptyImage { width: usize, height: usize },
    #[error("samples per pixel must be positive")]
    NoSamples,
    #[error("worker count must be positive")]
    NoWorkers,
    #[error("row batch size must be positive")]
    EmptyBatch,
    #[error("unknown scene {0:?} (expected one of: random, test, pair)")]
    UnknownScene(String),
    #[error("unknown scheduler {0:?} (expected queue or rayon)")]
    UnknownScheduler(String),
}
