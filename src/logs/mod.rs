mod fetcher;
mod store;

pub use fetcher::{LogFetcher, TEXT_LOG_SUMMARY};
pub use store::{FsLogStore, LogStore};

#[cfg(test)]
pub(crate) use fetcher::fakes;
#[cfg(test)]
pub(crate) use store::memory::MemoryLogStore;
