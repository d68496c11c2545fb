// Infrastructure adapters backing the application ports

pub mod clock;
pub mod fetcher;

pub use clock::SystemClock;
pub use fetcher::DefaultSourceFetcher;
