mod mock;

pub use mock::MockCatalog;
