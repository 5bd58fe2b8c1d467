pub mod composer;
pub mod executor;

pub use composer::RequestComposer;
pub use executor::RequestExecutor;
