pub mod builder;
pub mod model;

pub use model::{AuthForm, KeyValueRow, RequestForm};
