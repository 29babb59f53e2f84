pub mod json;
pub mod query;
pub mod text;

pub use json::ApiJson;
pub use query::ApiQuery;
pub use text::ApiText;
