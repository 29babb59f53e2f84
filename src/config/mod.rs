pub mod types;
pub mod validator;
pub mod settings;

pub use types::*;
pub use validator::*;
pub use settings::*;
