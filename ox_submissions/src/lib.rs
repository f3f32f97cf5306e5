pub mod binding;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod identity;
pub mod model;
pub mod store;

pub use binding::*;
pub use error::*;
pub use forms::*;
pub use handlers::*;
pub use identity::*;
pub use model::*;
pub use store::*;
