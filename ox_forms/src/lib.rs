pub mod binding;
pub mod engine;
pub mod error;
pub mod pages;
pub mod registry;
pub mod render;
pub mod schema;
pub mod state;
pub mod std_renderers;
pub mod submit;
pub mod traits;
pub mod validation;
pub mod values;

pub use binding::*;
pub use engine::*;
pub use error::*;
pub use pages::*;
pub use registry::*;
pub use schema::*;
pub use state::*;
pub use submit::*;
pub use traits::*;
pub use validation::*;
pub use values::*;
