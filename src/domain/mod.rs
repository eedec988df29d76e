// Domain module: Entities, synchronization rules and the backend contract

pub mod backend;
pub mod models;
pub mod observer;
pub mod parameters;
pub mod registry;
pub mod sync;
pub mod value_objects;

pub use backend::*;
pub use models::*;
pub use observer::*;
pub use parameters::*;
pub use registry::*;
pub use sync::*;
pub use value_objects::*;
