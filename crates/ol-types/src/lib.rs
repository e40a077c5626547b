pub mod design;
pub mod errors;
pub mod events;
pub mod model;
pub mod run;

pub use design::*;
pub use errors::*;
pub use events::*;
pub use model::*;
pub use run::*;
