pub mod engine;
pub mod error;
pub mod nutrition;
pub mod output;
pub mod region;
pub mod scenario;
pub mod species;
pub mod systems;

pub use engine::Simulation;
pub use error::ConfigError;
pub use nutrition::{FeedClass, NutrientQuantity};
pub use output::RunOutputs;
pub use scenario::{RunSetup, Scenario};
pub use species::Herd;
