pub mod config;
pub mod constants;
pub mod content;
pub mod derived;
pub mod error;
pub mod params;
pub mod state;
pub mod types;

pub use config::SceneConfig;
pub use derived::DerivedInputs;
pub use error::{ColorParseError, ConfigError, ContentError, TerrascopeError};
pub use params::{ParamDelta, VisualParams};
pub use state::SimulationState;
pub use types::{DataLayer, Rgb, SunType};
