pub mod dom;
pub mod easing;
pub mod menu;
pub mod scroll;
pub mod settings;
pub mod spy;
pub mod throttle;

pub use settings::SettingsError;
