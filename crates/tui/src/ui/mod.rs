pub mod colors;
pub mod help;
pub mod layout;
pub mod widgets;

pub use colors::ColorScheme;
pub use help::HelpOverlay;
pub use layout::{Layout, MainLayout, Rect};
pub use widgets::{fit, Footer, SensorTable, TopBar};
