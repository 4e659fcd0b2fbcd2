pub mod app;
pub mod input;
pub mod ui;
pub mod units;
pub mod view;

pub use app::App;
pub use input::{InputEvent, InputHandler};
pub use ui::*;
pub use view::{build_rows, Row};
