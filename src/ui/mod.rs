pub mod app_state;
pub mod charts;
pub mod console;
pub mod format;
pub mod input;
pub mod renderer;
pub mod widgets;
