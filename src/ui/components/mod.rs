pub mod error;
pub mod form;
pub mod header;
pub mod keybindings;
pub mod loading;
pub mod results;
pub mod util;
