mod components;
mod layout;

pub use components::results::{results_layout, ResultsLayout};
pub use layout::{main_area_height, render};
