mod presentation_controller;

pub use presentation_controller::*;
