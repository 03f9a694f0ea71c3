//! Desktop preview built on egui/eframe

mod app;
mod components;
mod constants;
mod visuals;

pub use app::run_gui;
