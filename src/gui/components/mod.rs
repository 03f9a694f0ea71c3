pub mod capabilities;
pub mod customizer;
pub mod nav_menu;
