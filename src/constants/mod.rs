pub mod command_code;
pub mod known_pin;

mod data;
