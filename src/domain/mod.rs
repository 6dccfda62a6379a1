pub mod cart;
pub mod menu;
pub mod money;
pub mod order;
pub mod ports;
