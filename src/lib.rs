// Dice Poker terminal client

pub mod client;
pub mod core;
