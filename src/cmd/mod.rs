pub mod evaluate;
pub mod learn;
