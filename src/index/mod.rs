pub mod builder;
pub mod inverted;
pub mod number_map;
pub mod token_set;
pub mod token_set_builder;
