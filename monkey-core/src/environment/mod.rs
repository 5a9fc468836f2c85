pub mod environment;
pub mod hash_table;
pub mod value;

pub mod prelude {
    pub use super::{
        environment::*,
        hash_table::*,
        value::*
    };
}

#[cfg(test)]
mod tests;
