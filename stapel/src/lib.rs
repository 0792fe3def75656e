mod activation;
mod dispatch;
mod env;
mod fault;
mod heap;
mod object;
mod process;
mod stack;
mod tagged;

pub use activation::*;
pub use dispatch::*;
pub use env::*;
pub use fault::*;
pub use heap::*;
pub use object::*;
pub use process::*;
pub use stack::*;
pub use tagged::*;
