mod completion;
mod dispatcher;
mod graph;
mod registry;
mod wait_for;

pub use completion::*;
pub use dispatcher::*;
pub use registry::*;
pub use wait_for::*;

#[cfg(test)]
mod completion_test;
#[cfg(test)]
mod wait_for_test;
