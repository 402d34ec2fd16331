//! JSON-lines command console on stdin/stdout. Each input line holds one
//! [`Command`], each output line one [`Response`].

mod command;
mod console_endpoint;
mod console_messenger;

pub use command::{Command, Response};
pub use console_endpoint::ConsoleEndpoint;
pub use console_messenger::ConsoleMessenger;

#[cfg(test)]
mod tests;
