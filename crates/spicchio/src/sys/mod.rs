pub mod battery;
pub mod launch;
pub mod recognizer;
pub mod runtime;
pub mod server;
