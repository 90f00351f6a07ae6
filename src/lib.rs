//! Example-payload synthesis for Java web controllers, exported as a
//! Postman Collection v2.1.0 document.
//!
//! The core is [`mock::Synthesizer`]: given a (possibly generic, possibly
//! self-referential) type it walks the field graph and returns a JSON-like
//! example value. [`java`] supplies the declarations it walks, [`export`]
//! turns controllers into collection items.
pub mod cli;
pub mod config;
pub mod export;
pub mod java;
pub mod logging;
pub mod mock;
pub mod postman;
pub mod types;
