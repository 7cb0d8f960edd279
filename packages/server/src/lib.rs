//! Line-based TCP broadcast chat server library.
//!
//! Every line a client sends is relayed to every connected client, and the
//! most recent lines are replayed to clients that join later.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
