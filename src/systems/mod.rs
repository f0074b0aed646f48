// src/systems/mod.rs

// The two cooperating systems (partition generator, balance search), the
// vocabulary they share, and a worker-thread runner.

pub mod sdk;
pub mod partition;
pub mod balance;
pub mod background;
