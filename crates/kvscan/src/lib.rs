//! kvscan — inspection engine for ordered key-value stores.
//!
//! The library half of the `kvscan` binary: everything needed to turn a
//! set of declarative scan options into one executed, filtered,
//! reported-on range scan. The binary adds argument parsing, logging
//! setup, and signal wiring on top.

pub mod scan;
