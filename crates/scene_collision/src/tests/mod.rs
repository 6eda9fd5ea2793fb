//! Engine scenarios over a small furnished scene
//!
//! Unit tests live next to the code they cover; these exercise the engine
//! end to end through its public operations.


mod neighbor_scenarios;
mod surrogate_scenarios;
