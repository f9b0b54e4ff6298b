//! Project catalog: favorites plus repositories and workspaces found by
//! scanning configured directory trees.

pub mod app;
