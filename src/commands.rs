//! Command modules discovered under `src/commands/` by the build script.

include!(concat!(env!("OUT_DIR"), "/commands.rs"));
