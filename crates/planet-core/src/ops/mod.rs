// ── Device operations ──
//
// Each submodule adds an `impl Planet` block for one area of the web UI.

pub mod maintenance;
pub mod ports;
pub mod system;
pub mod vlans;
