// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: which files to load, which
// vocabulary to build, which loop to run. The work itself
// happens in Layers 4 to 6.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// Scoring an answer file against the ground truth
pub mod evaluate_use_case;
