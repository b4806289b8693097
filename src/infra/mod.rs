// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the disk on behalf of other layers:
//
//   checkpoint.rs   — Model + optimizer persistence
//                     Full-precision MessagePack records,
//                     overwritten every epoch; loading
//                     reports an outcome instead of failing
//
//   vocab_store.rs  — Song and tag vocabularies
//                     Loads the id files if both halves of
//                     a pair exist, otherwise rebuilds them
//                     from the training playlists
//
//   answer_file.rs  — Answer JSON I/O
//                     Plus the guard that deletes the
//                     temporary answer file
//
//   evaluator.rs    — nDCG scoring of answer files
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Vocabulary building, saving, and loading
pub mod vocab_store;

/// Answer file reading, writing and temp-file cleanup
pub mod answer_file;

/// Playlist-continuation evaluator
pub mod evaluator;
