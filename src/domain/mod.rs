// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, enums and traits describing the
// problem: playlists, vocabularies, regimes and answers.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain data and the traits other layers implement
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

// A raw playlist as stored in the arena JSON files
pub mod playlist;

// Answer records and evaluation scores
pub mod answer;

// Vocabulary sizes and song-vocabulary pruning methods
pub mod vocab;

// The four training regimes and their head layouts
pub mod regime;

// Core abstractions (traits) that other layers implement
pub mod traits;
