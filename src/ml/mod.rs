// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that builds, runs or trains a network lives here.
//
//   model.rs       — The autoencoder family
//                    One encoder, then either a single
//                    reconstruction head or a song head plus
//                    a tag head, all sigmoid-activated
//
//   objective.rs   — Per-regime loss and decode routing
//                    Binary cross-entropy over the right
//                    slice of the membership vector, and the
//                    (input, scores) pairs to rank from
//
//   recommender.rs — Scores → ranked identifiers
//                    Masks what the playlist already holds,
//                    keeps the top k
//
//   trainer.rs     — The training loop
//                    Resume, epoch loop, checkpoint per
//                    epoch, periodic evaluation
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Autoencoder architectures for the four regimes
pub mod model;

/// Regime-specific loss composition and decode paths
pub mod objective;

/// Top-k extraction with input exclusion
pub mod recommender;

/// Training loop with checkpointing and periodic evaluation
pub mod trainer;
