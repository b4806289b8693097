// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From playlist JSON to tensor batches:
//
//   train.json / questions
//       │
//       ▼
//   PlaylistLoader     → reads the JSON array of playlists
//       │
//       ▼
//   MembershipDataset  → maps songs/tags to dense ids,
//       │                implements Burn's Dataset trait
//       ▼
//   MembershipBatcher  → multi-hot rows stacked into a tensor
//       │
//       ▼
//   DataLoader         → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads playlist files with serde_json
pub mod loader;

/// Implements Burn's Dataset trait for membership samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
