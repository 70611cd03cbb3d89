//! Gradient boosted decision trees, inference form
//!
//! Models are stored as canonical JSON so the registry can bind a model
//! file to its metadata sidecar by blake3 hash:
//!
//! ```json
//! {
//!   "feature_count": 14,
//!   "init_score": -0.41,
//!   "objective": "binary",
//!   "trees": [
//!     {"nodes": [
//!       {"feature_idx":1,"gain":12.5,"id":0,"leaf":null,"left":1,"right":2,"threshold":42.5},
//!       {"feature_idx":-1,"gain":0.0,"id":1,"leaf":-0.02,"left":-1,"right":-1,"threshold":0.0},
//!       {"feature_idx":-1,"gain":0.0,"id":2,"leaf":0.03,"left":-1,"right":-1,"threshold":0.0}
//!     ]}
//!   ],
//!   "version": 1
//! }
//! ```

pub mod model;
pub mod tree;

pub use model::{GbdtModel, ModelError};
pub use tree::{Node, Tree};
