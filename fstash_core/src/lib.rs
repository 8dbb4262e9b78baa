//! # fstash Core
//!
//! Save named snapshots of directory trees into a sharded local store and
//! expand them back into working directories.
//!
//! A stash named `name` is stored at `<home>/<XX>/<XX>/<XX>/<XX>/<name>`,
//! where the four hex segments are derived from a hash of the normalized
//! name. The path is the identity; no index is kept.
//!
//! ## Features
//!
//! - Deterministic, sharded storage paths derived from stash names
//! - Tree walking with pruned directories (`.git` by default)
//! - Plain copy or per-file Jinja template rendering on expand
//! - Idempotent deletion
//! - Advisory locks around create and delete
//!
//! ## Example
//!
//! ```no_run
//! use fstash_core::{StashHome, TemplateData};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let home = StashHome::new("/home/me/.fstash");
//!
//! // Save the current project as "rust-cli"
//! home.create("rust-cli", Path::new("./my-project"))?;
//!
//! // Expand it elsewhere, rendering config.* with a port
//! let mut data = TemplateData::new();
//! data.insert("config".to_string(), r#"{"port": 8080}"#.to_string());
//! home.expand("rust-cli", Path::new("./new-project"), &data)?;
//!
//! for name in home.stashes()? {
//!     println!("{}", name);
//! }
//!
//! home.delete("rust-cli")?;
//! # Ok(())
//! # }
//! ```

mod copy;
mod error;
mod lock;
mod name;
mod stash;
mod template;
mod tree;
mod walk;

pub use copy::{CopyStats, copy_tree};
pub use error::{Error, ErrorKind, Result};
pub use lock::StashLock;
pub use name::{SHARD_LEVELS, ShardKey, StashName, derive, normalize, validate};
pub use stash::{
    CreateOptions, DEFAULT_SKIP_DIRS, STASH_DEPTH, StashHome, create, delete, expand, list,
};
pub use template::{TemplateData, expand_tree};
pub use tree::{ROOT_KEY, Tree};
pub use walk::{list_at_depth, walk};
