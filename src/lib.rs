//! Host-agnostic surround-editing and timed key-sequence engines for modal
//! text editors.
//!
//! Two cores, both text-span manipulation over a live buffer:
//!
//! - The **surround engine** ([`Surround`]) locates, deletes, replaces,
//!   adds or highlights a pair of delimiting spans around the cursor,
//!   honoring a configurable search method, line window and count.
//! - The **key-sequence interpreters**: a [`Multistep`] dispatcher running
//!   an ordered (condition, action) list on one key, and a
//!   [`ComboRegistry`] detecting short timed key sequences and replacing
//!   them retroactively with an action.
//!
//! The host editor is reached only through traits ([`BufferOps`],
//! [`InputSource`], [`EditorHost`] and the collaborator traits), and all
//! timing is passed in as explicit timestamps, so everything here is
//! testable without an editor.

pub mod combo;
pub mod error;
pub mod key;
pub mod multistep;
pub mod search;
pub mod spec;
pub mod steps;
pub mod surround;
pub mod traits;
pub mod types;

pub use crate::combo::{ComboAction, ComboFire, ComboId, ComboRegistry, KeySource};
pub use crate::error::Error;
pub use crate::key::{KeyCode, KeyEvent, Mode, ModeSet, Modifiers};
pub use crate::multistep::{Dispatch, Feed, Multistep, Step, StepResult};
pub use crate::search::SearchWindow;
pub use crate::spec::{InputSpec, OutputSpec, SurroundingRegistry, SurroundingSpec};
pub use crate::surround::{Highlight, OpOutcome, Surround, SurroundBuilder};
pub use crate::traits::{
    AutoPairs, BufferOps, CompletionMenu, EditorHost, InputSource, SnippetEngine, SyntaxTree,
};
pub use crate::types::{Config, Position, Region, RegionPair, SearchMethod, Submode};
