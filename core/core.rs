pub mod collect;
pub mod config;
pub mod error;
pub mod naming;
pub mod rules;

pub use collect::{
    CollectOptions, CollectSummary, PlannedEntry, canonical_output_path, collect_to_file,
    collect_tree, locate_source, plan_tree,
};
pub use config::{
    Config, EntryOrder, ExclusionsConfig, GeneralConfig, NestedPair, OutputTarget,
    ReadErrorPolicy, WalkConfig,
};
pub use error::{AppError, Result};
pub use naming::resolve_output_folder_name;
pub use rules::{Exclusion, ExclusionRules};
