pub mod flags;
pub mod mention;
pub mod tokenize;
pub mod types;

pub use flags::{cluster_name_from_command, extract_all_namespaces, extract_namespace};
pub use mention::BotMention;
pub use tokenize::{Tokenizer, delete_double_whitespace, words};
pub use types::{ExecutionNamespace, NamespaceResolution};
