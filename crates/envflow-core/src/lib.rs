//! envflowのコア機能
//!
//! KDL設定ファイルから、あるべきSSH開発環境の定義（[`Flow`]）を読み込みます。

pub mod error;
pub mod model;
pub mod parser;

pub use error::{FlowError, Result};
pub use model::Flow;
pub use parser::{parse_kdl_file, parse_kdl_string};
