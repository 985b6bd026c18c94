//! Command line overlays
//!
//! Extracts configuration fragments from an argument list in one forward
//! pass:
//!
//! ```text
//! app serve --port 1 overrides ++extra.yaml +db.port 5432 / --other
//!               section start ^                             ^ section end
//! ```
//!
//! Inside the section, `++path` names an extra configuration file and
//! `+key.path value` sets a JSON-decoded value at a dotted key path.

pub mod constants;
pub mod filters;
pub mod keypath;
pub mod reader;
pub mod section;
pub mod trigger;

pub use filters::{FileOverlayFilter, KeyValueFilter};
pub use keypath::{KeyPathBuilder, ValueParser, json_value_parser, nest};
pub use reader::{CliOptions, build_cli_reader, process_args};
pub use section::{SectionIter, SectionScanner};
pub use trigger::{PrefixTrigger, Trigger};
