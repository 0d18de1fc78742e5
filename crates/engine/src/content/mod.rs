mod atomic_io;
mod nodes;

pub use atomic_io::write_text_atomic;
pub use nodes::{
    load_node_defs, parse_node_defs, ContentError, ContentErrorCode, NodeDef, SourceLocation,
};
