mod strings;
pub use strings::WorkflowStrings;

mod def;
pub use def::{EdgeDef, NodeDef, PortDef, TriggerDef, WorkflowDef};

mod id;
pub use id::{EdgeId, IdentId, NameId, NodeId, PortId, TriggerId};

mod error;
pub use error::{AggregatedErrors, Errors};

mod workflow;
pub use workflow::{Edge, Node, Port, Trigger, Workflow};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Duplicate {0} id: '{1}'")]
    DuplicateId(&'static str, String),
    #[error("Default port '{port}' of node '{node}' is not one of its ports")]
    UnknownDefaultPort { node: String, port: String },
    #[error("Too many {0} in workflow; maximum supported is {1}")]
    TooMany(&'static str, usize),
}
