pub mod local;
pub mod process;
pub mod remote;
pub mod target;
pub mod traits;

pub use local::LocalRunner;
pub use process::{LaunchedProcess, OnReady};
pub use remote::RemoteSession;
pub use target::{ExecutionTarget, RemoteHost};
pub use traits::{CommandLine, CommandRunner, ExitReport, ProcessHandle};
