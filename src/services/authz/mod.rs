pub mod audience;
pub mod engine;
pub mod impersonation;
pub mod operation;
pub mod path;
pub mod registry;
pub mod scope;
pub mod settings;

pub use audience::Audience;
pub use engine::{AuthzEngine, Decision, DenyReason};
pub use impersonation::{ImpersonationEvaluator, PermissionProbe, ProbeError, SudoTestProbe};
pub use operation::Operation;
pub use registry::{IssuerConfig, IssuerRegistry};
pub use scope::{ClaimScopeMatcher, ScopeMatcher, ScopeOutcome};
pub use settings::{AuthzSettings, ConfigFileError};
