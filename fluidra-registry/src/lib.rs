//! Device capability resolution for Fluidra pool equipment
//!
//! The vendor protocol exposes every device as an opaque bag of numbered
//! components. This crate maps a raw device description to a
//! [`CapabilityProfile`]: which component is the power switch, which one is
//! the pH probe, how its values are scaled, and where commands go.
//!
//! Resolution is pure, total and data-driven: an ordered table of
//! `{predicate, profile}` rules evaluated first-match-wins, with a generic
//! fallback so unknown hardware still surfaces its raw components. Adding
//! support for a new family means appending a rule, which by construction
//! cannot change how previously matched devices resolve.
//!
//! ```rust
//! use fluidra_registry::{DeviceRegistry, RawDevice, SemanticRole};
//!
//! let registry = DeviceRegistry::builtin();
//! let device = RawDevice::new("CC24033907").with_family("Chlorinator");
//!
//! let profile = registry.resolve(&device);
//! assert!(profile.has_role(SemanticRole::Ph));
//! assert!(profile.has_role(SemanticRole::ChlorinationLevel));
//! ```

mod device;
mod profile;
mod registry;
mod role;
mod rules;

pub use device::{DeviceCategory, RawDevice};
pub use profile::{CapabilityProfile, RoleBinding, ScheduleBinding};
pub use registry::DeviceRegistry;
pub use role::{CapabilityValue, SemanticRole, ValueCodec};
pub use rules::{MatchRule, Predicate};
