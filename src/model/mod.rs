pub use swarmhive_core::{Scene, SceneCommand, SceneHandle, SceneRunner};
pub mod config {
    pub use swarmhive_core::config::*;
}
pub mod entity {
    pub use swarmhive_core::entity::*;
}
pub mod error {
    pub use swarmhive_core::error::*;
}
pub mod food {
    pub use swarmhive_core::food::*;
}
pub mod obstacle {
    pub use swarmhive_core::obstacle::*;
}
pub mod queen {
    pub use swarmhive_core::queen::*;
}
pub mod registry {
    pub use swarmhive_core::registry::*;
}
pub mod runner {
    pub use swarmhive_core::runner::*;
}
pub mod scene {
    pub use swarmhive_core::scene::*;
}
pub mod worker {
    pub use swarmhive_core::worker::*;
}
pub mod data {
    pub use swarmhive_data::*;
}
