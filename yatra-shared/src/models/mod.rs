pub mod events;

pub use events::RideStatusChangedEvent;
