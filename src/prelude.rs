//! Traits needed to work with the node's handles and collaborators
pub use crate::core::Gpio as _;
pub use crate::core::Monotonic as _;
pub use crate::core::Transport as _;
pub use crate::param::Parameters as _;

pub use embedded_can::Frame as _;
pub use embedded_hal::digital::v2::InputPin as _;
pub use embedded_hal::digital::v2::OutputPin as _;
pub use embedded_hal::digital::v2::StatefulOutputPin as _;
pub use fugit::ExtU32 as _;
