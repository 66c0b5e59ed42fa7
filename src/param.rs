//! Contract with the external parameter store

/// Parameters the node reads or publishes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Param {
    /// CAN bus speed, see [`CanSpeed`](crate::config::CanSpeed)
    CanSpeed,
    /// Input-broadcast cadence, see [`CanPeriod`](crate::config::CanPeriod)
    CanPeriod,
    /// Node id used for remote parameter access
    NodeId,
    /// Identifier of the output-command frame
    OutputId,
    /// Identifier of the input-broadcast frame
    InputId,
    /// Firmware interface version
    Version,
    /// CPU load in percent (published)
    CpuLoad,
}

impl Param {
    /// `true` for parameters that select CAN identifiers, i.e. the ones that
    /// require the acceptance filters to be installed again when changed.
    pub fn affects_filters(self) -> bool {
        matches!(self, Param::OutputId | Param::InputId | Param::NodeId)
    }
}

/// Access to the parameter store.
///
/// The store is shared between the tick and the receive context, so all
/// accessors take `&self`; implementations provide their own interior
/// mutability. Reading must be cheap and must not block.
pub trait Parameters {
    /// Current value of an integer parameter
    fn get_int(&self, param: Param) -> i32;
    /// Stores an integer value without triggering change handling
    fn set_int(&self, param: Param, value: i32);
    /// Stores a fractional value without triggering change handling
    fn set_float(&self, param: Param, value: f32);
}
