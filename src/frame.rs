//! CAN frames and the payload layouts exchanged with peer nodes
//!
//! The bit assignment of both layouts is part of the wire contract with peer
//! nodes. Changing a bit position breaks compatibility.
//!
//! Output-command frame (bus → node), 8 bytes:
//!
//! | byte | bit 0      | bit 1    | bit 2   | bit 3 | bit 4 | bit 5 | bit 6 | bit 7       |
//! |------|------------|----------|---------|-------|-------|-------|-------|-------------|
//! | 7    | gp_out     | gp2_out  | a_out   | b_out | c_out | d_out | e_out | parkrel_out |
//! | 6    | parkhl_out | line_out | tcc_out | -     | -     | -     | -     | -           |
//!
//! Input-broadcast frame (node → bus), 8 bytes, bytes 0..7 zero:
//!
//! | byte | bit 0 | bit 1  | bit 2      | bits 3..8 |
//! |------|-------|--------|------------|-----------|
//! | 7    | gp_in | gp2_in | notpark_in | -         |
//!
//! Reserved bits are ignored on reception and zero on transmission.

use bitfield::bitfield;
use embedded_can::{ExtendedId, Frame, Id, StandardId};

/// Payload length of both frame roles
pub const PAYLOAD_LEN: usize = 8;

/// Data does not fit in a classic CAN frame
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TooMuchData;

/// Classic CAN data or remote frame
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CanFrame {
    id: Id,
    remote: bool,
    dlc: u8,
    data: [u8; PAYLOAD_LEN],
}

impl CanFrame {
    /// Data frame carrying `data`; unused payload bytes are zero.
    pub fn new_data(id: impl Into<Id>, data: &[u8]) -> Result<Self, TooMuchData> {
        if data.len() > PAYLOAD_LEN {
            return Err(TooMuchData);
        }
        let mut payload = [0; PAYLOAD_LEN];
        payload[..data.len()].copy_from_slice(data);
        Ok(Self {
            id: id.into(),
            remote: false,
            dlc: data.len() as u8,
            data: payload,
        })
    }
}

impl Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        Self::new_data(id, data).ok()
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > PAYLOAD_LEN {
            return None;
        }
        Some(Self {
            id: id.into(),
            remote: true,
            dlc: dlc as u8,
            data: [0; PAYLOAD_LEN],
        })
    }

    fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        self.remote
    }

    fn id(&self) -> Id {
        self.id
    }

    fn dlc(&self) -> usize {
        self.dlc.into()
    }

    fn data(&self) -> &[u8] {
        if self.remote {
            &[]
        } else {
            &self.data[..usize::from(self.dlc)]
        }
    }
}

/// Converts a raw identifier, as stored in the parameter store, to a CAN
/// identifier. Values that fit 11 bits are standard identifiers, values up to
/// 29 bits extended ones; everything else is rejected.
pub fn id_from_raw(raw: i32) -> Option<Id> {
    let raw = u32::try_from(raw).ok()?;
    match u16::try_from(raw).ok().and_then(StandardId::new) {
        Some(id) => Some(Id::Standard(id)),
        None => ExtendedId::new(raw).map(Id::Extended),
    }
}

/// Raw value of a CAN identifier
pub fn raw_id(id: Id) -> u32 {
    match id {
        Id::Standard(id) => id.as_raw().into(),
        Id::Extended(id) => id.as_raw(),
    }
}

bitfield! {
    /// Desired output states carried by an output-command frame.
    ///
    /// Bits 0..8 hold payload byte 7, bits 8..16 payload byte 6.
    #[derive(Copy, Clone, Default, PartialEq, Eq)]
    pub struct OutputCommand(u16);
    impl Debug;

    /// General purpose output 1
    pub gp_out, set_gp_out: 0;
    /// General purpose output 2
    pub gp2_out, set_gp2_out: 1;
    /// Output A
    pub a_out, set_a_out: 2;
    /// Output B
    pub b_out, set_b_out: 3;
    /// Output C
    pub c_out, set_c_out: 4;
    /// Output D
    pub d_out, set_d_out: 5;
    /// Output E
    pub e_out, set_e_out: 6;
    /// Park release output
    pub parkrel_out, set_parkrel_out: 7;
    /// Park high level output
    pub parkhl_out, set_parkhl_out: 8;
    /// Line output
    pub line_out, set_line_out: 9;
    /// Torque converter clutch output
    pub tcc_out, set_tcc_out: 10;
}

impl OutputCommand {
    /// Bits that map to an output
    pub const MAPPED: u16 = 0x07ff;

    /// Extracts the command from a received payload.
    ///
    /// Returns `None` if the payload is shorter than [`PAYLOAD_LEN`]; the
    /// slice is never indexed before its length has been checked.
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        if payload.len() < PAYLOAD_LEN {
            return None;
        }
        Some(Self(u16::from_le_bytes([payload[7], payload[6]])))
    }

    /// Encodes the command into an 8-byte payload, reserved bits cleared.
    pub fn to_payload(self) -> [u8; PAYLOAD_LEN] {
        let [byte7, byte6] = (self.0 & Self::MAPPED).to_le_bytes();
        let mut payload = [0; PAYLOAD_LEN];
        payload[6] = byte6;
        payload[7] = byte7;
        payload
    }

    /// Mapped bits of the command
    pub fn bits(self) -> u16 {
        self.0 & Self::MAPPED
    }
}

bitfield! {
    /// Input states reported by an input-broadcast frame (payload byte 7).
    #[derive(Copy, Clone, Default, PartialEq, Eq)]
    pub struct InputBroadcast(u8);
    impl Debug;

    /// General purpose input 1
    pub gp_in, set_gp_in: 0;
    /// General purpose input 2
    pub gp2_in, set_gp2_in: 1;
    /// Not-in-park input
    pub notpark_in, set_notpark_in: 2;
}

impl InputBroadcast {
    /// Bits that map to an input
    pub const MAPPED: u8 = 0x07;

    /// Encodes the states into an 8-byte payload; only byte 7 is non-zero.
    pub fn to_payload(self) -> [u8; PAYLOAD_LEN] {
        let mut payload = [0; PAYLOAD_LEN];
        payload[7] = self.0 & Self::MAPPED;
        payload
    }

    /// Mapped bits of the broadcast
    pub fn bits(self) -> u8 {
        self.0 & Self::MAPPED
    }
}
