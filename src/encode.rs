//! Functions for encoding register frames to send to the FPGA

/// Highest register address the FPGA decodes.
pub const MAX_ADDRESS: u8 = 0x7f;

/// Encode a register address and value into a two byte frame, address first
pub fn encode_frame(address: u8, value: u8) -> [u8; 2] {
    [address, value]
}
