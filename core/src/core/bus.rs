/// Generic bus interface seen by the CPU: 16-bit addresses, 8-bit data,
/// with the Z80's separate I/O port space.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);

    /// Read from I/O port address space (separate from memory on the Z80).
    /// The full 16-bit port address is supplied; devices that decode fewer
    /// bits mask it themselves. Unmapped ports float high.
    fn io_read(&mut self, port: u16) -> u8 {
        let _ = port;
        0xFF
    }

    /// Write to I/O port address space. Unmapped ports swallow the byte.
    fn io_write(&mut self, port: u16, data: u8) {
        let _ = (port, data);
    }

    /// Interrupt lines as the CPU sees them at an instruction boundary.
    fn check_interrupts(&self) -> InterruptState;
}

#[derive(Clone, Copy, Debug)]
pub struct InterruptState {
    pub nmi: bool,
    pub irq: bool,
    /// Byte the interrupting device drives onto the data bus during the
    /// acknowledge cycle (IM 0 opcode / IM 2 vector low). Devices that
    /// don't drive the bus leave it floating at 0xFF.
    pub irq_vector: u8,
}

impl Default for InterruptState {
    fn default() -> Self {
        Self {
            nmi: false,
            irq: false,
            irq_vector: 0xFF,
        }
    }
}
