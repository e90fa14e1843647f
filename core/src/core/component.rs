/// A clocked peripheral that advances in lockstep with the CPU.
///
/// The machine runs one whole CPU instruction, then advances each component
/// by that instruction's cycle count. Components divide the CPU clock
/// internally as needed (the PSG runs at CPU/16, the VDP per-cycle).
pub trait Component {
    /// Advance the component by `cycles` CPU clock cycles.
    fn advance(&mut self, cycles: u32);

    /// Return the component to its documented power-on state.
    fn reset(&mut self);
}
