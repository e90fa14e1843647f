pub mod sms;

pub use sms::{SmsConfig, SmsSystem};
pub use sms::bus::{BusStats, CpuDebugHooks, SmsBus, TraceEvent, WaitStateConfig};
pub use sms::cartridge::{Bios, Cartridge, SmsConfigError};
