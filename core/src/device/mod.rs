pub mod controller;
pub mod sms_vdp;
pub mod sn76489;

pub use controller::{ControllerPorts, ControllerState};
pub use sms_vdp::SmsVdp;
pub use sn76489::{PsgConfig, Sn76489};
