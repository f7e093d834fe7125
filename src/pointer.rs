use std::fmt;

use crate::{
    constants::{POINTER_SPEED_DEFAULT, POINTER_SPEED_MAX, POINTER_SPEED_MIN},
    error::PointerError,
};

/// os mouse pointer sensitivity, always within 1..=20.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct PointerSpeed(u32);

impl PointerSpeed {
    pub fn new(speed: i64) -> Self {
        let clamped = speed.clamp(POINTER_SPEED_MIN as i64, POINTER_SPEED_MAX as i64);
        Self(clamped as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn faster(self) -> Self {
        Self::new(self.0 as i64 + 1)
    }

    pub fn slower(self) -> Self {
        Self::new(self.0 as i64 - 1)
    }
}

impl Default for PointerSpeed {
    fn default() -> Self {
        Self(POINTER_SPEED_DEFAULT)
    }
}

impl fmt::Display for PointerSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.get(), f)
    }
}

/// applies `speed` system-wide and broadcasts the change.
#[cfg(windows)]
pub fn apply(speed: PointerSpeed) -> Result<(), PointerError> {
    use std::ffi::c_void;
    use windows::Win32::UI::WindowsAndMessaging::{
        SystemParametersInfoW, SPIF_SENDCHANGE, SPI_SETMOUSESPEED,
    };

    // SPI_SETMOUSESPEED takes the speed itself in the pointer argument.
    let param = speed.get() as usize as *mut c_void;
    unsafe { SystemParametersInfoW(SPI_SETMOUSESPEED, 0, Some(param), SPIF_SENDCHANGE) }
        .map_err(|err| PointerError::Os(err.message().to_string()))?;

    log::info!("pointer speed set to {speed}");
    Ok(())
}

#[cfg(not(windows))]
pub fn apply(speed: PointerSpeed) -> Result<(), PointerError> {
    log::debug!("pointer speed {speed} not applied: unsupported platform");
    Err(PointerError::Unsupported)
}
