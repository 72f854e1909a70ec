//! SH1107 OLED display driver
//!
//! Driver for 128x128 SH1107-based OLED modules via I2C. The rasterizer
//! owns the frame; this driver only knows how to put pages on the glass.

use heapless::Vec;
use tiltplay_display::{DisplayError, DisplayTransport};
use tiltplay_hal::I2cBus;

/// SH1107 I2C address (0x3C, or 0x3D with SA0 high)
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Display dimensions
pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 128;
pub const PAGES: usize = HEIGHT / 8;

/// Control byte: single command follows
const CONTROL_COMMAND: u8 = 0x80;
/// Control byte: data stream follows
const CONTROL_DATA: u8 = 0x40;

/// Panel columns start two in from the controller's column 0
const COLUMN_OFFSET: u8 = 2;

/// SH1107 commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const RESUME_RAM: u8 = 0xA4;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_VCOM_DESELECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_DC_DC: u8 = 0xAD;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_SEG_REMAP: u8 = 0xA0;
    pub const SET_COM_SCAN: u8 = 0xC0;
}

/// Power-on sequence, command and argument bytes in order
const INIT_SEQUENCE: &[u8] = &[
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    0xF1, // Fastest oscillator, less flicker
    cmd::SET_MUX_RATIO,
    0x7F, // 128 lines
    cmd::SET_DISPLAY_OFFSET,
    0x02,
    cmd::SET_CONTRAST,
    0xFF,
    cmd::SET_PRECHARGE,
    0xD7,
    cmd::SET_VCOM_DESELECT,
    0x30,
    cmd::SET_DC_DC,
    0x8A, // Internal DC-DC on
    cmd::RESUME_RAM,
    cmd::SET_NORMAL,
    cmd::DISPLAY_ON,
];

/// SH1107 OLED driver
pub struct Sh1107<B> {
    bus: B,
    address: u8,
    initialized: bool,
}

impl<B: I2cBus> Sh1107<B> {
    /// Create a driver at the default address
    pub fn new(bus: B) -> Self {
        Self::with_address(bus, DEFAULT_ADDRESS)
    }

    /// Create a driver at a custom address
    pub fn with_address(bus: B, address: u8) -> Self {
        Self {
            bus,
            address,
            initialized: false,
        }
    }

    /// Whether `init` has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }

    /// Send a command to the display
    fn command(&mut self, c: u8) -> Result<(), DisplayError> {
        self.bus
            .write(self.address, &[CONTROL_COMMAND, c])
            .map_err(|_| DisplayError::Communication)
    }

    /// Set display contrast (0-255)
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), DisplayError> {
        self.command(cmd::SET_CONTRAST)?;
        self.command(contrast)
    }

    /// Invert display colors
    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), DisplayError> {
        self.command(cmd::SET_NORMAL | inverted as u8)
    }

    /// Turn the panel on
    pub fn power_on(&mut self) -> Result<(), DisplayError> {
        self.command(cmd::DISPLAY_ON)
    }

    /// Turn the panel off (RAM is kept)
    pub fn power_off(&mut self) -> Result<(), DisplayError> {
        self.command(cmd::DISPLAY_OFF)
    }

    /// Enter or leave sleep
    pub fn sleep(&mut self, asleep: bool) -> Result<(), DisplayError> {
        self.command(cmd::DISPLAY_OFF | !asleep as u8)
    }

    /// Flip the image 180°
    pub fn set_rotated(&mut self, rotated: bool) -> Result<(), DisplayError> {
        if rotated {
            self.command(cmd::SET_SEG_REMAP | 0x01)?;
            self.command(cmd::SET_COM_SCAN | 0x08)
        } else {
            self.command(cmd::SET_SEG_REMAP)?;
            self.command(cmd::SET_COM_SCAN)
        }
    }
}

impl<B: I2cBus> DisplayTransport for Sh1107<B> {
    fn init(&mut self) -> Result<(), DisplayError> {
        for &c in INIT_SEQUENCE {
            self.command(c)?;
        }
        self.initialized = true;
        Ok(())
    }

    fn write_page(&mut self, page: u8, data: &[u8]) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        if page as usize >= PAGES {
            return Err(DisplayError::InvalidCoordinates);
        }

        let mut frame: Vec<u8, { WIDTH + 1 }> = Vec::new();
        frame.push(CONTROL_DATA).map_err(|_| DisplayError::BufferOverflow)?;
        frame
            .extend_from_slice(data)
            .map_err(|_| DisplayError::BufferOverflow)?;

        self.command(cmd::SET_PAGE_ADDR | page)?;
        self.command(cmd::SET_LOW_COLUMN | COLUMN_OFFSET)?;
        self.command(cmd::SET_HIGH_COLUMN)?;
        self.bus
            .write(self.address, &frame)
            .map_err(|_| DisplayError::Communication)
    }
}
