//! Display transport trait
//!
//! The rasterizer only knows how to fill page-packed bytes. Getting those
//! bytes onto the glass is the transport's job.

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display controller
    Communication,
    /// Page or column outside the controller's memory
    InvalidCoordinates,
    /// Display not initialized
    NotInitialized,
    /// Buffer overflow
    BufferOverflow,
}

/// Page-addressed display transport
///
/// A page is one row of bytes, each byte packing 8 vertically stacked pixels
/// (bit 0 = top row of the page).
pub trait DisplayTransport {
    /// Run the controller's power-on initialization sequence
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Transmit one page of column bytes
    ///
    /// - `page`: Page index (row of 8 pixels)
    /// - `data`: One byte per column, left to right
    fn write_page(&mut self, page: u8, data: &[u8]) -> Result<(), DisplayError>;
}

impl<T: DisplayTransport + ?Sized> DisplayTransport for &mut T {
    fn init(&mut self) -> Result<(), DisplayError> {
        (**self).init()
    }

    fn write_page(&mut self, page: u8, data: &[u8]) -> Result<(), DisplayError> {
        (**self).write_page(page, data)
    }
}
