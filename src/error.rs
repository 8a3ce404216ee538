//! Error handling primitives for the PMW3360 driver.

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the driver.
///
/// A product-ID mismatch during initialization is not an error: it is reported through the
/// boolean returned by [`Pmw3360::init`](crate::device::Pmw3360::init).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Any error reported by the underlying bus transport.
    Interface(E),
    /// The SROM upload finished but the chip reported a zero `SROM_ID`.
    FirmwareRejected,
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}
