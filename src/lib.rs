pub mod counter;
pub mod error;
pub mod host;
pub mod status;

pub const CARGO_PKG_NAME: &str = env!("CARGO_PKG_NAME");

pub(crate) trait CharsCount {
    fn chars_count(&self) -> usize;
}

impl<T: AsRef<str>> CharsCount for T {
    fn chars_count(&self) -> usize {
        self.as_ref().chars().count()
    }
}
