use thiserror::Error;

/// Faults that make a request fail. Not finding anything to propose is not one of them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssistError {
  #[error("offset {offset} is not a character boundary within a buffer of length {len}")]
  InvalidOffset { offset: usize, len: usize },
  #[error("internal invariant violated: {0}")]
  InvariantViolation(String),
}

/// Checks that `offset` can be used to slice `buffer`.
pub fn check_offset(buffer: &str, offset: usize) -> Result<(), AssistError> {
  if buffer.is_char_boundary(offset) {
    Ok(())
  } else {
    Err(AssistError::InvalidOffset {
      offset,
      len: buffer.len(),
    })
  }
}
