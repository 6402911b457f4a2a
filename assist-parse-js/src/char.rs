#[inline]
pub fn is_line_terminator(c: char) -> bool {
  matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

#[inline]
pub fn is_whitespace(c: char) -> bool {
  matches!(
    c,
    '\t' | '\x0b' | '\x0c' | ' ' | '\u{00A0}' | '\u{FEFF}'
  )
}

// Non-ASCII characters are accepted in names wholesale, except the ones that separate tokens.
pub fn is_id_start(c: char) -> bool {
  match c {
    '$' | '_' => true,
    c if c.is_ascii() => c.is_ascii_alphabetic(),
    c => !is_line_terminator(c) && !is_whitespace(c),
  }
}

pub fn is_id_continue(c: char) -> bool {
  c.is_ascii_digit() || is_id_start(c)
}

#[cfg(test)]
mod tests {
  use super::is_id_continue;
  use super::is_id_start;

  #[test]
  fn identifier_characters() {
    assert!("$foo_1".chars().all(is_id_continue));
    assert!(is_id_start('ñ'));
    assert!(!is_id_start('1'));
    assert!(is_id_continue('1'));
    assert!(!is_id_continue('-'));
    assert!(!is_id_start('\u{2028}'));
  }
}
