use std::fmt;

/// Non-fatal conditions observed while decoding one record.
///
/// Bit layout:
///   bit 0 = payload shorter than the declared length
///   bit 1 = bytes left in the unit after the declared payload
///   bit 2 = URL is not http:// or https://
///   bit 3 = payload grown by `append_payload` after decoding
///   bits 4-7 = reserved
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Anomalies(u8);

impl Anomalies {
  pub const NONE: Self = Self(0);
  pub const SHORT_PAYLOAD: Self = Self(0b0000_0001);
  pub const TRAILING_BYTES: Self = Self(0b0000_0010);
  pub const NON_HTTP_SCHEME: Self = Self(0b0000_0100);
  pub const APPENDED_PAYLOAD: Self = Self(0b0000_1000);

  const NAMED: [(Self, &'static str); 4] = [
    (Self::SHORT_PAYLOAD, "short-payload"),
    (Self::TRAILING_BYTES, "trailing-bytes"),
    (Self::NON_HTTP_SCHEME, "non-http-scheme"),
    (Self::APPENDED_PAYLOAD, "appended-payload"),
  ];

  pub fn from_raw(raw: u8) -> Self {
    Self(raw)
  }

  pub fn raw(self) -> u8 {
    self.0
  }

  pub fn is_empty(self) -> bool {
    self.0 == 0
  }

  pub fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }

  pub fn insert(&mut self, other: Self) {
    self.0 |= other.0;
  }

  /// Stable names of the set flags, in bit order.
  pub fn names(self) -> impl Iterator<Item = &'static str> {
    Self::NAMED
      .into_iter()
      .filter(move |(flag, _)| self.contains(*flag))
      .map(|(_, name)| name)
  }
}

impl fmt::Display for Anomalies {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_empty() {
      return f.write_str("none");
    }
    let names: Vec<&str> = self.names().collect();
    f.write_str(&names.join(","))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn insert_and_contains() {
    let mut a = Anomalies::NONE;
    assert!(a.is_empty());
    a.insert(Anomalies::TRAILING_BYTES);
    a.insert(Anomalies::SHORT_PAYLOAD);
    assert!(a.contains(Anomalies::TRAILING_BYTES));
    assert!(!a.contains(Anomalies::NON_HTTP_SCHEME));
    assert_eq!(a.raw(), 0b11);
  }

  #[test]
  fn display_lists_names_in_bit_order() {
    let mut a = Anomalies::from_raw(0);
    assert_eq!(a.to_string(), "none");
    a.insert(Anomalies::NON_HTTP_SCHEME);
    a.insert(Anomalies::SHORT_PAYLOAD);
    assert_eq!(a.to_string(), "short-payload,non-http-scheme");
  }
}
