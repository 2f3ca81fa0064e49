//! Parsing for the raw `page` query parameter.

/// Page requested by a client.
///
/// Parsing never fails; unusable input is kept as [`PageRequest::Invalid`]
/// so the paginator decides how to recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRequest {
    /// No page was supplied.
    #[default]
    First,
    /// The literal `last` was supplied.
    Last,
    /// An integer was supplied. It may be zero, negative or out of range;
    /// values beyond `i64` saturate.
    Number(i64),
    /// The supplied value was not an integer.
    Invalid,
}

impl PageRequest {
    /// Interpret the raw query value.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    ///
    /// assert_eq!(PageRequest::parse(None), PageRequest::First);
    /// assert_eq!(PageRequest::parse(Some("2")), PageRequest::Number(2));
    /// assert_eq!(PageRequest::parse(Some("last")), PageRequest::Last);
    /// assert_eq!(PageRequest::parse(Some("two")), PageRequest::Invalid);
    /// ```
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::First,
            Some("last") => Self::Last,
            Some(value) => value
                .parse::<i64>()
                .map_or_else(|_| saturate(value), Self::Number),
        }
    }
}

/// Clamp integers too wide for `i64` instead of treating them as garbage.
fn saturate(value: &str) -> PageRequest {
    let (negative, digits) = value.strip_prefix('-').map_or_else(
        || (false, value.strip_prefix('+').unwrap_or(value)),
        |rest| (true, rest),
    );
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return PageRequest::Invalid;
    }
    PageRequest::Number(if negative { i64::MIN } else { i64::MAX })
}

impl From<u64> for PageRequest {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Self::Last, Self::Number)
    }
}
