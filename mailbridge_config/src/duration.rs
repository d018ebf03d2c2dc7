use std::ops::Deref;

use serde::Deserialize;

/// A duration written as whitespace separated parts like `"1d 2h 3m 4s"`.
///
/// A part without a unit is interpreted as seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration(pub std::time::Duration);

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl Deref for Duration {
    type Target = std::time::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.split_whitespace()
            .try_fold(0u64, |total, part| {
                let seconds = parse_part(part)?;
                total.checked_add(seconds)
            })
            .map(|secs| Self(std::time::Duration::from_secs(secs)))
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid duration: {s:?}")))
    }
}

fn parse_part(part: &str) -> Option<u64> {
    let (digits, factor) = match part.as_bytes().last()? {
        b's' => (&part[..part.len() - 1], 1),
        b'm' => (&part[..part.len() - 1], 60),
        b'h' => (&part[..part.len() - 1], 60 * 60),
        b'd' => (&part[..part.len() - 1], 24 * 60 * 60),
        _ => (part, 1),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse::<u64>().ok()?.checked_mul(factor)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse() {
        for (input, expected) in [
            ("13s", Some(13)),
            ("10", Some(10)),
            ("42m", Some(42 * 60)),
            ("7h", Some(7 * 60 * 60)),
            ("20d", Some(20 * 24 * 60 * 60)),
            ("", Some(0)),
            ("1d 2h 3m 4s", Some(((24 + 2) * 60 + 3) * 60 + 4)),
            ("xyz", None),
            ("7dd", None),
            ("s", None),
            ("-3s", None),
        ] {
            let input = serde_json::Value::String(input.into());
            let output = serde_json::from_value::<Duration>(input)
                .ok()
                .map(|x| x.as_secs());
            assert_eq!(output, expected);
        }
    }
}
