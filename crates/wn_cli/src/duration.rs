use std::str::FromStr;
use std::time::Duration;

/// A positive span written like `30m`, `8h`, `7d`, `2w` or `1h 15m 30s`.
/// A trailing bare number counts as seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl HumanDuration {
    pub fn as_chrono(&self) -> Result<chrono::Duration, String> {
        chrono::Duration::from_std(self.0).map_err(|e| format!("duration out of range: {}", e))
    }
}

fn unit_seconds(unit: char) -> Option<u64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3_600),
        'd' => Some(86_400),
        'w' => Some(604_800),
        _ => None,
    }
}

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let too_large = || format!("duration too large: {}", s);
        let mut total: u64 = 0;
        let mut pending: Option<u64> = None;

        for c in s.chars().filter(|c| !c.is_whitespace()) {
            if let Some(digit) = c.to_digit(10) {
                let amount = pending
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(u64::from(digit)))
                    .ok_or_else(too_large)?;
                pending = Some(amount);
                continue;
            }
            let scale = unit_seconds(c).ok_or_else(|| format!("unknown duration unit '{}' in {}", c, s))?;
            let amount = pending
                .take()
                .ok_or_else(|| format!("unit '{}' needs a number in {}", c, s))?;
            total = amount
                .checked_mul(scale)
                .and_then(|seconds| total.checked_add(seconds))
                .ok_or_else(too_large)?;
        }

        if let Some(seconds) = pending {
            total = total.checked_add(seconds).ok_or_else(too_large)?;
        }
        if s.trim().is_empty() {
            return Err("empty duration".to_string());
        }
        if total == 0 {
            return Err(format!("duration must be longer than zero: {}", s));
        }
        Ok(HumanDuration(Duration::from_secs(total)))
    }
}
