use std::fmt;
use std::str::FromStr;

/// The finite set of candle intervals the WFO pipeline operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Timeframe {
    M5,
    M15,
    H1,
    H4,
}

impl Timeframe {
    pub fn to_minutes(&self) -> i64 {
        match self {
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
        }
    }

    pub fn all() -> [Timeframe; 4] {
        [Timeframe::M5, Timeframe::M15, Timeframe::H1, Timeframe::H4]
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5m" => Ok(Timeframe::M5),
            "15m" => Ok(Timeframe::M15),
            "1h" => Ok(Timeframe::H1),
            "4h" => Ok(Timeframe::H4),
            other => anyhow::bail!("unknown timeframe tag: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_tags() {
        for tf in Timeframe::all() {
            let tag = tf.as_tag();
            assert_eq!(Timeframe::from_str(tag).unwrap(), tf);
        }
    }

    #[test]
    fn test_minutes() {
        assert_eq!(Timeframe::M5.to_minutes(), 5);
        assert_eq!(Timeframe::H4.to_minutes(), 240);
    }
}
