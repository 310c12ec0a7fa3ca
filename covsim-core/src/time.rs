use anyhow::{anyhow, bail, ensure, Result};
use core::fmt;
use logos::{Lexer, Logos};
use std::{ops::Add, str::FromStr, time};

/// A point on the simulation's virtual timeline, measured from the start
/// of the run.
///
/// Virtual time only advances when the [`Scheduler`] pops an event; it is
/// entirely decoupled from the wall clock.
///
/// [`Scheduler`]: crate::Scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(time::Duration);

impl Timestamp {
    /// The start of the run.
    pub const ZERO: Self = Self(time::Duration::ZERO);

    pub const fn new(since_start: time::Duration) -> Self {
        Self(since_start)
    }

    /// Elapsed virtual time since the start of the run.
    #[inline]
    pub fn since_start(self) -> time::Duration {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0.as_secs_f64()
    }
}

impl Add<time::Duration> for Timestamp {
    type Output = Self;
    fn add(self, rhs: time::Duration) -> Self {
        Self(self.0 + rhs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0.as_secs_f64())
    }
}

/// A duration with a human-friendly textual form, e.g. `30s`, `5m` or
/// `1s 500ms`.
///
/// Used for CLI values such as the total simulated duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimDuration(time::Duration);

impl SimDuration {
    pub const fn new(dur: time::Duration) -> Self {
        Self(dur)
    }

    #[inline]
    pub fn into_duration(self) -> time::Duration {
        self.0
    }
}

impl From<time::Duration> for SimDuration {
    fn from(value: time::Duration) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for SimDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <time::Duration as fmt::Debug>::fmt(&self.0, f)
    }
}

impl FromStr for SimDuration {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Lexer::new(s);

        let mut durations = Vec::new();

        while let Some(next) = lex.next() {
            let number: Token = next.map_err(|()| anyhow!("Failed to parse: {s}"))?;

            ensure!(
                number == Token::Value,
                "Expecting duration to starts with number. Cannot parse {s}"
            );
            let number: u64 = lex.slice().parse()?;

            let Some(Ok(measure)) = lex.next() else {
                bail!("Expecting a measure, failed to parse: {s}")
            };
            let duration = match measure {
                Token::NanoSeconds => time::Duration::from_nanos(number),
                Token::MicroSeconds => time::Duration::from_micros(number),
                Token::MilliSeconds => time::Duration::from_millis(number),
                Token::Seconds => time::Duration::from_secs(number),
                Token::Minutes => time::Duration::from_secs(number * 60),
                Token::Value => bail!("Failed to parse `{s}', expecting a measure."),
            };
            durations.push(duration);
        }

        Ok(Self(durations.into_iter().sum()))
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")] // Ignore this regex pattern between tokens
enum Token {
    #[token("ns")]
    NanoSeconds,
    #[regex("us|μs")]
    MicroSeconds,
    #[token("ms")]
    MilliSeconds,
    #[token("s")]
    Seconds,
    #[token("m")]
    Minutes,

    #[regex("[0-9]+")]
    Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parse() {
        let SimDuration(duration) = "123ms".parse().unwrap();
        assert_eq!(duration.as_millis(), 123);

        let SimDuration(duration) = "30s".parse().unwrap();
        assert_eq!(duration.as_secs(), 30);

        let SimDuration(duration) = "1s 2000ms 3000000us".parse().unwrap();
        assert_eq!(duration.as_secs(), 6);

        let SimDuration(duration) = "5m".parse().unwrap();
        assert_eq!(duration.as_secs(), 300);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("half an hour".parse::<SimDuration>().is_err());
        assert!("30".parse::<SimDuration>().is_err());
    }

    #[test]
    fn timestamp_advances() {
        let t = Timestamp::ZERO + Duration::from_millis(100);
        assert!(t > Timestamp::ZERO);
        assert_eq!(t.since_start(), Duration::from_millis(100));
        assert_eq!(t.to_string(), "0.1s");
    }
}
